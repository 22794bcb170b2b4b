use std::fmt;
use std::io::{self, Write};
use std::net::IpAddr;

use bstr::ByteSlice;

use crate::error::{Error, Result};
use crate::store::{LocationResult, LocationStore};

/// Which translated name a projection could not find.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NameKind {
    City,
    Country,
}

impl fmt::Display for NameKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            NameKind::City => write!(f, "City"),
            NameKind::Country => write!(f, "Country"),
        }
    }
}

/// The four columns appended to every enriched record, written in field
/// order: city, country, anonymous proxy, satellite provider.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct OutputTuple {
    pub city: String,
    pub country: String,
    pub anonymous_proxy: bool,
    pub satellite_provider: bool,
}

impl OutputTuple {
    /// Write the columns, each preceded by `delimiter`.
    #[inline]
    pub fn write_fields<W: Write + ?Sized>(&self, delimiter: u8, out: &mut W) -> io::Result<()> {
        out.write_all(&[delimiter])?;
        out.write_all(self.city.as_bytes())?;
        out.write_all(&[delimiter])?;
        out.write_all(self.country.as_bytes())?;
        out.write_all(&[delimiter])?;
        out.write_all(flag(self.anonymous_proxy))?;
        out.write_all(&[delimiter])?;
        out.write_all(flag(self.satellite_provider))
    }
}

#[inline]
fn flag(value: bool) -> &'static [u8] {
    if value {
        b"true"
    } else {
        b"false"
    }
}

/// An [`OutputTuple`] together with the names that had no translation.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Projection {
    pub tuple: OutputTuple,
    pub missing: Vec<NameKind>,
}

/// Project a store record into the output columns for `language`.
///
/// A missing translation is not an error: the column is left empty and the
/// name kind is recorded in [`Projection::missing`].
pub fn project(location: LocationResult, language: &str) -> Projection {
    let mut missing = Vec::new();

    let city = match location.city.name(language) {
        Some(name) => name.to_string(),
        None => {
            missing.push(NameKind::City);
            String::new()
        }
    };
    let country = match location.country.name(language) {
        Some(name) => name.to_string(),
        None => {
            missing.push(NameKind::Country);
            String::new()
        }
    };

    Projection {
        tuple: OutputTuple {
            city,
            country,
            anonymous_proxy: location.traits.is_anonymous_proxy,
            satellite_provider: location.traits.is_satellite_provider,
        },
        missing,
    }
}

/// Resolves address columns against a [`LocationStore`].
#[derive(Debug)]
pub struct Enricher<'s, S: LocationStore + ?Sized> {
    store: &'s S,
    language: String,
    verbose: bool,
}

impl<'s, S: LocationStore + ?Sized> Enricher<'s, S> {
    pub fn new(store: &'s S, language: impl Into<String>, verbose: bool) -> Self {
        Self {
            store,
            language: language.into(),
            verbose,
        }
    }

    /// Look up `address` once and build its output columns.
    pub fn enrich(&self, address: &[u8]) -> Result<OutputTuple> {
        let ip = parse_address(address)?;
        let location = self
            .store
            .lookup_city(ip)
            .map_err(|source| Error::LookupFailed {
                ip: ip.to_string(),
                source,
            })?;

        let Projection { tuple, missing } = project(location, &self.language);
        if self.verbose {
            for kind in missing {
                log::info!("no language {} entry found for {} ({})", self.language, kind, ip);
            }
        }
        Ok(tuple)
    }
}

/// Parse an IPv4 or IPv6 literal; anything else is [`Error::InvalidAddress`].
///
/// IPv4-mapped IPv6 addresses (`::ffff:a.b.c.d`) come back as IPv4.
pub fn parse_address(address: &[u8]) -> Result<IpAddr> {
    address
        .to_str()
        .ok()
        .and_then(|s| s.parse::<IpAddr>().ok())
        .map(|ip| ip.to_canonical())
        .ok_or_else(|| Error::InvalidAddress {
            ip: address.to_str_lossy().into_owned(),
        })
}

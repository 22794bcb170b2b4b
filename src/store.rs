//! Geolocation stores.
//!
//! The enrichment pipeline only needs one capability from a geolocation
//! database: resolve an address to its city-level record. [`LocationStore`]
//! captures that, [`MaxMindStore`] implements it over a GeoIP2/GeoLite2 City
//! MMDB file, and [`MemoryStore`] answers from a fixed table for tests and
//! benchmarks.

use std::collections::BTreeMap;
use std::fmt;
use std::io::Read;
use std::net::IpAddr;

use camino::{Utf8Path, Utf8PathBuf};
use maxminddb::Reader;
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// Locale-keyed names of a place, e.g. `{"en": "Germany", "de": "Deutschland"}`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Place {
    #[serde(default)]
    pub names: BTreeMap<String, String>,
}

impl Place {
    /// Build a place with a single translated name.
    pub fn named(language: &str, name: &str) -> Self {
        let mut names = BTreeMap::new();
        names.insert(language.to_string(), name.to_string());
        Place { names }
    }

    /// The name in the given language, if the database carries one.
    pub fn name(&self, language: &str) -> Option<&str> {
        self.names.get(language).map(String::as_str)
    }
}

/// Network traits attached to a city record.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Traits {
    #[serde(default)]
    pub is_anonymous_proxy: bool,
    #[serde(default)]
    pub is_satellite_provider: bool,
}

/// The subset of a GeoIP2 City record the enricher projects.
///
/// Field names follow the MMDB City schema so the same type decodes MMDB
/// records and JSON fixtures. Absent sections decode to their defaults.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LocationResult {
    #[serde(default)]
    pub city: Place,
    #[serde(default)]
    pub country: Place,
    #[serde(default)]
    pub traits: Traits,
}

/// Why a store could not answer a lookup.
#[derive(Debug, thiserror::Error)]
pub enum LookupError {
    /// The address is outside the database's coverage.
    #[error("address not found in database")]
    NotFound,

    /// The database could not be read or decoded at this address.
    #[error(transparent)]
    Database(#[from] maxminddb::MaxMindDbError),
}

/// A city-level geolocation lookup service.
pub trait LocationStore: fmt::Debug {
    /// Resolve `ip` to its city-level location record.
    fn lookup_city(&self, ip: IpAddr) -> std::result::Result<LocationResult, LookupError>;
}

/// A MaxMind City database loaded into memory.
///
/// The database is read once by [`MaxMindStore::open`] and released when the
/// store is dropped.
pub struct MaxMindStore {
    path: Utf8PathBuf,
    reader: Reader<Vec<u8>>,
}

impl fmt::Debug for MaxMindStore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MaxMindStore")
            .field("path", &self.path)
            .field("database_type", &self.reader.metadata.database_type)
            .finish()
    }
}

impl MaxMindStore {
    /// Read and validate the MMDB file at `path`.
    pub fn open(path: impl AsRef<Utf8Path>) -> Result<Self> {
        let path = path.as_ref().to_path_buf();
        let bytes = std::fs::read(&path).map_err(|source| Error::StoreRead {
            path: path.clone(),
            source,
        })?;
        let reader = Reader::from_source(bytes).map_err(|source| Error::StoreOpen {
            path: path.clone(),
            source,
        })?;

        log::debug!(
            "opened {} database {} (build {})",
            reader.metadata.database_type,
            path,
            reader.metadata.build_epoch
        );
        Ok(Self { path, reader })
    }
}

impl LocationStore for MaxMindStore {
    fn lookup_city(&self, ip: IpAddr) -> std::result::Result<LocationResult, LookupError> {
        let lookup = self.reader.lookup(ip)?;
        if !lookup.has_data() {
            return Err(LookupError::NotFound);
        }
        lookup.decode::<LocationResult>()?.ok_or(LookupError::NotFound)
    }
}

impl Drop for MaxMindStore {
    fn drop(&mut self) {
        log::debug!("closing geolocation database {}", self.path);
    }
}

/// A fixed-answer store backed by an in-memory table.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    records: BTreeMap<IpAddr, LocationResult>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add or replace the record returned for `ip`.
    pub fn insert(&mut self, ip: IpAddr, location: LocationResult) -> &mut Self {
        self.records.insert(ip, location);
        self
    }

    /// Builder-style variant of [`MemoryStore::insert`].
    pub fn with(mut self, ip: IpAddr, location: LocationResult) -> Self {
        self.insert(ip, location);
        self
    }

    /// Load a store from a JSON object keyed by address:
    ///
    /// ```json
    /// {"8.8.8.8": {"city": {"names": {"en": "Mountain View"}}, "traits": {}}}
    /// ```
    pub fn from_json<R: Read>(reader: R) -> Result<Self> {
        let table: BTreeMap<String, LocationResult> = serde_json::from_reader(reader)
            .map_err(|source| Error::InvalidFixture { source })?;

        let mut store = Self::new();
        for (key, location) in table {
            let ip = key
                .parse::<IpAddr>()
                .map_err(|_| Error::InvalidAddress { ip: key.clone() })?;
            store.insert(ip, location);
        }
        Ok(store)
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

impl LocationStore for MemoryStore {
    fn lookup_city(&self, ip: IpAddr) -> std::result::Result<LocationResult, LookupError> {
        self.records.get(&ip).cloned().ok_or(LookupError::NotFound)
    }
}

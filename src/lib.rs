//! The geoipcsv library for appending geolocation columns to delimited records.
//!
//! Each input line is split on a delimiter, the IP address in a configured
//! column is resolved against a city-level geolocation store, and the line is
//! written back out with four extra columns: city name, country name, and the
//! anonymous-proxy and satellite-provider flags.
//!
//! # Examples
//!
//! Enriching records against an in-memory store:
//!
//! ```rust
//! use geoipcsv::{Config, LocationResult, MemoryStore, Place, StreamProcessor};
//!
//! let store = MemoryStore::new().with(
//!     "8.8.8.8".parse().unwrap(),
//!     LocationResult {
//!         city: Place::named("en", "Mountain View"),
//!         country: Place::named("en", "United States"),
//!         ..Default::default()
//!     },
//! );
//!
//! let config = Config { column: 1, ..Config::default() };
//! let processor = StreamProcessor::new(&config, &store);
//!
//! let mut out = Vec::new();
//! processor.process(&mut "1,8.8.8.8\n".as_bytes(), &mut out).unwrap();
//! assert_eq!(out, b"1,8.8.8.8,Mountain View,United States,false,false\n");
//! ```

pub mod config;
pub mod enrich;
pub mod error;
pub mod input;
pub mod record;
pub mod store;
pub mod stream;

pub use crate::config::{Config, ErrorMode};
pub use crate::enrich::{Enricher, OutputTuple};
pub use crate::error::{Error, Result};
pub use crate::record::{Record, RecordParser};
pub use crate::store::{LocationResult, LocationStore, MaxMindStore, MemoryStore, Place, Traits};
pub use crate::stream::{StreamProcessor, Summary};

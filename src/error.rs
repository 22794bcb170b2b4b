use std::fmt;
use std::io;

use camino::Utf8PathBuf;

use crate::store::LookupError;

/// The pipeline stage a record failed in.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    /// Splitting the line and extracting the address column.
    Parse,
    /// Parsing the address and querying the geolocation store.
    Lookup,
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Stage::Parse => write!(f, "failed to parse record"),
            Stage::Lookup => write!(f, "failed to query geolocation database"),
        }
    }
}

/// Error types for the geoipcsv library.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// An input file could not be opened.
    #[error("failed to open input {path}")]
    OpenInput {
        path: Utf8PathBuf,
        #[source]
        source: io::Error,
    },

    /// The MMDB database file could not be read from disk.
    #[error("failed to read geolocation database {path}")]
    StoreRead {
        path: Utf8PathBuf,
        #[source]
        source: io::Error,
    },

    /// The MMDB database is not a valid MaxMind DB file.
    #[error("failed to open geolocation database {path}")]
    StoreOpen {
        path: Utf8PathBuf,
        #[source]
        source: maxminddb::MaxMindDbError,
    },

    /// A JSON location fixture could not be decoded.
    #[error("invalid location fixture")]
    InvalidFixture {
        #[source]
        source: serde_json::Error,
    },

    /// The configured address column does not exist in the record.
    #[error("configured column index {column} exceeds number of columns {fields}")]
    ColumnOutOfRange { column: usize, fields: usize },

    /// The address column is not a valid IPv4 or IPv6 address.
    #[error("couldn't parse IP {ip:?}")]
    InvalidAddress { ip: String },

    /// The store could not resolve an otherwise valid address.
    #[error("failed to lookup ip {ip}")]
    LookupFailed {
        ip: String,
        #[source]
        source: LookupError,
    },

    /// A record-level error tagged with its input line and stage.
    #[error("line {line}: {stage}")]
    Line {
        line: u64,
        stage: Stage,
        #[source]
        source: Box<Error>,
    },

    /// An I/O error occurred.
    #[error(transparent)]
    Io(#[from] io::Error),
}

impl Error {
    /// Returns true when writing output failed because the reader went away.
    pub fn is_broken_pipe(&self) -> bool {
        match self {
            Error::Io(err) => err.kind() == io::ErrorKind::BrokenPipe,
            Error::Line { source, .. } => source.is_broken_pipe(),
            _ => false,
        }
    }

    /// Returns true for errors tied to a single record, which the skip
    /// policy may drop without ending the run.
    pub fn is_record_error(&self) -> bool {
        matches!(
            self,
            Error::Line { .. }
                | Error::ColumnOutOfRange { .. }
                | Error::InvalidAddress { .. }
                | Error::LookupFailed { .. }
        )
    }
}

/// Convenience type alias for Results using the library error.
pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn line_error_names_stage() {
        let err = Error::Line {
            line: 4,
            stage: Stage::Parse,
            source: Box::new(Error::ColumnOutOfRange {
                column: 5,
                fields: 2,
            }),
        };
        assert_eq!(err.to_string(), "line 4: failed to parse record");
        let source = std::error::Error::source(&err).map(ToString::to_string);
        assert_eq!(
            source.as_deref(),
            Some("configured column index 5 exceeds number of columns 2")
        );
    }

    #[test]
    fn broken_pipe_detection() {
        let err = Error::from(io::Error::new(io::ErrorKind::BrokenPipe, "gone"));
        assert!(err.is_broken_pipe());
        assert!(!err.is_record_error());

        let err = Error::InvalidAddress {
            ip: "x".to_string(),
        };
        assert!(!err.is_broken_pipe());
        assert!(err.is_record_error());
    }
}

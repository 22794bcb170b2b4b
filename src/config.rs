use std::fmt;

use camino::Utf8PathBuf;

/// Default location of the GeoLite2 City database.
pub const DEFAULT_DATABASE: &str = "/usr/local/var/GeoIP/GeoLite2-City.mmdb";

/// Default language for city and country names.
pub const DEFAULT_LANGUAGE: &str = "en";

/// What to do with a record that cannot be parsed or resolved.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ErrorMode {
    /// Stop the run at the first bad record.
    #[default]
    Abort,
    /// Log the bad record, drop it and keep going.
    Skip,
}

impl fmt::Display for ErrorMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ErrorMode::Abort => write!(f, "abort"),
            ErrorMode::Skip => write!(f, "skip"),
        }
    }
}

/// Settings for one enrichment run. Built once, then only read.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    /// Path of the MaxMind City database.
    pub database: Utf8PathBuf,
    /// Zero-based index of the column holding the IP address.
    pub column: usize,
    /// Locale key used to pick city and country names.
    pub language: String,
    /// Characters trimmed from both ends of the address column.
    pub trim: Option<String>,
    /// Field separator for both input and output.
    pub delimiter: u8,
    /// Report missing translations on the diagnostic stream.
    pub verbose: bool,
    /// Whether a bad record ends the run or is skipped.
    pub on_error: ErrorMode,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            database: Utf8PathBuf::from(DEFAULT_DATABASE),
            column: 0,
            language: DEFAULT_LANGUAGE.to_string(),
            trim: None,
            delimiter: b',',
            verbose: false,
            on_error: ErrorMode::Abort,
        }
    }
}

impl Config {
    /// The trim set, treating an empty string the same as none.
    pub fn trim(&self) -> Option<&str> {
        self.trim.as_deref().filter(|t| !t.is_empty())
    }
}

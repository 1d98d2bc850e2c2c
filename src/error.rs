//! Error types for the coverage filter library.

use thiserror::Error;

/// Errors that can occur while loading statistics or filtering records.
#[derive(Error, Debug)]
pub enum CoverageFilterError {
    /// Failed to open, read or write a stream.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// A line of the region statistics file could not be parsed (strict mode only).
    #[error("Malformed interval line {line}: {reason}")]
    MalformedInterval { line: usize, reason: String },

    /// A VCF data line could not be parsed (strict mode only).
    #[error("Malformed record on line {line}: {reason}")]
    MalformedRecord { line: usize, reason: String },

    /// A single VCF data line passed on its own could not be parsed (strict mode only).
    #[error("Malformed record: {0}")]
    MalformedLine(String),

    /// Failed to parse a config file entry.
    #[error("Config parse error: {0}")]
    ConfigParseError(String),

    /// A config entry had the wrong type or an out of range value.
    #[error("Invalid value for {key}: {value}")]
    InvalidConfigValue { key: String, value: String },

    /// A threshold cannot be used for filtering.
    #[error("Invalid threshold: {0}")]
    InvalidThreshold(String),

    /// The requested filtering mode has no predicate.
    #[error("Unsupported filtering mode: {0}")]
    UnsupportedMode(String),
}

/// Result type alias for coverage filter operations.
pub type Result<T> = std::result::Result<T, CoverageFilterError>;

//! Error types for blinkmorse.
//!
//! Decoding itself never fails: unrecognized Morse sequences degrade to an
//! empty display value. The errors here cover the plumbing around the
//! decoder (configuration, face sources, the detector runner).

use thiserror::Error;

/// The main error type for blinkmorse operations.
#[derive(Error, Debug)]
pub enum Error {
    // === Configuration Errors ===
    /// Failed to load configuration.
    #[error("failed to load configuration: {0}")]
    ConfigLoad(Box<figment::Error>),

    /// Configuration validation failed.
    #[error("invalid configuration: {message}")]
    ConfigValidation {
        /// Description of the validation failure.
        message: String,
    },

    // === Source Errors ===
    /// The face source could not be acquired (no device, permission denied,
    /// missing trace file).
    #[error("face source '{name}' unavailable: {message}")]
    SourceUnavailable {
        /// Name of the face source.
        name: String,
        /// Description of what went wrong.
        message: String,
    },

    /// A face trace line could not be parsed.
    #[error("invalid face trace at line {line}: {message}")]
    TraceParse {
        /// 1-based line number.
        line: usize,
        /// Description of what went wrong.
        message: String,
    },

    // === Decoding Errors ===
    /// A Morse sequence contained a character other than `.` or `-`.
    #[error("invalid Morse symbol {symbol:?} in {input:?}")]
    InvalidSymbol {
        /// The offending character.
        symbol: char,
        /// The full input.
        input: String,
    },

    // === Detector Errors ===
    /// The detector is no longer running.
    #[error("detector is not running")]
    DetectorStopped,

    // === I/O Errors ===
    /// File system operation failed.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    // === Serialization Errors ===
    /// JSON serialization/deserialization failed.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    // === Generic Errors ===
    /// An internal error occurred (bug).
    #[error("internal error: {0}")]
    Internal(String),
}

/// A specialized Result type for blinkmorse operations.
pub type Result<T> = std::result::Result<T, Error>;

impl From<figment::Error> for Error {
    fn from(err: figment::Error) -> Self {
        Self::ConfigLoad(Box::new(err))
    }
}

impl Error {
    /// Create a configuration validation error.
    #[must_use]
    pub fn config_validation(message: impl Into<String>) -> Self {
        Self::ConfigValidation {
            message: message.into(),
        }
    }

    /// Create a source unavailable error.
    #[must_use]
    pub fn source_unavailable(name: impl Into<String>, message: impl Into<String>) -> Self {
        Self::SourceUnavailable {
            name: name.into(),
            message: message.into(),
        }
    }

    /// Create a trace parse error for the given 1-based line.
    #[must_use]
    pub fn trace_parse(line: usize, message: impl Into<String>) -> Self {
        Self::TraceParse {
            line,
            message: message.into(),
        }
    }

    /// Create a new internal error.
    #[must_use]
    pub fn internal(message: impl Into<String>) -> Self {
        Self::Internal(message.into())
    }

    /// Check if this error means the face source could not be acquired.
    #[must_use]
    pub fn is_source_unavailable(&self) -> bool {
        matches!(self, Self::SourceUnavailable { .. })
    }
}

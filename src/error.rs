//! Field security error types.
//!
//! # Error Classification
//!
//! Errors here are strictly *configuration* failures:
//!
//! - An unknown preset or level name
//! - A custom pattern that does not compile
//! - A config file that cannot be read or parsed
//!
//! Detected threats are not errors. The detector, sanitizer, validator and
//! field controller are infallible for any string input and report threats
//! through [`ValidationResult`](crate::security::ValidationResult) and the
//! controller callbacks instead.

use thiserror::Error;

/// Field security errors.
#[derive(Error, Debug)]
pub enum GuardError {
    /// Preset name is not in the preset table.
    #[error("Unknown security preset: {0}")]
    UnknownPreset(String),

    /// Security level name is not one of `basic`, `strict`, `paranoid`.
    #[error("Unknown security level: {0}")]
    UnknownLevel(String),

    /// A custom sanitizer pattern failed to compile.
    ///
    /// The regex error is kept via `#[source]` so callers using `anyhow`
    /// see the full chain.
    #[error("Invalid custom pattern `{pattern}`: {source}")]
    InvalidPattern {
        /// Pattern source as supplied.
        pattern: String,
        /// Underlying compile error.
        #[source]
        source: regex::Error,
    },

    /// Configuration error.
    #[error("Config error: {0}")]
    Config(String),

    /// I/O error.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type alias for fieldguard operations
pub type Result<T> = std::result::Result<T, GuardError>;

impl From<toml::de::Error> for GuardError {
    fn from(err: toml::de::Error) -> Self {
        GuardError::Config(err.to_string())
    }
}

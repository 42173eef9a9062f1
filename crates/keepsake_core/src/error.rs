//! # Error Types
//!
//! Only construction paths can fail: reading and validating the TOML tables,
//! and drawing a session seed from the OS. Everything that happens once a
//! session is running is silent and self-correcting, and reports back through
//! outcome values instead (see [`crate::scene::ActionOutcome`]).

use std::path::PathBuf;

use thiserror::Error;

/// Errors raised while building a session or loading its tables.
#[derive(Error, Debug)]
pub enum KeepsakeError {
    /// A config or content file could not be read.
    #[error("failed to read {}: {source}", .path.display())]
    Io {
        /// File that was being read.
        path: PathBuf,
        /// Underlying I/O failure.
        #[source]
        source: std::io::Error,
    },

    /// A TOML document did not match the expected schema.
    #[error("failed to parse {what}: {source}")]
    Parse {
        /// Which document failed ("engine config", "story content").
        what: &'static str,
        /// Underlying parser error.
        #[source]
        source: toml::de::Error,
    },

    /// A config value is out of its allowed range.
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    /// The OS entropy source could not seed the session RNG.
    #[error("entropy source unavailable: {0}")]
    Entropy(String),

    /// The real-time driver could not start its runtime.
    #[error("driver runtime failed to start: {0}")]
    Runtime(#[source] std::io::Error),
}

/// Result type for keepsake construction paths.
pub type KeepsakeResult<T> = Result<T, KeepsakeError>;

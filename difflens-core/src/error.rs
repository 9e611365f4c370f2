//! Error types for difflens-core.

use thiserror::Error;

/// Result type alias for difflens-core operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors surfaced to the caller of the engine.
///
/// Only configuration and input-shape problems are errors. Malformed XML
/// fragments inside a diff are recovered locally and never show up here.
#[derive(Error, Debug)]
pub enum Error {
    /// An ignore pattern with the `regex:` prefix failed to compile.
    #[error("Invalid ignore pattern '{pattern}': {source}")]
    InvalidPattern {
        /// The pattern text as supplied, including the `regex:` prefix.
        pattern: String,
        /// Compilation error reported by the regex engine.
        #[source]
        source: regex::Error,
    },

    /// A repository-compare payload could not be decoded.
    #[error("Invalid compare payload: {0}")]
    Payload(#[from] serde_json::Error),
}

//! Error types for the Spinitron clients
//!
//! Provides a single error enum with human-readable messages
//! and string serialization for JSON output.

use serde::{Serialize, Serializer};
use thiserror::Error;

/// Error type for all Spinitron client operations
///
/// Implements Display for human-readable messages and Serialize
/// so errors can be emitted in the same JSON stream as results.
#[derive(Error, Debug)]
pub enum SpinitronError {
    /// HTTP request failed
    #[error("HTTP request failed: {0}")]
    HttpError(#[from] reqwest::Error),

    /// Server answered with a non-success status
    #[error("Unexpected HTTP status {status} for {url}")]
    Status { status: u16, url: String },

    /// Rate limited by server (HTTP 429)
    #[error("Rate limited - too many requests")]
    RateLimited,

    /// Response body or document could not be parsed
    #[error("Failed to parse response: {0}")]
    ParseError(String),

    /// No API secret configured, requests cannot be signed
    #[error("Missing API secret - cannot sign request")]
    MissingSecret,

    /// Caller supplied an unusable `cache` override
    #[error("Invalid cache TTL: {0}")]
    InvalidTtl(String),

    /// Caller supplied a malformed parameter
    #[error("Invalid parameter: {0}")]
    InvalidParameter(String),

    /// Cache store failure
    #[error("Cache store error: {0}")]
    Cache(String),

    /// Music catalog lookup failure
    #[error("Catalog lookup failed: {0}")]
    Catalog(String),
}

impl Serialize for SpinitronError {
    fn serialize<S>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(&self.to_string())
    }
}

/// Result type alias for Spinitron operations
pub type Result<T> = std::result::Result<T, SpinitronError>;

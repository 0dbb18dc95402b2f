//! Error types shared across the core.
//!
//! Two surfaces on purpose. `SaveError` is the *expected* rejection of
//! untrusted upload text and travels by value; a hostile or corrupted save
//! must never panic the pipeline. `CoreError` covers contract violations
//! and infrastructure failures and is allowed to abort the operation.

use thiserror::Error;

/// Rejection of an uploaded save. Every variant is reachable from hostile
/// input, so callers treat these as data, not as faults.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SaveError {
    #[error("Anti-tamper marker not found")]
    MarkerMissing,

    #[error("Checksum truncated: expected 32 hex characters after the marker, found {found}")]
    TruncatedChecksum { found: usize },

    #[error("Checksum mismatch: stored {stored}, computed {computed}")]
    ChecksumMismatch { stored: String, computed: String },

    #[error("Payload is not decodable: {reason}")]
    MalformedPayload { reason: String },

    #[error("Raw-format save contains no JSON object")]
    NoObjectStart,

    #[error("Decoded text is not a JSON object document")]
    UnreadableDocument,
}

/// Fault in our own data or environment, as opposed to the player's input.
#[derive(Error, Debug)]
pub enum CoreError {
    #[error("Catalog error: {0}")]
    Catalog(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

pub type CoreResult<T> = Result<T, CoreError>;

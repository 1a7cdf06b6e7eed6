//! Error types for envelope encryption.

use thiserror::Error;

/// Errors that can occur while sealing or opening an envelope.
#[derive(Debug, Error)]
pub enum CipherError {
    #[error("Decode error: {0}")]
    Decode(String),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Convenience result alias for cipher operations.
pub type Result<T> = std::result::Result<T, CipherError>;

//! Error types for the nanoshutter crypto layer.

use thiserror::Error;

/// Result type for crypto operations.
pub type CryptoResult<T> = Result<T, CryptoError>;

/// Errors that can occur while deriving keys or sealing/opening messages.
#[derive(Clone, Debug, Error)]
pub enum CryptoError {
    #[error("invalid key length: expected {expected}, got {actual}")]
    InvalidKeyLength { expected: usize, actual: usize },

    #[error("invalid hex encoding: {0}")]
    InvalidHex(String),

    #[error("key agreement produced the identity point (low-order public key)")]
    LowOrderPoint,

    #[error("encryption failed: {0}")]
    Encryption(String),

    /// The Poly1305 tag did not verify. Wrong key, corrupted data, or tampering.
    #[error("authentication failed: wrong key or tampered data")]
    AuthenticationFailed,

    #[error("malformed envelope: {0}")]
    MalformedEnvelope(String),

    #[error("serialization error: {0}")]
    Serialization(String),
}

impl From<serde_json::Error> for CryptoError {
    fn from(e: serde_json::Error) -> Self {
        CryptoError::Serialization(e.to_string())
    }
}

impl From<hex::FromHexError> for CryptoError {
    fn from(e: hex::FromHexError) -> Self {
        CryptoError::InvalidHex(e.to_string())
    }
}

//! Client error types.

use nanoshutter_crypto::CryptoError;
use thiserror::Error;

/// Result type for client operations.
pub type ClientResult<T> = Result<T, ClientError>;

/// Errors surfaced by [`crate::TimelockClient`] and its collaborators.
#[derive(Clone, Debug, Error)]
pub enum ClientError {
    /// A fetched key or parameter set failed validation (wrong length, bad hex).
    #[error("invalid key material: {0}")]
    InvalidKeyMaterial(String),

    /// Transport-level failure reaching the key authority.
    #[error("key authority unreachable: {0}")]
    KeyAuthorityUnreachable(String),

    /// The authority has not released the epoch secret key yet. Retry later.
    #[error("decryption key for epoch {epoch} not available yet")]
    KeyNotYetAvailable {
        epoch: u64,
        seconds_until_available: Option<u64>,
    },

    /// The envelope's tag did not verify.
    #[error("authentication failed: wrong key, corrupted or tampered envelope")]
    AuthenticationFailed,

    /// The epoch directory has not loaded the eon key yet.
    #[error("epoch directory not initialized")]
    NotInitialized,

    /// The authority answered with an unexpected status or body.
    #[error("key authority error (HTTP {status}): {message}")]
    KeyAuthority { status: u16, message: String },

    #[error("clock skew: local epoch {local}, authority epoch {authority}")]
    ClockSkew { local: u64, authority: u64 },

    #[error("malformed envelope: {0}")]
    MalformedEnvelope(String),

    #[error("decrypted payload is not valid UTF-8: {0}")]
    InvalidPlaintext(String),

    #[error("invalid configuration: {0}")]
    Config(String),

    #[error("crypto error: {0}")]
    Crypto(#[source] CryptoError),
}

impl ClientError {
    /// True for conditions a caller may retry with the same inputs.
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            ClientError::KeyAuthorityUnreachable(_) | ClientError::KeyNotYetAvailable { .. }
        )
    }
}

impl From<CryptoError> for ClientError {
    fn from(e: CryptoError) -> Self {
        match e {
            CryptoError::InvalidKeyLength { .. }
            | CryptoError::InvalidHex(_)
            | CryptoError::LowOrderPoint => ClientError::InvalidKeyMaterial(e.to_string()),
            CryptoError::AuthenticationFailed => ClientError::AuthenticationFailed,
            CryptoError::MalformedEnvelope(msg) => ClientError::MalformedEnvelope(msg),
            other => ClientError::Crypto(other),
        }
    }
}

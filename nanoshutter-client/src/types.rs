//! Key-authority wire types and directory state.

use nanoshutter_crypto::EonPublicKey;
use serde::{Deserialize, Serialize};
use std::num::NonZeroU64;

/// `GET /eon-key`
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct EonKeyResponse {
    pub eon_public_key: String,
    pub epoch_duration: u64,
    pub current_epoch: u64,
}

/// `GET /epoch-public-key?epoch=N`
///
/// Some authorities echo the requested epoch; when present it must match.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct EpochPublicKeyResponse {
    pub epoch_public_key: String,
    #[serde(default)]
    pub epoch: Option<u64>,
}

/// `GET /decryption-key?epoch=N&ephemeral_public_key=HEX`
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct DecryptionKeyResponse {
    pub epoch_private_key: String,
}

/// Body of a 404 from `/decryption-key`. All fields are best-effort.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct KeyNotReleasedResponse {
    #[serde(default)]
    pub error: Option<String>,
    #[serde(default)]
    pub seconds_until_available: Option<i64>,
}

/// Epoch timing as reported by the authority.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct EpochParameters {
    /// Authoritative and fixed for the lifetime of the directory.
    pub epoch_duration: NonZeroU64,
    /// The authority's epoch at fetch time. A hint only.
    pub reported_epoch: u64,
}

impl EpochParameters {
    /// `floor(unix_secs / epoch_duration)`
    pub fn epoch_at(&self, unix_secs: u64) -> u64 {
        unix_secs / self.epoch_duration.get()
    }

    /// Seconds from `unix_secs` until `epoch` has fully elapsed.
    pub fn seconds_until_end(&self, epoch: u64, unix_secs: u64) -> u64 {
        epoch
            .saturating_add(1)
            .saturating_mul(self.epoch_duration.get())
            .saturating_sub(unix_secs)
    }
}

/// Everything the directory caches after a successful initialization.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct EonState {
    pub eon_public_key: EonPublicKey,
    pub parameters: EpochParameters,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn params(duration: u64) -> EpochParameters {
        EpochParameters {
            epoch_duration: NonZeroU64::new(duration).unwrap(),
            reported_epoch: 0,
        }
    }

    #[test]
    fn epoch_at_floors() {
        assert_eq!(params(60).epoch_at(123_456_789), 2_057_613);
        assert_eq!(params(60).epoch_at(59), 0);
        assert_eq!(params(60).epoch_at(60), 1);
        assert_eq!(params(10).epoch_at(0), 0);
    }

    #[test]
    fn seconds_until_end_counts_down() {
        let p = params(10);
        assert_eq!(p.seconds_until_end(5, 50), 10);
        assert_eq!(p.seconds_until_end(5, 59), 1);
        assert_eq!(p.seconds_until_end(5, 60), 0);
        assert_eq!(p.seconds_until_end(5, 1_000), 0);
    }

    #[test]
    fn epoch_public_key_response_without_echo() {
        let resp: EpochPublicKeyResponse =
            serde_json::from_str(r#"{"epoch_public_key":"00"}"#).unwrap();
        assert_eq!(resp.epoch, None);
    }

    #[test]
    fn not_released_body_is_lenient() {
        let resp: KeyNotReleasedResponse = serde_json::from_str("{}").unwrap();
        assert!(resp.seconds_until_available.is_none());

        let resp: KeyNotReleasedResponse = serde_json::from_str(
            r#"{"error":"Decryption key not available yet.","seconds_until_available":7}"#,
        )
        .unwrap();
        assert_eq!(resp.seconds_until_available, Some(7));
    }
}

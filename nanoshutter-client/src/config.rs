//! Client configuration.

use crate::error::{ClientError, ClientResult};
use serde::{Deserialize, Serialize};

/// Configuration for talking to a key authority.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(default)]
pub struct ClientConfig {
    /// Base URL of the key authority (e.g., "http://localhost:5000").
    pub authority_base_url: String,

    /// Per-request HTTP timeout in seconds.
    pub request_timeout_secs: u64,

    /// Tolerated distance, in epochs, between the authority's reported
    /// epoch and the locally computed one at initialization.
    pub max_epoch_skew: u64,

    /// Fail initialization instead of warning when skew exceeds the bound.
    pub reject_clock_skew: bool,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            authority_base_url: "http://localhost:5000".to_string(),
            request_timeout_secs: 30,
            max_epoch_skew: 1,
            reject_clock_skew: false,
        }
    }
}

impl ClientConfig {
    /// Creates a config pointing at `base_url` with default policy.
    pub fn for_authority(base_url: impl Into<String>) -> Self {
        Self {
            authority_base_url: base_url.into(),
            ..Self::default()
        }
    }

    pub fn validate(&self) -> ClientResult<()> {
        let url = self.authority_base_url.trim();
        if url.is_empty() {
            return Err(ClientError::Config("missing authority_base_url".to_string()));
        }
        if !(url.starts_with("http://") || url.starts_with("https://")) {
            return Err(ClientError::Config(format!(
                "authority_base_url must be http(s): {url}"
            )));
        }
        if self.request_timeout_secs == 0 {
            return Err(ClientError::Config(
                "request_timeout_secs must be positive".to_string(),
            ));
        }
        Ok(())
    }
}

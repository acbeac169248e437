//! HTTP client for the key authority.
//!
//! Three endpoints, all `GET` with JSON responses:
//! - `/eon-key` for the long-term key and epoch timing
//! - `/epoch-public-key?epoch=N` for sealing
//! - `/decryption-key?epoch=N&ephemeral_public_key=HEX` for opening; 404
//!   means the epoch secret has not been released yet
//!
//! Key material is validated here so nothing malformed reaches the
//! directory cache or the crypto layer.

use crate::config::ClientConfig;
use crate::error::{ClientError, ClientResult};
use crate::types::*;
use nanoshutter_crypto::{EonPublicKey, EpochPublicKey, EpochSecretKey};
use reqwest::{Client, StatusCode};
use serde::de::DeserializeOwned;
use std::future::Future;
use std::num::NonZeroU64;
use std::time::Duration;
use tracing::debug;

/// Source of eon parameters and per-epoch keys.
pub trait KeyAuthority: Send + Sync + 'static {
    /// Long-term key and epoch timing.
    fn fetch_eon_key(&self) -> impl Future<Output = ClientResult<EonState>> + Send;

    /// Public key for `epoch`. Available ahead of time.
    fn fetch_epoch_public_key(
        &self,
        epoch: u64,
    ) -> impl Future<Output = ClientResult<EpochPublicKey>> + Send;

    /// Secret key for `epoch`, once released. The ephemeral public key is
    /// passed through to the authority unchanged.
    fn fetch_epoch_private_key(
        &self,
        epoch: u64,
        ephemeral_public_key: &[u8; 32],
    ) -> impl Future<Output = ClientResult<EpochSecretKey>> + Send;
}

/// [`KeyAuthority`] over HTTP.
pub struct HttpKeyAuthority {
    client: Client,
    base_url: String,
}

impl HttpKeyAuthority {
    pub fn new(config: &ClientConfig) -> ClientResult<Self> {
        config.validate()?;

        let client = Client::builder()
            .timeout(Duration::from_secs(config.request_timeout_secs))
            .build()
            .map_err(|e| ClientError::Config(format!("failed to build HTTP client: {e}")))?;

        Ok(Self {
            client,
            base_url: config.authority_base_url.trim().trim_end_matches('/').to_string(),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    async fn get(&self, path: &str, query: &[(&str, String)]) -> ClientResult<reqwest::Response> {
        let url = format!("{}{}", self.base_url, path);
        self.client
            .get(&url)
            .query(query)
            .send()
            .await
            .map_err(|e| ClientError::KeyAuthorityUnreachable(format!("GET {path}: {e}")))
    }

    async fn read_json<T: DeserializeOwned>(
        resp: reqwest::Response,
        path: &str,
    ) -> ClientResult<T> {
        let status = resp.status();
        if !status.is_success() {
            let message = resp.text().await.unwrap_or_default();
            return Err(ClientError::KeyAuthority {
                status: status.as_u16(),
                message: format!("GET {path}: {}", message.trim()),
            });
        }

        let body = resp
            .bytes()
            .await
            .map_err(|e| ClientError::KeyAuthorityUnreachable(format!("GET {path}: {e}")))?;
        serde_json::from_slice(&body).map_err(|e| ClientError::KeyAuthority {
            status: status.as_u16(),
            message: format!("GET {path}: invalid response body: {e}"),
        })
    }
}

impl KeyAuthority for HttpKeyAuthority {
    async fn fetch_eon_key(&self) -> ClientResult<EonState> {
        let resp = self.get("/eon-key", &[]).await?;
        let data: EonKeyResponse = Self::read_json(resp, "/eon-key").await?;

        let eon_public_key = EonPublicKey::from_hex(&data.eon_public_key)
            .map_err(|e| ClientError::InvalidKeyMaterial(format!("eon public key: {e}")))?;
        let epoch_duration = NonZeroU64::new(data.epoch_duration).ok_or_else(|| {
            ClientError::InvalidKeyMaterial("epoch_duration must be positive".to_string())
        })?;

        debug!(
            epoch_duration = data.epoch_duration,
            reported_epoch = data.current_epoch,
            "fetched eon parameters"
        );

        Ok(EonState {
            eon_public_key,
            parameters: EpochParameters {
                epoch_duration,
                reported_epoch: data.current_epoch,
            },
        })
    }

    async fn fetch_epoch_public_key(&self, epoch: u64) -> ClientResult<EpochPublicKey> {
        let resp = self
            .get("/epoch-public-key", &[("epoch", epoch.to_string())])
            .await?;
        let data: EpochPublicKeyResponse = Self::read_json(resp, "/epoch-public-key").await?;

        if let Some(echoed) = data.epoch
            && echoed != epoch
        {
            return Err(ClientError::KeyAuthority {
                status: StatusCode::OK.as_u16(),
                message: format!("requested epoch {epoch}, authority answered for {echoed}"),
            });
        }

        EpochPublicKey::from_hex(&data.epoch_public_key).map_err(|e| {
            ClientError::InvalidKeyMaterial(format!("epoch {epoch} public key: {e}"))
        })
    }

    async fn fetch_epoch_private_key(
        &self,
        epoch: u64,
        ephemeral_public_key: &[u8; 32],
    ) -> ClientResult<EpochSecretKey> {
        let resp = self
            .get(
                "/decryption-key",
                &[
                    ("epoch", epoch.to_string()),
                    ("ephemeral_public_key", hex::encode(ephemeral_public_key)),
                ],
            )
            .await?;

        if resp.status() == StatusCode::NOT_FOUND {
            let body: KeyNotReleasedResponse = resp
                .json()
                .await
                .unwrap_or_default();
            let seconds_until_available = body
                .seconds_until_available
                .map(|s| u64::try_from(s).unwrap_or(0));
            debug!(epoch, ?seconds_until_available, "decryption key not released yet");
            return Err(ClientError::KeyNotYetAvailable {
                epoch,
                seconds_until_available,
            });
        }

        let data: DecryptionKeyResponse = Self::read_json(resp, "/decryption-key").await?;
        EpochSecretKey::from_hex(&data.epoch_private_key).map_err(|e| {
            ClientError::InvalidKeyMaterial(format!("epoch {epoch} private key: {e}"))
        })
    }
}

//! Encrypt/decrypt orchestration against a key authority.

use crate::api_client::{HttpKeyAuthority, KeyAuthority};
use crate::clock::{Clock, SystemClock};
use crate::config::ClientConfig;
use crate::directory::EpochDirectory;
use crate::error::{ClientError, ClientResult};
use nanoshutter_crypto::envelope::{open_with_epoch_key, seal_for_epoch};
use nanoshutter_crypto::{CipherSuite, EntropySource, OsEntropy, SealedEnvelope, SodiumSuite};
use std::sync::Arc;
use tracing::{debug, warn};

/// Time-lock encryption client.
///
/// Seals messages for the current epoch and opens them once the
/// authority has released that epoch's secret key. Safe to share across
/// tasks; per-message keys never outlive the call that made them.
pub struct TimelockClient<A: KeyAuthority = HttpKeyAuthority> {
    authority: Arc<A>,
    directory: EpochDirectory<A>,
    suite: Arc<dyn CipherSuite>,
    entropy: Arc<dyn EntropySource>,
}

impl TimelockClient<HttpKeyAuthority> {
    /// HTTP authority, system clock, OS entropy, libsodium-compatible suite.
    pub fn new(config: ClientConfig) -> ClientResult<Self> {
        let authority = HttpKeyAuthority::new(&config)?;
        Ok(Self::with_parts(
            authority,
            Arc::new(SystemClock),
            Arc::new(OsEntropy),
            &config,
        ))
    }
}

impl<A: KeyAuthority> TimelockClient<A> {
    pub fn with_parts(
        authority: A,
        clock: Arc<dyn Clock>,
        entropy: Arc<dyn EntropySource>,
        config: &ClientConfig,
    ) -> Self {
        let authority = Arc::new(authority);
        let directory = EpochDirectory::new(Arc::clone(&authority), clock, config);
        Self {
            authority,
            directory,
            suite: Arc::new(SodiumSuite),
            entropy,
        }
    }

    /// Replaces the primitive suite.
    pub fn with_suite(mut self, suite: Arc<dyn CipherSuite>) -> Self {
        self.suite = suite;
        self
    }

    pub fn directory(&self) -> &EpochDirectory<A> {
        &self.directory
    }

    /// Seals `plaintext` for the current epoch.
    pub async fn encrypt(&self, plaintext: &[u8]) -> ClientResult<SealedEnvelope> {
        self.directory.ensure_ready().await?;
        let epoch = self.directory.current_epoch()?;

        let epoch_public_key = self.authority.fetch_epoch_public_key(epoch).await?;
        let envelope = seal_for_epoch(
            self.suite.as_ref(),
            self.entropy.as_ref(),
            plaintext,
            &epoch_public_key,
            epoch,
        )?;

        debug!(epoch, len = plaintext.len(), "sealed message");
        Ok(envelope)
    }

    pub async fn encrypt_str(&self, message: &str) -> ClientResult<SealedEnvelope> {
        self.encrypt(message.as_bytes()).await
    }

    /// Opens an envelope once its epoch key has been released.
    ///
    /// Fails with [`ClientError::KeyNotYetAvailable`] before release; this
    /// is not retried here.
    pub async fn decrypt(&self, envelope: &SealedEnvelope) -> ClientResult<Vec<u8>> {
        self.directory.ensure_ready().await?;

        let epoch_secret_key = self
            .authority
            .fetch_epoch_private_key(envelope.epoch, &envelope.ephemeral_public_key)
            .await?;

        match open_with_epoch_key(self.suite.as_ref(), envelope, &epoch_secret_key) {
            Ok(plaintext) => {
                debug!(epoch = envelope.epoch, len = plaintext.len(), "opened message");
                Ok(plaintext)
            }
            Err(e) => {
                let err = ClientError::from(e);
                if matches!(err, ClientError::AuthenticationFailed) {
                    warn!(epoch = envelope.epoch, "envelope failed authentication");
                }
                Err(err)
            }
        }
    }

    pub async fn decrypt_to_string(&self, envelope: &SealedEnvelope) -> ClientResult<String> {
        let plaintext = self.decrypt(envelope).await?;
        String::from_utf8(plaintext).map_err(|e| ClientError::InvalidPlaintext(e.to_string()))
    }
}

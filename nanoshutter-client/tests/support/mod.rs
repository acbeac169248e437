//! Shared test helpers: an in-memory key authority and log capture.

#![allow(dead_code)]

use nanoshutter_client::{
    ClientError, ClientResult, EonState, EpochParameters, KeyAuthority,
};
use nanoshutter_crypto::{
    CipherSuite, EonPublicKey, EpochPublicKey, EpochSecretKey, SodiumSuite,
};
use std::num::NonZeroU64;
use std::sync::atomic::{AtomicU64, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

/// Unix time used by most tests: epoch 2057613 at a 60-second duration.
pub const FIXED_NOW: u64 = 123_456_789;
pub const EPOCH_DURATION: u64 = 60;
pub const FIXED_EPOCH: u64 = FIXED_NOW / EPOCH_DURATION;

struct Inner {
    eon: EonState,
    /// When set, every epoch shares this secret key.
    single_key: Option<EpochSecretKey>,
    /// Epochs strictly below this value are released.
    released_below: AtomicU64,
    eon_delay: Duration,
    eon_failures: AtomicUsize,
    eon_fetches: AtomicUsize,
    public_fetches: AtomicUsize,
    seen_ephemeral: Mutex<Vec<(u64, [u8; 32])>>,
}

/// Simulated key authority with per-epoch keys derived from the epoch index.
#[derive(Clone)]
pub struct InMemoryAuthority(Arc<Inner>);

impl InMemoryAuthority {
    pub fn new(reported_epoch: u64) -> Self {
        Self::build(reported_epoch, None, Duration::ZERO)
    }

    /// Every epoch uses the same key pair.
    pub fn single_key(reported_epoch: u64) -> Self {
        Self::build(
            reported_epoch,
            Some(EpochSecretKey::from_bytes([0x5C; 32])),
            Duration::ZERO,
        )
    }

    /// `/eon-key` takes `delay` to answer.
    pub fn slow(reported_epoch: u64, delay: Duration) -> Self {
        Self::build(reported_epoch, None, delay)
    }

    fn build(reported_epoch: u64, single_key: Option<EpochSecretKey>, eon_delay: Duration) -> Self {
        Self(Arc::new(Inner {
            eon: EonState {
                eon_public_key: EonPublicKey::from_bytes(SodiumSuite.public_key(&[0x01; 32])),
                parameters: EpochParameters {
                    epoch_duration: NonZeroU64::new(EPOCH_DURATION).unwrap(),
                    reported_epoch,
                },
            },
            single_key,
            released_below: AtomicU64::new(u64::MAX),
            eon_delay,
            eon_failures: AtomicUsize::new(0),
            eon_fetches: AtomicUsize::new(0),
            public_fetches: AtomicUsize::new(0),
            seen_ephemeral: Mutex::new(Vec::new()),
        }))
    }

    pub fn secret_for(&self, epoch: u64) -> EpochSecretKey {
        if let Some(key) = &self.0.single_key {
            return key.clone();
        }
        let mut seed = b"in-memory-authority".to_vec();
        seed.extend_from_slice(&epoch.to_be_bytes());
        EpochSecretKey::from_bytes(SodiumSuite.hash32(&seed))
    }

    /// Only epochs strictly below `epoch` are released from now on.
    pub fn release_below(&self, epoch: u64) {
        self.0.released_below.store(epoch, Ordering::SeqCst);
    }

    /// The next `n` eon fetches fail as if the network were down.
    pub fn fail_next_eon_fetches(&self, n: usize) {
        self.0.eon_failures.store(n, Ordering::SeqCst);
    }

    pub fn eon_fetches(&self) -> usize {
        self.0.eon_fetches.load(Ordering::SeqCst)
    }

    pub fn public_fetches(&self) -> usize {
        self.0.public_fetches.load(Ordering::SeqCst)
    }

    pub fn seen_ephemeral(&self) -> Vec<(u64, [u8; 32])> {
        self.0.seen_ephemeral.lock().unwrap().clone()
    }
}

impl KeyAuthority for InMemoryAuthority {
    async fn fetch_eon_key(&self) -> ClientResult<EonState> {
        self.0.eon_fetches.fetch_add(1, Ordering::SeqCst);
        if !self.0.eon_delay.is_zero() {
            tokio::time::sleep(self.0.eon_delay).await;
        }
        let failing = self
            .0
            .eon_failures
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |n| n.checked_sub(1))
            .is_ok();
        if failing {
            return Err(ClientError::KeyAuthorityUnreachable(
                "simulated connection refused".to_string(),
            ));
        }
        Ok(self.0.eon.clone())
    }

    async fn fetch_epoch_public_key(&self, epoch: u64) -> ClientResult<EpochPublicKey> {
        self.0.public_fetches.fetch_add(1, Ordering::SeqCst);
        Ok(self.secret_for(epoch).public_key(&SodiumSuite))
    }

    async fn fetch_epoch_private_key(
        &self,
        epoch: u64,
        ephemeral_public_key: &[u8; 32],
    ) -> ClientResult<EpochSecretKey> {
        self.0
            .seen_ephemeral
            .lock()
            .unwrap()
            .push((epoch, *ephemeral_public_key));
        if epoch >= self.0.released_below.load(Ordering::SeqCst) {
            return Err(ClientError::KeyNotYetAvailable {
                epoch,
                seconds_until_available: None,
            });
        }
        Ok(self.secret_for(epoch))
    }
}

/// Collects formatted `tracing` output for inspection.
#[derive(Clone, Default)]
pub struct LogBuffer(Arc<Mutex<Vec<u8>>>);

impl LogBuffer {
    pub fn contents(&self) -> String {
        String::from_utf8_lossy(&self.0.lock().unwrap()).into_owned()
    }
}

impl std::io::Write for LogBuffer {
    fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
        self.0.lock().unwrap().extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> std::io::Result<()> {
        Ok(())
    }
}

//! Epoch directory: eon key cache and epoch clock.
//!
//! The directory starts `Uninitialized` and moves to `Ready` exactly once,
//! after a successful `/eon-key` fetch. Initialization is single-flight:
//! callers arriving while a fetch is in flight join it and all receive its
//! outcome, success or error. A failed attempt caches nothing, so the next
//! call after it starts clean.

use crate::api_client::KeyAuthority;
use crate::clock::Clock;
use crate::config::ClientConfig;
use crate::error::{ClientError, ClientResult};
use crate::types::EonState;
use futures::future::{BoxFuture, FutureExt, Shared};
use nanoshutter_crypto::EonPublicKey;
use std::num::NonZeroU64;
use std::sync::Arc;
use tokio::sync::{Mutex, OnceCell};
use tracing::{info, warn};

#[derive(Clone)]
struct Ready {
    eon: EonState,
    /// `local - authority`, in epochs, at fetch time.
    skew: i128,
}

#[derive(Clone, Copy)]
struct SkewPolicy {
    max_epoch_skew: u64,
    reject: bool,
}

type InitAttempt = Shared<BoxFuture<'static, ClientResult<Ready>>>;

/// Caches the eon key and computes the current epoch from wall-clock time.
pub struct EpochDirectory<A> {
    authority: Arc<A>,
    clock: Arc<dyn Clock>,
    state: OnceCell<Ready>,
    in_flight: Mutex<Option<InitAttempt>>,
    skew_policy: SkewPolicy,
}

impl<A: KeyAuthority> EpochDirectory<A> {
    pub fn new(authority: Arc<A>, clock: Arc<dyn Clock>, config: &ClientConfig) -> Self {
        Self {
            authority,
            clock,
            state: OnceCell::new(),
            in_flight: Mutex::new(None),
            skew_policy: SkewPolicy {
                max_epoch_skew: config.max_epoch_skew,
                reject: config.reject_clock_skew,
            },
        }
    }

    /// Loads the eon key and epoch duration if not loaded yet.
    ///
    /// Idempotent. At most one fetch is in flight at any time, and every
    /// caller that joined it observes the same result.
    pub async fn ensure_ready(&self) -> ClientResult<&EonState> {
        if let Some(ready) = self.state.get() {
            return Ok(&ready.eon);
        }

        let attempt = {
            let mut slot = self.in_flight.lock().await;
            if let Some(ready) = self.state.get() {
                return Ok(&ready.eon);
            }
            slot.get_or_insert_with(|| {
                initialize(
                    Arc::clone(&self.authority),
                    Arc::clone(&self.clock),
                    self.skew_policy,
                )
                .boxed()
                .shared()
            })
            .clone()
        };

        let outcome = attempt.clone().await;

        let mut slot = self.in_flight.lock().await;
        if slot.as_ref().is_some_and(|current| current.ptr_eq(&attempt)) {
            *slot = None;
        }
        let ready = outcome?;
        // Losing this race means an identical state is already stored.
        let _ = self.state.set(ready);
        drop(slot);
        self.state()
    }

    pub fn is_ready(&self) -> bool {
        self.state.initialized()
    }

    fn state(&self) -> ClientResult<&EonState> {
        self.state
            .get()
            .map(|ready| &ready.eon)
            .ok_or(ClientError::NotInitialized)
    }

    /// `floor(now / epoch_duration)`, recomputed on every call.
    ///
    /// Callers needing one epoch across several steps must capture it once.
    pub fn current_epoch(&self) -> ClientResult<u64> {
        let state = self.state()?;
        Ok(state.parameters.epoch_at(self.clock.now_unix_secs()))
    }

    pub fn eon_public_key(&self) -> ClientResult<EonPublicKey> {
        Ok(self.state()?.eon_public_key)
    }

    pub fn epoch_duration(&self) -> ClientResult<NonZeroU64> {
        Ok(self.state()?.parameters.epoch_duration)
    }

    /// Signed distance `local - authority` in epochs, as observed when the
    /// eon parameters were fetched.
    pub fn epoch_skew(&self) -> ClientResult<i128> {
        self.state
            .get()
            .map(|ready| ready.skew)
            .ok_or(ClientError::NotInitialized)
    }

    /// Seconds until `epoch` has elapsed; zero once it has.
    pub fn seconds_until_epoch_end(&self, epoch: u64) -> ClientResult<u64> {
        let state = self.state()?;
        Ok(state
            .parameters
            .seconds_until_end(epoch, self.clock.now_unix_secs()))
    }
}

async fn initialize<A: KeyAuthority>(
    authority: Arc<A>,
    clock: Arc<dyn Clock>,
    policy: SkewPolicy,
) -> ClientResult<Ready> {
    let state = authority.fetch_eon_key().await?;

    let local = state.parameters.epoch_at(clock.now_unix_secs());
    let reported = state.parameters.reported_epoch;
    if local.abs_diff(reported) > policy.max_epoch_skew {
        warn!(
            local_epoch = local,
            authority_epoch = reported,
            max_epoch_skew = policy.max_epoch_skew,
            "local clock disagrees with key authority"
        );
        if policy.reject {
            return Err(ClientError::ClockSkew {
                local,
                authority: reported,
            });
        }
    }

    info!(
        epoch_duration = state.parameters.epoch_duration.get(),
        current_epoch = local,
        "epoch directory ready"
    );
    Ok(Ready {
        skew: i128::from(local) - i128::from(reported),
        eon: state,
    })
}

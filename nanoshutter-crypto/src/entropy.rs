//! Randomness for ephemeral keys and nonces.

use rand::RngCore;

/// Source of cryptographically secure random bytes.
pub trait EntropySource: Send + Sync {
    fn fill(&self, dest: &mut [u8]);
}

/// Thread-local CSPRNG seeded from the operating system.
#[derive(Clone, Copy, Debug, Default)]
pub struct OsEntropy;

impl EntropySource for OsEntropy {
    fn fill(&self, dest: &mut [u8]) {
        rand::rng().fill_bytes(dest);
    }
}

/// Reproducible entropy from a fixed seed.
///
/// Deterministic output makes nonce and key generation replayable in
/// test harnesses. Never use outside tests.
#[cfg(any(test, feature = "test-utils"))]
pub struct SeededEntropy(std::sync::Mutex<rand::rngs::StdRng>);

#[cfg(any(test, feature = "test-utils"))]
impl SeededEntropy {
    pub fn new(seed: u64) -> Self {
        use rand::SeedableRng;
        Self(std::sync::Mutex::new(rand::rngs::StdRng::seed_from_u64(seed)))
    }
}

#[cfg(any(test, feature = "test-utils"))]
impl EntropySource for SeededEntropy {
    fn fill(&self, dest: &mut [u8]) {
        let mut rng = self.0.lock().unwrap_or_else(|poisoned| poisoned.into_inner());
        rng.fill_bytes(dest);
    }
}

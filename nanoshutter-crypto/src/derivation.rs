//! Epoch-bound shared-secret derivation.
//!
//! `combined = H32(X25519(secret, point) || be64(epoch))`
//!
//! Sender and recipient both run this: the sender with its ephemeral
//! secret and the epoch public key, the recipient with the epoch secret
//! and the ephemeral public key. The epoch encoding is fixed-width
//! big-endian on both sides; any disagreement yields a different key and
//! surfaces later as an authentication failure, not here.

use crate::error::CryptoResult;
use crate::keys::CombinedSecret;
use crate::suite::{CipherSuite, KEY_SIZE};
use zeroize::Zeroizing;

/// Network-order encoding of an epoch index.
pub fn epoch_bytes(epoch: u64) -> [u8; 8] {
    epoch.to_be_bytes()
}

/// Derives the symmetric key for one message in `epoch`.
pub fn derive_combined_secret<S: CipherSuite + ?Sized>(
    suite: &S,
    secret: &[u8; KEY_SIZE],
    point: &[u8; KEY_SIZE],
    epoch: u64,
) -> CryptoResult<CombinedSecret> {
    let shared = suite.scalar_mult(secret, point)?;

    let mut input = Zeroizing::new([0u8; KEY_SIZE + 8]);
    input[..KEY_SIZE].copy_from_slice(&shared[..]);
    input[KEY_SIZE..].copy_from_slice(&epoch_bytes(epoch));

    Ok(CombinedSecret::new(suite.hash32(&input[..])))
}

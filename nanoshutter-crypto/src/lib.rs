//! Epoch-bound hybrid encryption for nanoshutter.
//!
//! Messages are sealed against a per-epoch public key published by a key
//! authority and can only be opened once the authority releases the
//! matching epoch secret key.
//!
//! # Construction
//!
//! 1. The sender draws an ephemeral X25519 keypair per message.
//! 2. `shared = X25519(ephemeral_secret, epoch_public)`.
//! 3. `key = BLAKE2b-256(shared || be64(epoch))`, binding the key to the epoch.
//! 4. The message is sealed with XSalsa20-Poly1305 under `key` and a random nonce.
//!
//! The recipient repeats step 2 with `X25519(epoch_secret, ephemeral_public)`,
//! which yields the same shared point, and opens the box.
//!
//! Primitives are reached only through [`CipherSuite`]; [`SodiumSuite`] is
//! byte-compatible with libsodium's `crypto_scalarmult`,
//! `crypto_generichash` and `crypto_secretbox_easy`.

pub mod codec;
pub mod derivation;
pub mod entropy;
pub mod envelope;
mod error;
pub mod keys;
pub mod suite;

pub use derivation::{derive_combined_secret, epoch_bytes};
#[cfg(any(test, feature = "test-utils"))]
pub use entropy::SeededEntropy;
pub use entropy::{EntropySource, OsEntropy};
pub use envelope::{open_with_epoch_key, seal_for_epoch, SealedEnvelope};
pub use error::{CryptoError, CryptoResult};
pub use keys::{CombinedSecret, EonPublicKey, EphemeralKeyPair, EpochPublicKey, EpochSecretKey};
pub use suite::{CipherSuite, SodiumSuite, KEY_SIZE, NONCE_SIZE, TAG_SIZE};

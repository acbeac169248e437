//! Primitive capability used by the protocol layer.
//!
//! The protocol composes three primitives: X25519 scalar multiplication,
//! a keyless 32-byte hash, and an authenticated stream cipher. They are
//! supplied through [`CipherSuite`] so the composition in
//! [`crate::derivation`] and [`crate::codec`] never touches a concrete
//! library directly.

use crate::error::{CryptoError, CryptoResult};
use blake2::digest::consts::U32;
use blake2::{Blake2b, Digest};
use crypto_secretbox::aead::{Aead, KeyInit};
use crypto_secretbox::XSalsa20Poly1305;
use x25519_dalek::{PublicKey, StaticSecret};
use zeroize::Zeroizing;

/// Size of every key handled by the suite (scalars, points, symmetric keys).
pub const KEY_SIZE: usize = 32;

/// XSalsa20 nonce size.
pub const NONCE_SIZE: usize = 24;

/// Poly1305 tag size. Every ciphertext is at least this long.
pub const TAG_SIZE: usize = 16;

type Blake2b256 = Blake2b<U32>;

/// Elliptic-curve, hashing and AEAD primitives.
pub trait CipherSuite: Send + Sync {
    /// Scalar base multiplication: the public key for `secret`.
    fn public_key(&self, secret: &[u8; KEY_SIZE]) -> [u8; KEY_SIZE];

    /// Diffie-Hellman: `secret * point`.
    ///
    /// Fails with [`CryptoError::LowOrderPoint`] when the result is the
    /// all-zero point.
    fn scalar_mult(
        &self,
        secret: &[u8; KEY_SIZE],
        point: &[u8; KEY_SIZE],
    ) -> CryptoResult<Zeroizing<[u8; KEY_SIZE]>>;

    /// Keyless hash with a 32-byte output.
    fn hash32(&self, input: &[u8]) -> [u8; KEY_SIZE];

    /// Authenticated encryption of `plaintext` under `key` and `nonce`.
    fn seal(
        &self,
        key: &[u8; KEY_SIZE],
        nonce: &[u8; NONCE_SIZE],
        plaintext: &[u8],
    ) -> CryptoResult<Vec<u8>>;

    /// Verifies and decrypts. Never returns unauthenticated bytes.
    fn open(
        &self,
        key: &[u8; KEY_SIZE],
        nonce: &[u8; NONCE_SIZE],
        ciphertext: &[u8],
    ) -> CryptoResult<Vec<u8>>;
}

/// libsodium-compatible suite: X25519, BLAKE2b-256, XSalsa20-Poly1305.
///
/// Matches `crypto_scalarmult`, `crypto_generichash(32, ..)` and
/// `crypto_secretbox_easy` byte for byte, so envelopes interoperate with
/// browser clients built on libsodium.
#[derive(Clone, Copy, Debug, Default)]
pub struct SodiumSuite;

impl CipherSuite for SodiumSuite {
    fn public_key(&self, secret: &[u8; KEY_SIZE]) -> [u8; KEY_SIZE] {
        let secret = StaticSecret::from(*secret);
        *PublicKey::from(&secret).as_bytes()
    }

    fn scalar_mult(
        &self,
        secret: &[u8; KEY_SIZE],
        point: &[u8; KEY_SIZE],
    ) -> CryptoResult<Zeroizing<[u8; KEY_SIZE]>> {
        let secret = StaticSecret::from(*secret);
        let shared = secret.diffie_hellman(&PublicKey::from(*point));
        if !shared.was_contributory() {
            return Err(CryptoError::LowOrderPoint);
        }
        Ok(Zeroizing::new(*shared.as_bytes()))
    }

    fn hash32(&self, input: &[u8]) -> [u8; KEY_SIZE] {
        Blake2b256::digest(input).into()
    }

    fn seal(
        &self,
        key: &[u8; KEY_SIZE],
        nonce: &[u8; NONCE_SIZE],
        plaintext: &[u8],
    ) -> CryptoResult<Vec<u8>> {
        let cipher = XSalsa20Poly1305::new(crypto_secretbox::Key::from_slice(key));
        cipher
            .encrypt(crypto_secretbox::Nonce::from_slice(nonce), plaintext)
            .map_err(|e| CryptoError::Encryption(format!("secretbox seal failed: {e}")))
    }

    fn open(
        &self,
        key: &[u8; KEY_SIZE],
        nonce: &[u8; NONCE_SIZE],
        ciphertext: &[u8],
    ) -> CryptoResult<Vec<u8>> {
        let cipher = XSalsa20Poly1305::new(crypto_secretbox::Key::from_slice(key));
        cipher
            .decrypt(crypto_secretbox::Nonce::from_slice(nonce), ciphertext)
            .map_err(|_| CryptoError::AuthenticationFailed)
    }
}

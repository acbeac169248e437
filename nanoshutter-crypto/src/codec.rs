//! Authenticated symmetric sealing under a [`CombinedSecret`].

use crate::entropy::EntropySource;
use crate::error::{CryptoError, CryptoResult};
use crate::keys::CombinedSecret;
use crate::suite::{CipherSuite, NONCE_SIZE, TAG_SIZE};

/// Encrypts `plaintext` under `key` with a freshly drawn nonce.
///
/// Returns `(nonce, ciphertext)`; the ciphertext carries the Poly1305 tag.
pub fn seal<S, E>(
    suite: &S,
    entropy: &E,
    plaintext: &[u8],
    key: &CombinedSecret,
) -> CryptoResult<([u8; NONCE_SIZE], Vec<u8>)>
where
    S: CipherSuite + ?Sized,
    E: EntropySource + ?Sized,
{
    let mut nonce = [0u8; NONCE_SIZE];
    entropy.fill(&mut nonce);

    let ciphertext = suite.seal(key.as_bytes(), &nonce, plaintext)?;
    Ok((nonce, ciphertext))
}

/// Verifies and decrypts. Any failure is [`CryptoError::AuthenticationFailed`].
pub fn open<S: CipherSuite + ?Sized>(
    suite: &S,
    ciphertext: &[u8],
    nonce: &[u8; NONCE_SIZE],
    key: &CombinedSecret,
) -> CryptoResult<Vec<u8>> {
    if ciphertext.len() < TAG_SIZE {
        return Err(CryptoError::AuthenticationFailed);
    }
    suite
        .open(key.as_bytes(), nonce, ciphertext)
        .map_err(|_| CryptoError::AuthenticationFailed)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entropy::SeededEntropy;
    use crate::suite::SodiumSuite;
    use std::collections::HashSet;

    fn key(byte: u8) -> CombinedSecret {
        CombinedSecret::new([byte; 32])
    }

    #[test]
    fn seal_open_roundtrip() {
        let entropy = SeededEntropy::new(1);
        let (nonce, ct) =
            seal(&SodiumSuite, &entropy, b"commit-then-reveal", &key(1)).unwrap();
        let pt = open(&SodiumSuite, &ct, &nonce, &key(1)).unwrap();
        assert_eq!(pt, b"commit-then-reveal");
    }

    #[test]
    fn empty_plaintext_roundtrip() {
        let entropy = SeededEntropy::new(2);
        let (nonce, ct) = seal(&SodiumSuite, &entropy, b"", &key(2)).unwrap();
        assert_eq!(ct.len(), TAG_SIZE);
        assert!(open(&SodiumSuite, &ct, &nonce, &key(2)).unwrap().is_empty());
    }

    #[test]
    fn wrong_key_is_authentication_failure() {
        let entropy = SeededEntropy::new(3);
        let (nonce, ct) = seal(&SodiumSuite, &entropy, b"data", &key(3)).unwrap();
        let err = open(&SodiumSuite, &ct, &nonce, &key(4)).unwrap_err();
        assert!(matches!(err, CryptoError::AuthenticationFailed));
    }

    #[test]
    fn truncated_below_tag_is_authentication_failure() {
        let short = [0u8; TAG_SIZE - 1];
        let err = open(&SodiumSuite, &short, &[0u8; NONCE_SIZE], &key(5)).unwrap_err();
        assert!(matches!(err, CryptoError::AuthenticationFailed));
    }

    #[test]
    fn nonces_never_repeat_under_seeded_entropy() {
        let entropy = SeededEntropy::new(0xC0FFEE);
        let k = key(6);
        let mut nonces = HashSet::new();
        let mut ciphertexts = HashSet::new();
        for _ in 0..1000 {
            let (nonce, ct) =
                seal(&SodiumSuite, &entropy, b"same plaintext", &k).unwrap();
            assert!(nonces.insert(nonce), "nonce reused");
            assert!(ciphertexts.insert(ct), "ciphertext repeated");
        }
    }
}

//! Sealed envelopes: the only artifact that leaves the client.
//!
//! An envelope bundles everything a recipient needs once the epoch secret
//! is released: the sender's ephemeral public key, the nonce, the
//! ciphertext and the epoch index. On the wire it is JSON with hex-encoded
//! binary fields:
//!
//! ```json
//! { "ephemeralPublicKey": "..", "nonce": "..", "ciphertext": "..", "epoch": 2057613 }
//! ```

use crate::codec;
use crate::derivation::derive_combined_secret;
use crate::entropy::EntropySource;
use crate::error::{CryptoError, CryptoResult};
use crate::keys::{EphemeralKeyPair, EpochPublicKey, EpochSecretKey};
use crate::suite::{CipherSuite, KEY_SIZE, NONCE_SIZE, TAG_SIZE};
use serde::{Deserialize, Serialize};

/// Message sealed against an epoch public key.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SealedEnvelope {
    /// Sender side of the X25519 exchange.
    #[serde(with = "hex_array")]
    pub ephemeral_public_key: [u8; KEY_SIZE],
    /// XSalsa20 nonce (24 bytes).
    #[serde(with = "hex_array")]
    pub nonce: [u8; NONCE_SIZE],
    /// Poly1305 tag followed by the XSalsa20 ciphertext.
    #[serde(with = "hex_vec")]
    pub ciphertext: Vec<u8>,
    /// Epoch whose key pair the message is bound to.
    #[serde(deserialize_with = "deserialize_epoch")]
    pub epoch: u64,
}

impl SealedEnvelope {
    pub fn to_json(&self) -> CryptoResult<String> {
        Ok(serde_json::to_string(self)?)
    }

    /// Parses and validates an envelope received from the wire.
    pub fn from_json(json: &str) -> CryptoResult<Self> {
        let envelope: SealedEnvelope = serde_json::from_str(json)
            .map_err(|e| CryptoError::MalformedEnvelope(e.to_string()))?;

        if envelope.ciphertext.len() < TAG_SIZE {
            return Err(CryptoError::MalformedEnvelope(format!(
                "ciphertext shorter than the {TAG_SIZE}-byte tag ({} bytes)",
                envelope.ciphertext.len()
            )));
        }
        Ok(envelope)
    }
}

/// Seals `plaintext` for `epoch` under the epoch's public key.
///
/// A fresh ephemeral keypair is generated for this message and dropped
/// (zeroized) before returning.
pub fn seal_for_epoch<S, E>(
    suite: &S,
    entropy: &E,
    plaintext: &[u8],
    epoch_public_key: &EpochPublicKey,
    epoch: u64,
) -> CryptoResult<SealedEnvelope>
where
    S: CipherSuite + ?Sized,
    E: EntropySource + ?Sized,
{
    let ephemeral = EphemeralKeyPair::generate(suite, entropy);
    let secret = derive_combined_secret(
        suite,
        ephemeral.secret_bytes(),
        epoch_public_key.as_bytes(),
        epoch,
    )?;
    let (nonce, ciphertext) = codec::seal(suite, entropy, plaintext, &secret)?;

    Ok(SealedEnvelope {
        ephemeral_public_key: ephemeral.public_bytes(),
        nonce,
        ciphertext,
        epoch,
    })
}

/// Opens an envelope with the released secret key of its epoch.
pub fn open_with_epoch_key<S: CipherSuite + ?Sized>(
    suite: &S,
    envelope: &SealedEnvelope,
    epoch_secret_key: &EpochSecretKey,
) -> CryptoResult<Vec<u8>> {
    let secret = derive_combined_secret(
        suite,
        epoch_secret_key.as_bytes(),
        &envelope.ephemeral_public_key,
        envelope.epoch,
    )?;
    codec::open(suite, &envelope.ciphertext, &envelope.nonce, &secret)
}

mod hex_array {
    use serde::{Deserialize, Deserializer, Serializer, de};

    pub fn serialize<S: Serializer, const N: usize>(
        bytes: &[u8; N],
        serializer: S,
    ) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&hex::encode(bytes))
    }

    pub fn deserialize<'de, D: Deserializer<'de>, const N: usize>(
        deserializer: D,
    ) -> Result<[u8; N], D::Error> {
        let s = String::deserialize(deserializer)?;
        let mut out = [0u8; N];
        hex::decode_to_slice(s.trim(), &mut out)
            .map_err(|e| de::Error::custom(format!("expected {N} hex-encoded bytes: {e}")))?;
        Ok(out)
    }
}

mod hex_vec {
    use serde::{Deserialize, Deserializer, Serializer, de};

    pub fn serialize<S: Serializer>(bytes: &[u8], serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&hex::encode(bytes))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Vec<u8>, D::Error> {
        let s = String::deserialize(deserializer)?;
        hex::decode(s.trim()).map_err(|e| de::Error::custom(format!("invalid hex: {e}")))
    }
}

/// Accepts a JSON number or a decimal string (browser clients sometimes
/// stringify the epoch).
fn deserialize_epoch<'de, D>(deserializer: D) -> Result<u64, D::Error>
where
    D: serde::Deserializer<'de>,
{
    use serde::de;

    struct EpochVisitor;
    impl<'de> de::Visitor<'de> for EpochVisitor {
        type Value = u64;
        fn expecting(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
            f.write_str("a non-negative epoch number or decimal string")
        }
        fn visit_u64<E: de::Error>(self, v: u64) -> Result<u64, E> {
            Ok(v)
        }
        fn visit_i64<E: de::Error>(self, v: i64) -> Result<u64, E> {
            u64::try_from(v).map_err(|_| E::custom(format!("negative epoch {v}")))
        }
        fn visit_str<E: de::Error>(self, v: &str) -> Result<u64, E> {
            v.trim().parse().map_err(de::Error::custom)
        }
    }
    deserializer.deserialize_any(EpochVisitor)
}

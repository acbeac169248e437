//! Key types for the epoch scheme.
//!
//! All keys are 32 bytes. Public keys are plain copyable values; secret
//! material zeroizes on drop and never prints through `Debug`.

use crate::entropy::EntropySource;
use crate::error::{CryptoError, CryptoResult};
use crate::suite::{CipherSuite, KEY_SIZE};
use std::fmt;
use zeroize::{Zeroize, ZeroizeOnDrop};

fn array_from_slice(bytes: &[u8]) -> CryptoResult<[u8; KEY_SIZE]> {
    <[u8; KEY_SIZE]>::try_from(bytes).map_err(|_| CryptoError::InvalidKeyLength {
        expected: KEY_SIZE,
        actual: bytes.len(),
    })
}

fn array_from_hex(s: &str) -> CryptoResult<[u8; KEY_SIZE]> {
    let bytes = zeroize::Zeroizing::new(hex::decode(s.trim())?);
    array_from_slice(&bytes)
}

macro_rules! public_key_type {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Clone, Copy, PartialEq, Eq, Hash)]
        pub struct $name([u8; KEY_SIZE]);

        impl $name {
            pub fn from_bytes(bytes: [u8; KEY_SIZE]) -> Self {
                Self(bytes)
            }

            /// Validates the exact 32-byte length.
            pub fn from_slice(bytes: &[u8]) -> CryptoResult<Self> {
                array_from_slice(bytes).map(Self)
            }

            pub fn from_hex(s: &str) -> CryptoResult<Self> {
                array_from_hex(s).map(Self)
            }

            pub fn as_bytes(&self) -> &[u8; KEY_SIZE] {
                &self.0
            }

            pub fn to_hex(&self) -> String {
                hex::encode(self.0)
            }
        }

        impl fmt::Debug for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, concat!(stringify!($name), "({})"), self.to_hex())
            }
        }
    };
}

public_key_type!(
    /// The key authority's long-term public key.
    EonPublicKey
);

public_key_type!(
    /// Per-epoch public key; messages for an epoch are encrypted against it.
    EpochPublicKey
);

/// Per-epoch private key, released by the authority once the epoch elapsed.
#[derive(Clone, Zeroize, ZeroizeOnDrop)]
pub struct EpochSecretKey([u8; KEY_SIZE]);

impl EpochSecretKey {
    pub fn from_bytes(bytes: [u8; KEY_SIZE]) -> Self {
        Self(bytes)
    }

    pub fn from_slice(bytes: &[u8]) -> CryptoResult<Self> {
        array_from_slice(bytes).map(Self)
    }

    pub fn from_hex(s: &str) -> CryptoResult<Self> {
        array_from_hex(s).map(Self)
    }

    pub fn as_bytes(&self) -> &[u8; KEY_SIZE] {
        &self.0
    }

    pub fn public_key<S: CipherSuite + ?Sized>(&self, suite: &S) -> EpochPublicKey {
        EpochPublicKey(suite.public_key(&self.0))
    }
}

impl fmt::Debug for EpochSecretKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("EpochSecretKey(<redacted>)")
    }
}

/// Single-use sender keypair. One per encrypted message.
#[derive(ZeroizeOnDrop)]
pub struct EphemeralKeyPair {
    secret: [u8; KEY_SIZE],
    #[zeroize(skip)]
    public: [u8; KEY_SIZE],
}

impl EphemeralKeyPair {
    /// Draws a fresh uniformly random scalar and computes its public key.
    pub fn generate<S, E>(suite: &S, entropy: &E) -> Self
    where
        S: CipherSuite + ?Sized,
        E: EntropySource + ?Sized,
    {
        let mut secret = [0u8; KEY_SIZE];
        entropy.fill(&mut secret);
        let public = suite.public_key(&secret);
        Self { secret, public }
    }

    pub fn secret_bytes(&self) -> &[u8; KEY_SIZE] {
        &self.secret
    }

    pub fn public_bytes(&self) -> [u8; KEY_SIZE] {
        self.public
    }
}

impl fmt::Debug for EphemeralKeyPair {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EphemeralKeyPair")
            .field("public", &hex::encode(self.public))
            .field("secret", &"<redacted>")
            .finish()
    }
}

/// Epoch-bound symmetric key for one message. Never serialized.
#[derive(Zeroize, ZeroizeOnDrop)]
pub struct CombinedSecret([u8; KEY_SIZE]);

impl CombinedSecret {
    pub(crate) fn new(bytes: [u8; KEY_SIZE]) -> Self {
        Self(bytes)
    }

    pub fn as_bytes(&self) -> &[u8; KEY_SIZE] {
        &self.0
    }
}

impl fmt::Debug for CombinedSecret {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("CombinedSecret(<redacted>)")
    }
}

//! X25519 key types used for sealing.
//!
//! - `PublicKey` is plain data: copied freely, serialized as 64 hex chars.
//! - `PrivateKey` wipes itself on drop, is neither `Clone` nor
//!   `Serialize`, and is handed to `seal` by value, so an ephemeral
//!   entry key cannot outlive the one payload it seals.

use std::fmt;

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use x25519_dalek::StaticSecret;
use zeroize::Zeroizing;

use crate::crypto::random::random_bytes;
use crate::errors::{PassVaultError, Result};

/// Length of an X25519 key in bytes.
pub const KEY_LEN: usize = 32;

/// An X25519 public key.
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct PublicKey([u8; KEY_LEN]);

impl PublicKey {
    pub fn from_bytes(bytes: [u8; KEY_LEN]) -> Self {
        Self(bytes)
    }

    pub fn as_bytes(&self) -> &[u8; KEY_LEN] {
        &self.0
    }

    /// Lowercase hex identifier of this key.
    pub fn to_hex(&self) -> String {
        hex::encode(self.0)
    }

    pub fn from_hex(s: &str) -> Result<Self> {
        let mut bytes = [0u8; KEY_LEN];
        hex::decode_to_slice(s, &mut bytes)
            .map_err(|e| PassVaultError::CorruptionError(format!("bad public key hex: {e}")))?;
        Ok(Self(bytes))
    }

    pub(crate) fn to_dalek(self) -> x25519_dalek::PublicKey {
        x25519_dalek::PublicKey::from(self.0)
    }
}

impl fmt::Debug for PublicKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "PublicKey({})", self.to_hex())
    }
}

impl Serialize for PublicKey {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_hex())
    }
}

impl<'de> Deserialize<'de> for PublicKey {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        Self::from_hex(&s).map_err(serde::de::Error::custom)
    }
}

/// An X25519 private key, zeroized on drop.
pub struct PrivateKey(StaticSecret);

impl PrivateKey {
    /// Rebuild a private key from raw bytes (e.g. after unwrapping the
    /// master key from the config record).
    pub fn from_bytes(bytes: Zeroizing<[u8; KEY_LEN]>) -> Self {
        Self(StaticSecret::from(*bytes))
    }

    /// Raw bytes, wrapped so the copy is wiped when the caller drops it.
    pub fn to_bytes(&self) -> Zeroizing<[u8; KEY_LEN]> {
        Zeroizing::new(self.0.to_bytes())
    }

    pub fn public_key(&self) -> PublicKey {
        PublicKey(*x25519_dalek::PublicKey::from(&self.0).as_bytes())
    }

    pub(crate) fn secret(&self) -> &StaticSecret {
        &self.0
    }
}

impl fmt::Debug for PrivateKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("PrivateKey(<redacted>)")
    }
}

/// A freshly generated key pair.
#[derive(Debug)]
pub struct KeyPair {
    pub public: PublicKey,
    pub private: PrivateKey,
}

/// Generate a new X25519 key pair from the OS random source.
///
/// Fails with `RandomSourceUnavailable` rather than producing a key
/// from anything weaker.
pub fn generate_keypair() -> Result<KeyPair> {
    let seed = Zeroizing::new(random_bytes::<KEY_LEN>()?);
    let private = PrivateKey::from_bytes(seed);
    Ok(KeyPair {
        public: private.public_key(),
        private,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn public_key_hex_roundtrip() {
        let pair = generate_keypair().unwrap();
        let hex = pair.public.to_hex();
        assert_eq!(hex.len(), 64);
        assert_eq!(PublicKey::from_hex(&hex).unwrap(), pair.public);
    }

    #[test]
    fn from_hex_rejects_short_input() {
        assert!(PublicKey::from_hex("abcd").is_err());
    }

    #[test]
    fn private_key_bytes_reproduce_public_key() {
        let pair = generate_keypair().unwrap();
        let restored = PrivateKey::from_bytes(pair.private.to_bytes());
        assert_eq!(restored.public_key(), pair.public);
    }

    #[test]
    fn debug_output_hides_private_key() {
        let pair = generate_keypair().unwrap();
        assert_eq!(format!("{:?}", pair.private), "PrivateKey(<redacted>)");
    }

    #[test]
    fn public_key_serializes_as_hex_string() {
        let pair = generate_keypair().unwrap();
        let json = serde_json::to_string(&pair.public).unwrap();
        assert_eq!(json, format!("\"{}\"", pair.public.to_hex()));
        let back: PublicKey = serde_json::from_str(&json).unwrap();
        assert_eq!(back, pair.public);
    }
}

//! AES-256-GCM authenticated encryption.
//!
//! Each call to `encrypt` draws a fresh random 12-byte nonce from the OS
//! and prepends it to the ciphertext.  `decrypt` splits the nonce back out
//! before decrypting.
//!
//! Layout of the returned byte buffer:
//!   [ 12-byte nonce | ciphertext + 16-byte auth tag ]

use aes_gcm::aead::{Aead, KeyInit};
use aes_gcm::{Aes256Gcm, Nonce};

use crate::crypto::random::random_bytes;
use crate::errors::{PassVaultError, Result};

/// Size of the AES-256-GCM nonce in bytes.
pub const NONCE_LEN: usize = 12;

/// Size of the AES-256-GCM authentication tag in bytes.
pub const TAG_LEN: usize = 16;

/// Encrypt `plaintext` with a 32-byte `key`.
///
/// Returns the nonce prepended to the ciphertext (nonce || ciphertext).
pub fn encrypt(key: &[u8], plaintext: &[u8]) -> Result<Vec<u8>> {
    let cipher = Aes256Gcm::new_from_slice(key)
        .map_err(|e| PassVaultError::EncryptionFailed(format!("invalid key length: {e}")))?;

    // A new nonce per call; nothing is ever derived from a counter.
    let nonce_bytes: [u8; NONCE_LEN] = random_bytes()?;
    let nonce = Nonce::from_slice(&nonce_bytes);

    let ciphertext = cipher
        .encrypt(nonce, plaintext)
        .map_err(|e| PassVaultError::EncryptionFailed(format!("encryption error: {e}")))?;

    let mut output = Vec::with_capacity(NONCE_LEN + ciphertext.len());
    output.extend_from_slice(&nonce_bytes);
    output.extend_from_slice(&ciphertext);
    Ok(output)
}

/// Decrypt data that was produced by `encrypt`.
///
/// Any failure, including a payload too short to hold a nonce and tag, is
/// reported as `AuthenticationFailure`.
pub fn decrypt(key: &[u8], ciphertext_with_nonce: &[u8]) -> Result<Vec<u8>> {
    if ciphertext_with_nonce.len() < NONCE_LEN + TAG_LEN {
        return Err(PassVaultError::AuthenticationFailure);
    }

    let (nonce_bytes, ciphertext) = ciphertext_with_nonce.split_at(NONCE_LEN);
    let nonce = Nonce::from_slice(nonce_bytes);

    let cipher =
        Aes256Gcm::new_from_slice(key).map_err(|_| PassVaultError::AuthenticationFailure)?;

    cipher
        .decrypt(nonce, ciphertext)
        .map_err(|_| PassVaultError::AuthenticationFailure)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn roundtrip_with_same_key() {
        let key = [0x42u8; 32];
        let sealed = encrypt(&key, b"hunter2").unwrap();
        assert_eq!(sealed.len(), NONCE_LEN + 7 + TAG_LEN);
        assert_eq!(decrypt(&key, &sealed).unwrap(), b"hunter2");
    }

    #[test]
    fn rejects_wrong_key_length() {
        assert!(encrypt(&[0u8; 16], b"x").is_err());
    }

    #[test]
    fn truncated_payload_is_authentication_failure() {
        let key = [0x42u8; 32];
        let err = decrypt(&key, &[0u8; NONCE_LEN + TAG_LEN - 1]).unwrap_err();
        assert!(matches!(err, PassVaultError::AuthenticationFailure));
    }
}

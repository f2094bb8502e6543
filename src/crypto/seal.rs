//! Sender-authenticated public-key sealing (the vault's "box").
//!
//! `seal` combines the sender's private key with the recipient's public
//! key via X25519, stretches the shared secret with HKDF-SHA256 into an
//! AES-256-GCM key bound to both public keys, and encrypts under a fresh
//! random nonce.  `unseal` repeats the exchange from the other side, so
//! it needs the recipient's private key *and* the sender's declared
//! public key.
//!
//! Layout of a sealed payload:
//!   [ 12-byte nonce | ciphertext + 16-byte auth tag ]

use hkdf::Hkdf;
use sha2::Sha256;
use zeroize::Zeroizing;

use super::encryption::{decrypt, encrypt};
use super::keys::{PrivateKey, PublicKey};
use super::random::random_bytes;
use crate::errors::{PassVaultError, Result};

/// Domain separation tag mixed into every derived box key.
const SEAL_INFO: &[u8] = b"passvault-seal-v1";

/// Number of random bytes in a blob token (128 bits).
const TOKEN_LEN: usize = 16;

/// Derive the symmetric key shared by `ours` and `theirs`.
///
/// `sender` and `recipient` are the two public keys in a fixed order so
/// both sides feed HKDF identical info bytes.
fn derive_box_key(
    ours: &PrivateKey,
    theirs: &PublicKey,
    sender: &PublicKey,
    recipient: &PublicKey,
) -> Result<Zeroizing<[u8; 32]>> {
    let shared = ours.secret().diffie_hellman(&theirs.to_dalek());

    // A low-order peer key yields an all-zero secret; refuse it.
    if !shared.was_contributory() {
        return Err(PassVaultError::AuthenticationFailure);
    }

    let mut info = Vec::with_capacity(SEAL_INFO.len() + 64);
    info.extend_from_slice(SEAL_INFO);
    info.extend_from_slice(sender.as_bytes());
    info.extend_from_slice(recipient.as_bytes());

    let hk = Hkdf::<Sha256>::new(None, shared.as_bytes());
    let mut okm = Zeroizing::new([0u8; 32]);
    hk.expand(&info, &mut okm[..])
        .map_err(|e| PassVaultError::KeyDerivationFailed(format!("HKDF expand failed: {e}")))?;
    Ok(okm)
}

/// Seal `plaintext` for `recipient`, authenticated as coming from `sender`.
///
/// The sender key is consumed: per-entry keys are generated, used for
/// exactly this call, and dropped (and wiped) when it returns.
pub fn seal(plaintext: &[u8], recipient: &PublicKey, sender: PrivateKey) -> Result<Vec<u8>> {
    let sender_public = sender.public_key();
    let key = derive_box_key(&sender, recipient, &sender_public, recipient).map_err(|e| {
        match e {
            // On the sealing side a degenerate key is a bad recipient,
            // not a failed verification.
            PassVaultError::AuthenticationFailure => {
                PassVaultError::EncryptionFailed("recipient public key is degenerate".into())
            }
            other => other,
        }
    })?;
    encrypt(&key[..], plaintext)
}

/// Open a payload produced by `seal`.
///
/// Fails with `AuthenticationFailure` when the tag does not verify: wrong
/// recipient key, wrong declared sender key, or any modified byte.
pub fn unseal(
    payload: &[u8],
    sender: &PublicKey,
    recipient: &PrivateKey,
) -> Result<Zeroizing<Vec<u8>>> {
    let recipient_public = recipient.public_key();
    let key = derive_box_key(recipient, sender, sender, &recipient_public)?;
    decrypt(&key[..], payload).map(Zeroizing::new)
}

/// Generate a random hex token used to name a file-entry blob.
pub fn generate_token() -> Result<String> {
    let bytes: [u8; TOKEN_LEN] = random_bytes()?;
    Ok(hex::encode(bytes))
}

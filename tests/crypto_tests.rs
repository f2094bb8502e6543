//! Integration tests for the PassVault crypto module.

use passvault::crypto::kdf::Argon2Params;
use passvault::crypto::{
    decrypt, derive_key, encrypt, generate_keypair, generate_password, generate_salt,
    generate_token, seal, unseal,
};
use passvault::errors::PassVaultError;

fn fast_params() -> Argon2Params {
    Argon2Params {
        memory_kib: 8_192,
        iterations: 1,
        parallelism: 1,
    }
}

// ---------------------------------------------------------------------------
// Sealing
// ---------------------------------------------------------------------------

#[test]
fn sealed_password_opens_with_master_key() {
    let master = generate_keypair().unwrap();
    let entry = generate_keypair().unwrap();
    let entry_public = entry.public;

    let sealed = seal(b"hunter2", &master.public, entry.private).unwrap();
    let opened = unseal(&sealed, &entry_public, &master.private).unwrap();

    assert_eq!(opened.as_slice(), b"hunter2");
}

#[test]
fn sealing_twice_gives_different_payloads() {
    let master = generate_keypair().unwrap();
    let a = generate_keypair().unwrap();
    let b = generate_keypair().unwrap();

    let first = seal(b"same secret", &master.public, a.private).unwrap();
    let second = seal(b"same secret", &master.public, b.private).unwrap();

    assert_ne!(first, second);
    // 12-byte nonce + 16-byte tag around the plaintext.
    assert_eq!(first.len(), b"same secret".len() + 28);
}

#[test]
fn flipped_bit_fails_authentication() {
    let master = generate_keypair().unwrap();
    let entry = generate_keypair().unwrap();
    let entry_public = entry.public;

    let mut sealed = seal(b"hunter2", &master.public, entry.private).unwrap();
    let last = sealed.len() - 1;
    sealed[last] ^= 0x01;

    let err = unseal(&sealed, &entry_public, &master.private).unwrap_err();
    assert!(matches!(err, PassVaultError::AuthenticationFailure));
}

#[test]
fn wrong_master_key_fails_authentication() {
    let master = generate_keypair().unwrap();
    let intruder = generate_keypair().unwrap();
    let entry = generate_keypair().unwrap();
    let entry_public = entry.public;

    let sealed = seal(b"hunter2", &master.public, entry.private).unwrap();
    let err = unseal(&sealed, &entry_public, &intruder.private).unwrap_err();
    assert!(matches!(err, PassVaultError::AuthenticationFailure));
}

#[test]
fn truncated_payload_is_rejected() {
    let master = generate_keypair().unwrap();
    let entry = generate_keypair().unwrap();
    let entry_public = entry.public;

    assert!(unseal(&[0u8; 5], &entry_public, &master.private).is_err());
}

#[test]
fn empty_plaintext_round_trips() {
    let master = generate_keypair().unwrap();
    let entry = generate_keypair().unwrap();
    let entry_public = entry.public;

    let sealed = seal(b"", &master.public, entry.private).unwrap();
    let opened = unseal(&sealed, &entry_public, &master.private).unwrap();
    assert!(opened.is_empty());
}

// ---------------------------------------------------------------------------
// Symmetric layer and KDF
// ---------------------------------------------------------------------------

#[test]
fn aead_rejects_wrong_key() {
    let ct = encrypt(&[0xAB; 32], b"payload").unwrap();
    assert!(decrypt(&[0xCD; 32], &ct).is_err());
}

#[test]
fn derive_key_is_deterministic_per_salt() {
    let salt = generate_salt().unwrap();
    let params = fast_params();

    let k1 = derive_key(b"correct horse", &salt, &params).unwrap();
    let k2 = derive_key(b"correct horse", &salt, &params).unwrap();
    let k3 = derive_key(b"correct horse", &generate_salt().unwrap(), &params).unwrap();

    assert_eq!(*k1, *k2);
    assert_ne!(*k1, *k3);
}

#[test]
fn derive_key_refuses_weak_params() {
    let weak = Argon2Params {
        memory_kib: 1_024,
        iterations: 1,
        parallelism: 1,
    };
    let salt = generate_salt().unwrap();
    assert!(matches!(
        derive_key(b"pw", &salt, &weak),
        Err(PassVaultError::KeyDerivationFailed(_))
    ));
}

// ---------------------------------------------------------------------------
// Tokens and generated passwords
// ---------------------------------------------------------------------------

#[test]
fn tokens_are_128_bit_hex() {
    let a = generate_token().unwrap();
    let b = generate_token().unwrap();

    assert_eq!(a.len(), 32);
    assert!(a.chars().all(|c| c.is_ascii_hexdigit()));
    assert_ne!(a, b);
}

#[test]
fn generated_password_has_requested_length() {
    let pw = generate_password(40).unwrap();
    assert_eq!(pw.chars().count(), 40);

    // Too-short requests are bumped to the minimum.
    assert_eq!(generate_password(2).unwrap().len(), 4);
}

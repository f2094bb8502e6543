//! Cryptographic primitives for PassVault.
//!
//! This module provides:
//! - OS randomness with loud failure (`random`)
//! - AES-256-GCM encryption and decryption (`encryption`)
//! - Argon2id password-based key derivation (`kdf`)
//! - X25519 key types and key-pair generation (`keys`)
//! - Sender-authenticated sealing of entry payloads (`seal`)
//! - Random password generation (`generate`)

pub mod encryption;
pub mod generate;
pub mod kdf;
pub mod keys;
pub mod random;
pub mod seal;

// Re-export the most commonly used items so callers can write:
//   use crate::crypto::{seal, unseal, generate_keypair, ...};
pub use encryption::{decrypt, encrypt};
pub use generate::generate_password;
pub use kdf::{derive_key, generate_salt, Argon2Params};
pub use keys::{generate_keypair, KeyPair, PrivateKey, PublicKey};
pub use seal::{generate_token, seal, unseal};

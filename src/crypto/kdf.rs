//! Password-based key derivation using Argon2id.
//!
//! The master password never protects entries directly: it derives the
//! key that wraps the master private key in the config record.
//! Parameters come from `passvault.toml` (or sensible defaults) and are
//! stored in the config record so unlocking always uses the same ones.

use argon2::{Algorithm, Argon2, Params, Version};
use serde::{Deserialize, Serialize};
use zeroize::Zeroizing;

use crate::crypto::random::random_bytes;
use crate::errors::{PassVaultError, Result};

/// Length of the salt in bytes (256 bits).
pub const SALT_LEN: usize = 32;

/// Length of the derived key in bytes (256 bits, for AES-256).
const KEY_LEN: usize = 32;

/// Minimum safe memory cost in KiB (8 MB).
const MIN_MEMORY_KIB: u32 = 8_192;

/// Configurable Argon2id parameters.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Argon2Params {
    /// Memory cost in KiB (default: 65 536 = 64 MB).
    pub memory_kib: u32,
    /// Number of iterations (default: 3).
    pub iterations: u32,
    /// Parallelism lanes (default: 4).
    pub parallelism: u32,
}

impl Default for Argon2Params {
    fn default() -> Self {
        Self {
            memory_kib: 65_536,
            iterations: 3,
            parallelism: 4,
        }
    }
}

/// Derive a 32-byte wrapping key from a password and salt using Argon2id.
///
/// The same password + salt + params will always produce the same key.
/// Enforces minimum Argon2 parameters to prevent dangerously weak KDF settings.
pub fn derive_key(
    password: &[u8],
    salt: &[u8],
    argon2_params: &Argon2Params,
) -> Result<Zeroizing<[u8; KEY_LEN]>> {
    if argon2_params.memory_kib < MIN_MEMORY_KIB {
        return Err(PassVaultError::KeyDerivationFailed(format!(
            "Argon2 memory_kib must be at least {MIN_MEMORY_KIB} (got {})",
            argon2_params.memory_kib
        )));
    }
    if argon2_params.iterations < 1 {
        return Err(PassVaultError::KeyDerivationFailed(
            "Argon2 iterations must be at least 1".into(),
        ));
    }
    if argon2_params.parallelism < 1 {
        return Err(PassVaultError::KeyDerivationFailed(
            "Argon2 parallelism must be at least 1".into(),
        ));
    }

    let params = Params::new(
        argon2_params.memory_kib,
        argon2_params.iterations,
        argon2_params.parallelism,
        Some(KEY_LEN),
    )
    .map_err(|e| PassVaultError::KeyDerivationFailed(format!("invalid Argon2 params: {e}")))?;

    let argon2 = Argon2::new(Algorithm::Argon2id, Version::V0x13, params);

    let mut key = Zeroizing::new([0u8; KEY_LEN]);
    argon2
        .hash_password_into(password, salt, &mut key[..])
        .map_err(|e| PassVaultError::KeyDerivationFailed(format!("Argon2id hashing failed: {e}")))?;

    Ok(key)
}

/// Generate a cryptographically random 32-byte salt.
pub fn generate_salt() -> Result<[u8; SALT_LEN]> {
    random_bytes()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fast() -> Argon2Params {
        Argon2Params {
            memory_kib: 8_192,
            iterations: 1,
            parallelism: 1,
        }
    }

    #[test]
    fn same_inputs_same_key() {
        let salt = generate_salt().unwrap();
        let a = derive_key(b"pw", &salt, &fast()).unwrap();
        let b = derive_key(b"pw", &salt, &fast()).unwrap();
        assert_eq!(*a, *b);
    }

    #[test]
    fn different_salt_different_key() {
        let a = derive_key(b"pw", &generate_salt().unwrap(), &fast()).unwrap();
        let b = derive_key(b"pw", &generate_salt().unwrap(), &fast()).unwrap();
        assert_ne!(*a, *b);
    }

    #[test]
    fn rejects_weak_memory_cost() {
        let weak = Argon2Params {
            memory_kib: 1_024,
            ..fast()
        };
        let err = derive_key(b"pw", &[0u8; SALT_LEN], &weak).unwrap_err();
        assert!(err.to_string().contains("memory_kib"));
    }

    #[test]
    fn rejects_zero_iterations() {
        let weak = Argon2Params {
            iterations: 0,
            ..fast()
        };
        assert!(derive_key(b"pw", &[0u8; SALT_LEN], &weak).is_err());
    }
}

//! The vault's configuration record and master key handling.
//!
//! `config` holds the master public key in the clear and the master
//! private key sealed under a key derived from the master password:
//!
//! ```text
//! private_sealed = AES-256-GCM( Argon2id(password, salt, params), private_key )
//! ```
//!
//! Every operation reads it: writers need the public key to seal, readers
//! need the password to recover the private key.

use std::fs;
use std::path::Path;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use zeroize::Zeroizing;

use super::format::{base64_decode, base64_encode, write_atomic};
use crate::crypto::kdf::{derive_key, generate_salt, Argon2Params};
use crate::crypto::keys::KEY_LEN;
use crate::crypto::{decrypt, encrypt, generate_keypair, PrivateKey, PublicKey};
use crate::errors::{PassVaultError, Result};

/// Current config record version.
pub const CONFIG_VERSION: u8 = 1;

/// Persisted configuration record.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConfigRecord {
    pub version: u8,

    /// Operator identity recorded at init time.
    pub user: String,

    /// Recipient key for every sealed entry.
    pub master_public_key: PublicKey,

    /// Master private key, sealed under the password-derived key.
    #[serde(serialize_with = "base64_encode", deserialize_with = "base64_decode")]
    pub master_private_sealed: Vec<u8>,

    /// Argon2id salt for the password-derived key.
    #[serde(serialize_with = "base64_encode", deserialize_with = "base64_decode")]
    pub salt: Vec<u8>,

    /// Argon2id parameters used to seal `master_private_sealed`.
    pub argon2: Argon2Params,

    pub created_at: DateTime<Utc>,
}

impl ConfigRecord {
    /// Generate a new master key pair and seal its private half under
    /// `password`.
    pub fn generate(password: &[u8], user: &str, params: &Argon2Params) -> Result<Self> {
        let pair = generate_keypair()?;
        let mut record = Self {
            version: CONFIG_VERSION,
            user: user.to_string(),
            master_public_key: pair.public,
            master_private_sealed: Vec::new(),
            salt: Vec::new(),
            argon2: *params,
            created_at: Utc::now(),
        };
        record.wrap_private(&pair.private, password, params)?;
        Ok(record)
    }

    /// Read and parse `config`.
    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            let root = path.parent().unwrap_or(Path::new("."));
            return Err(PassVaultError::VaultNotInitialized(root.to_path_buf()));
        }
        let data = fs::read(path)?;
        let record: Self = serde_json::from_slice(&data)
            .map_err(|e| PassVaultError::CorruptionError(format!("config: {e}")))?;
        if record.version != CONFIG_VERSION {
            return Err(PassVaultError::CorruptionError(format!(
                "unsupported config version {}, expected {CONFIG_VERSION}",
                record.version
            )));
        }
        Ok(record)
    }

    /// Write `config` atomically.
    pub fn save(&self, path: &Path) -> Result<()> {
        let data = serde_json::to_vec_pretty(self)
            .map_err(|e| PassVaultError::SerializationError(format!("config: {e}")))?;
        write_atomic(path, &data)
    }

    /// Recover the master private key with `password`.
    ///
    /// A failed tag check means the password is wrong; a key that does not
    /// match the recorded public key means the record itself is damaged.
    pub fn unlock(&self, password: &[u8]) -> Result<PrivateKey> {
        let wrapping_key = derive_key(password, &self.salt, &self.argon2)?;
        let raw = Zeroizing::new(
            decrypt(&wrapping_key[..], &self.master_private_sealed).map_err(|e| match e {
                PassVaultError::AuthenticationFailure => PassVaultError::WrongMasterPassword,
                other => other,
            })?,
        );

        let bytes: [u8; KEY_LEN] = raw.as_slice().try_into().map_err(|_| {
            PassVaultError::CorruptionError("sealed master key has the wrong length".into())
        })?;
        let private = PrivateKey::from_bytes(Zeroizing::new(bytes));

        if private.public_key() != self.master_public_key {
            return Err(PassVaultError::CorruptionError(
                "master private key does not match the recorded public key".into(),
            ));
        }
        Ok(private)
    }

    /// Re-seal the master private key under a new password (fresh salt).
    ///
    /// Entries are untouched: they are sealed to the public key, which
    /// does not change.
    pub fn rewrap(
        &mut self,
        old_password: &[u8],
        new_password: &[u8],
        params: &Argon2Params,
    ) -> Result<()> {
        let private = self.unlock(old_password)?;
        self.wrap_private(&private, new_password, params)
    }

    fn wrap_private(
        &mut self,
        private: &PrivateKey,
        password: &[u8],
        params: &Argon2Params,
    ) -> Result<()> {
        let salt = generate_salt()?;
        let wrapping_key = derive_key(password, &salt, params)?;
        self.master_private_sealed = encrypt(&wrapping_key[..], &private.to_bytes()[..])?;
        self.salt = salt.to_vec();
        self.argon2 = *params;
        Ok(())
    }
}

/// Best-effort operator identity for new vaults.
pub fn current_user() -> String {
    ["USER", "USERNAME", "LOGNAME"]
        .iter()
        .find_map(|var| std::env::var(var).ok().filter(|v| !v.is_empty()))
        .unwrap_or_else(|| "unknown".to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn fast() -> Argon2Params {
        Argon2Params {
            memory_kib: 8_192,
            iterations: 1,
            parallelism: 1,
        }
    }

    #[test]
    fn generate_then_unlock() {
        let record = ConfigRecord::generate(b"correct horse", "alice", &fast()).unwrap();
        let private = record.unlock(b"correct horse").unwrap();
        assert_eq!(private.public_key(), record.master_public_key);
    }

    #[test]
    fn wrong_password_is_reported_as_such() {
        let record = ConfigRecord::generate(b"correct horse", "alice", &fast()).unwrap();
        let err = record.unlock(b"battery staple").unwrap_err();
        assert!(matches!(err, PassVaultError::WrongMasterPassword));
    }

    #[test]
    fn save_and_load_roundtrip() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("config");
        let record = ConfigRecord::generate(b"pw-123456", "bob", &fast()).unwrap();
        record.save(&path).unwrap();

        let loaded = ConfigRecord::load(&path).unwrap();
        assert_eq!(loaded.user, "bob");
        assert_eq!(loaded.master_public_key, record.master_public_key);
        assert!(loaded.unlock(b"pw-123456").is_ok());
    }

    #[test]
    fn rewrap_changes_password_but_not_public_key() {
        let mut record = ConfigRecord::generate(b"old-password", "carol", &fast()).unwrap();
        let public = record.master_public_key;

        record
            .rewrap(b"old-password", b"new-password", &fast())
            .unwrap();

        assert_eq!(record.master_public_key, public);
        assert!(record.unlock(b"new-password").is_ok());
        assert!(matches!(
            record.unlock(b"old-password"),
            Err(PassVaultError::WrongMasterPassword)
        ));
    }

    #[test]
    fn load_missing_config_is_not_initialized() {
        let dir = TempDir::new().unwrap();
        let err = ConfigRecord::load(&dir.path().join("config")).unwrap_err();
        assert!(matches!(err, PassVaultError::VaultNotInitialized(_)));
    }

    #[test]
    fn load_garbage_is_corruption() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("config");
        fs::write(&path, "{not json").unwrap();
        assert!(matches!(
            ConfigRecord::load(&path),
            Err(PassVaultError::CorruptionError(_))
        ));
    }
}

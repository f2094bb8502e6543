use std::path::PathBuf;
use thiserror::Error;

/// All errors that can occur in PassVault.
#[derive(Debug, Error)]
pub enum PassVaultError {
    // --- Crypto errors ---
    #[error("Encryption failed: {0}")]
    EncryptionFailed(String),

    #[error("Authentication failed — sealed payload was tampered with or the key is wrong")]
    AuthenticationFailure,

    #[error("Wrong master password")]
    WrongMasterPassword,

    #[error("Key derivation failed: {0}")]
    KeyDerivationFailed(String),

    #[error("Random source unavailable: {0}")]
    RandomSourceUnavailable(String),

    // --- Vault errors ---
    #[error("No vault found at {0} — run `passvault init` or `passvault clone <url>`")]
    VaultNotInitialized(PathBuf),

    #[error("Vault already exists at {0}")]
    VaultAlreadyExists(PathBuf),

    #[error("Vault store is corrupted: {0}")]
    CorruptionError(String),

    #[error("Integrity digest mismatch — the store may have been tampered with")]
    IntegrityMismatch,

    #[error("Vault is under attack ({0}) — refusing to modify it until the flag is cleared")]
    VaultUnderAttack(String),

    #[error("Entry '{0}' not found")]
    NotFound(String),

    #[error("Entry '{0}' already exists")]
    DuplicateName(String),

    #[error("Invalid entry name '{name}': {reason}")]
    InvalidName { name: String, reason: String },

    #[error("Vault is locked by another process ({0}) — retry once it finishes")]
    VaultLocked(PathBuf),

    // --- Sync errors ---
    #[error("Sync failed: {0}")]
    SyncFailure(String),

    // --- Keyring errors ---
    #[error("Keyring error: {0}")]
    KeyringError(String),

    // --- Config errors ---
    #[error("Config file error: {0}")]
    ConfigError(String),

    // --- IO errors ---
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    // --- Serialization errors ---
    #[error("Serialization error: {0}")]
    SerializationError(String),

    // --- CLI errors ---
    #[error("Command failed: {0}")]
    CommandFailed(String),

    #[error("Audit error: {0}")]
    AuditError(String),
}

/// Convenience type alias for PassVault results.
pub type Result<T> = std::result::Result<T, PassVaultError>;

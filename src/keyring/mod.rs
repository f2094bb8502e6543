//! OS keyring integration for master password caching.
//!
//! Stores and retrieves the master password from the operating system's
//! secure credential store:
//! - macOS: Keychain
//! - Windows: Credential Manager
//! - Linux: Secret Service (GNOME Keyring / KDE Wallet)
//!
//! All operations fail gracefully: if the keyring is unavailable the
//! error is returned and `InteractivePrompt` falls back to a prompt.

use crate::errors::{PassVaultError, Result};

/// Service name used in the OS keyring.
const SERVICE_NAME: &str = "passvault";

/// Keyring user name for a vault root.
fn entry_key(vault_id: &str) -> String {
    format!("vault:{vault_id}")
}

fn entry(vault_id: &str) -> Result<keyring::Entry> {
    keyring::Entry::new(SERVICE_NAME, &entry_key(vault_id))
        .map_err(|e| PassVaultError::KeyringError(format!("failed to create keyring entry: {e}")))
}

/// Store the master password for the vault at `vault_id`.
pub fn store_password(vault_id: &str, password: &str) -> Result<()> {
    entry(vault_id)?.set_password(password).map_err(|e| {
        PassVaultError::KeyringError(format!("failed to store password in keyring: {e}"))
    })
}

/// Retrieve the cached master password, `None` if nothing is stored.
pub fn get_password(vault_id: &str) -> Result<Option<String>> {
    match entry(vault_id)?.get_password() {
        Ok(password) => Ok(Some(password)),
        Err(keyring::Error::NoEntry) => Ok(None),
        Err(e) => Err(PassVaultError::KeyringError(format!(
            "failed to read from keyring: {e}"
        ))),
    }
}

/// Forget the cached master password.
pub fn delete_password(vault_id: &str) -> Result<()> {
    match entry(vault_id)?.delete_credential() {
        Ok(()) | Err(keyring::Error::NoEntry) => Ok(()),
        Err(e) => Err(PassVaultError::KeyringError(format!(
            "failed to delete from keyring: {e}"
        ))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn entry_key_is_scoped_to_vault() {
        assert_eq!(entry_key("/home/a/.passvault"), "vault:/home/a/.passvault");
    }
}

//! `passvault init`: create a new vault and master key pair.

use crate::cli::output;
use crate::cli::{audit, prompt_new_password, vault_root, Cli};
use crate::config::Settings;
use crate::errors::{PassVaultError, Result};
use crate::sync::SyncBridge;
use crate::vault::{VaultPaths, VaultStore};

/// Execute the `init` command.
pub fn execute(cli: &Cli) -> Result<()> {
    let root = vault_root(cli)?;
    let paths = VaultPaths::new(&root);

    if paths.is_initialized() {
        output::tip("Use `passvault insert <NAME>` to add passwords to the existing vault.");
        return Err(PassVaultError::VaultAlreadyExists(root));
    }

    let password = prompt_new_password()?;

    let settings = Settings::load(&root)?;
    let sync = SyncBridge::git(&root, &settings);
    let store = VaultStore::init(paths, password.as_bytes(), settings, sync)?;

    audit(store.root(), "init", None, Some("vault created"));
    output::success(&format!("Vault created at {}", root.display()));
    output::info(&format!(
        "Master public key: {}",
        store.master_public_key().to_hex()
    ));
    output::tip("Sync it with `passvault remote <URL>` followed by `passvault push`.");

    Ok(())
}

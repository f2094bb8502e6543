//! `passvault integrity`: verify the store digest, or clear the attack flag.

use crate::cli::output;
use crate::cli::{audit, credentials, open_store, report_sync, vault_root, Cli};
use crate::config::Settings;
use crate::errors::{PassVaultError, Result};
use crate::sync::SyncBridge;
use crate::vault::{VaultPaths, VaultStore};

/// Execute the `integrity` command.
pub fn execute(cli: &Cli, reset: bool) -> Result<()> {
    if reset {
        return reset_flag(cli);
    }

    let store = match open_store(cli) {
        Ok(store) => store,
        Err(e @ PassVaultError::IntegrityMismatch) => {
            output::tip("Inspect the vault history (`git log` in the vault directory).");
            output::tip("Once satisfied, accept the current state with `passvault integrity --reset`.");
            return Err(e);
        }
        Err(e) => return Err(e),
    };

    match store.integrity().flag().reason() {
        Some(reason) => {
            output::warning(&format!("Store digest verifies, but the vault is flagged: {reason}"));
            output::tip("Clear it with `passvault integrity --reset`.");
            Err(PassVaultError::VaultUnderAttack(reason))
        }
        None => {
            output::success(&format!(
                "Store digest verified ({} entries)",
                store.len()
            ));
            Ok(())
        }
    }
}

fn reset_flag(cli: &Cli) -> Result<()> {
    let root = vault_root(cli)?;
    let settings = Settings::load(&root)?;
    let mut creds = credentials(cli, &root, &settings);
    let sync = SyncBridge::git(&root, &settings);

    output::warning("Clearing the attack flag accepts the store exactly as it is on disk.");
    let (store, report) =
        VaultStore::acknowledge_tampering(VaultPaths::new(&root), settings, sync, &mut creds)?;

    audit(store.root(), "integrity-reset", None, None);
    output::success(&format!(
        "Attack flag cleared; store re-digested with {} entries",
        store.len()
    ));
    report_sync(&report);

    Ok(())
}

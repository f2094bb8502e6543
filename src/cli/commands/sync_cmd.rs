//! `passvault pull | push | remote | clone`: forward to git.

use crate::cli::output;
use crate::cli::{audit, open_store, vault_root, Cli};
use crate::config::Settings;
use crate::errors::Result;
use crate::sync::SyncBridge;

/// Execute the `pull` command.
pub fn execute_pull(cli: &Cli) -> Result<()> {
    let mut store = open_store(cli)?;
    store.pull()?;

    audit(store.root(), "pull", None, None);
    output::success(&format!(
        "Pulled and verified ({} entries)",
        store.len()
    ));
    Ok(())
}

/// Execute the `push` command.
pub fn execute_push(cli: &Cli) -> Result<()> {
    let store = open_store(cli)?;
    store.sync().push()?;

    audit(store.root(), "push", None, None);
    output::success("Pushed to remote");
    Ok(())
}

/// Execute the `remote` command.
pub fn execute_remote(cli: &Cli, url: &str) -> Result<()> {
    let store = open_store(cli)?;
    store.sync().configure_remote(url)?;

    audit(store.root(), "remote", None, Some(url));
    output::success(&format!("Remote set to {url}"));
    output::tip("Run `passvault push` to upload the vault.");
    Ok(())
}

/// Execute the `clone` command.
pub fn execute_clone(cli: &Cli, url: &str) -> Result<()> {
    let root = vault_root(cli)?;
    let bridge = SyncBridge::git(&root, &Settings::default());
    bridge.clone_vault(url)?;

    audit(&root, "clone", None, Some(url));
    output::success(&format!("Cloned vault into {}", root.display()));
    Ok(())
}

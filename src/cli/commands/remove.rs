//! `passvault remove` / `passvault remove-file`: delete an entry.

use crate::cli::output;
use crate::cli::{audit, confirm, open_store, report_sync, Cli};
use crate::errors::{PassVaultError, Result};

/// Execute the `remove` command (password entries).
pub fn execute(cli: &Cli, name: &str, force: bool) -> Result<()> {
    remove(cli, name, force, false)
}

/// Execute the `remove-file` command (file entries).
pub fn execute_file(cli: &Cli, name: &str, force: bool) -> Result<()> {
    remove(cli, name, force, true)
}

fn remove(cli: &Cli, name: &str, force: bool, want_file: bool) -> Result<()> {
    let mut store = open_store(cli)?;

    let is_file = store
        .get(name)
        .map(|e| e.is_file)
        .ok_or_else(|| PassVaultError::NotFound(name.to_string()))?;
    if is_file != want_file {
        let hint = if is_file { "remove-file" } else { "remove" };
        return Err(PassVaultError::CommandFailed(format!(
            "'{name}' is a {} entry; use `passvault {hint} {name}`",
            if is_file { "file" } else { "password" }
        )));
    }

    // Unless --force is set, ask for confirmation before deleting.
    if !force && !confirm(&format!("Remove '{name}'?"))? {
        output::info("Cancelled.");
        return Ok(());
    }

    let report = store.remove_entry(name)?;

    audit(
        store.root(),
        if want_file { "remove-file" } else { "remove" },
        Some(name),
        None,
    );
    output::success(&format!("Removed '{name}'"));
    report_sync(&report);

    Ok(())
}

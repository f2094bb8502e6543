//! `passvault edit`: replace a password, re-sealing it under a new entry key.

use crate::cli::output;
use crate::cli::{audit, open_store, read_secret_value, report_sync, Cli};
use crate::errors::{PassVaultError, Result};

/// Execute the `edit` command.
pub fn execute(cli: &Cli, name: &str, value: Option<&str>) -> Result<()> {
    let mut store = open_store(cli)?;

    let entry = store
        .get(name)
        .ok_or_else(|| PassVaultError::NotFound(name.to_string()))?;
    if entry.is_file {
        return Err(PassVaultError::CommandFailed(format!(
            "'{name}' is a file entry; use `passvault insert-file {name} <PATH> --force`"
        )));
    }

    let secret = read_secret_value(name, value)?;
    let report = store.replace_secret(name, secret.as_bytes())?;

    audit(store.root(), "edit", Some(name), None);
    output::success(&format!("Updated '{name}'"));
    report_sync(&report);

    Ok(())
}

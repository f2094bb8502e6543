//! `passvault insert`: seal a password under a fresh entry key.

use std::io::{self, IsTerminal};

use crate::cli::output;
use crate::cli::{audit, confirm, open_store, read_secret_value, report_sync, Cli};
use crate::errors::{PassVaultError, Result};
use crate::vault::validate_name;

/// Execute the `insert` command.
pub fn execute(cli: &Cli, name: &str, value: Option<&str>, force: bool) -> Result<()> {
    validate_name(name)?;
    let mut store = open_store(cli)?;
    let secret = read_secret_value(name, value)?;

    let report = match store.insert_password(name, &secret, force) {
        Err(PassVaultError::DuplicateName(dup)) => {
            if !io::stdin().is_terminal() {
                output::tip("Pass --force to overwrite it.");
                return Err(PassVaultError::DuplicateName(dup));
            }
            if !confirm(&format!("'{name}' already exists. Overwrite?"))? {
                output::info("Cancelled.");
                return Ok(());
            }
            store.insert_password(name, &secret, true)?
        }
        other => other?,
    };

    audit(store.root(), "insert", Some(name), None);
    output::success(&format!(
        "Inserted '{name}' ({} entries total)",
        store.len()
    ));
    report_sync(&report);

    Ok(())
}

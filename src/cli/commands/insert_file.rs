//! `passvault insert-file`: seal a file into a side-car blob.

use std::fs;
use std::io::{self, IsTerminal};
use std::path::Path;

use zeroize::Zeroizing;

use crate::cli::output;
use crate::cli::{audit, confirm, open_store, report_sync, Cli};
use crate::errors::{PassVaultError, Result};
use crate::vault::validate_name;

/// Execute the `insert-file` command.
pub fn execute(cli: &Cli, name: &str, path: &Path, force: bool) -> Result<()> {
    validate_name(name)?;
    let contents = Zeroizing::new(fs::read(path).map_err(|e| {
        PassVaultError::CommandFailed(format!("cannot read {}: {e}", path.display()))
    })?);

    let mut store = open_store(cli)?;
    let report = match store.insert_file(name, &contents, force) {
        Err(PassVaultError::DuplicateName(dup)) => {
            if !io::stdin().is_terminal() {
                output::tip("Pass --force to overwrite it.");
                return Err(PassVaultError::DuplicateName(dup));
            }
            if !confirm(&format!("'{name}' already exists. Overwrite?"))? {
                output::info("Cancelled.");
                return Ok(());
            }
            store.insert_file(name, &contents, true)?
        }
        other => other?,
    };

    audit(
        store.root(),
        "insert-file",
        Some(name),
        Some(&format!("{} bytes", contents.len())),
    );
    output::success(&format!(
        "Inserted file '{name}' ({} bytes)",
        contents.len()
    ));
    report_sync(&report);

    Ok(())
}

//! `passvault show`: unseal and print a password, or write out a file.

use std::io::Write;
use std::path::Path;

use crate::cli::output;
use crate::cli::{audit, credentials, open_store, Cli};
use crate::errors::{PassVaultError, Result};
use crate::vault::format::write_atomic;

/// Execute the `show` command.
pub fn execute(cli: &Cli, name: &str, copy: bool, output_path: Option<&str>) -> Result<()> {
    let store = open_store(cli)?;
    let is_file = store
        .get(name)
        .map(|e| e.is_file)
        .ok_or_else(|| PassVaultError::NotFound(name.to_string()))?;

    let mut creds = credentials(cli, store.root(), store.settings());
    let plaintext = store.retrieve_plaintext(name, &mut creds)?;
    audit(store.root(), "show", Some(name), copy.then_some("clipboard"));

    if let Some(path) = output_path {
        write_atomic(Path::new(path), &plaintext)?;
        output::success(&format!("Wrote '{name}' to {path}"));
        return Ok(());
    }

    if is_file {
        if copy {
            output::warning("File entries cannot be copied to the clipboard; writing to stdout.");
        }
        let mut stdout = std::io::stdout().lock();
        stdout.write_all(&plaintext)?;
        stdout.flush()?;
        return Ok(());
    }

    let text = std::str::from_utf8(&plaintext).map_err(|_| {
        PassVaultError::SerializationError(format!("password for '{name}' is not valid UTF-8"))
    })?;

    if copy {
        copy_to_clipboard(text)?;
        output::success(&format!("Copied '{name}' to the clipboard"));
    } else {
        println!("{text}");
    }

    Ok(())
}

fn copy_to_clipboard(text: &str) -> Result<()> {
    let mut clipboard = arboard::Clipboard::new()
        .map_err(|e| PassVaultError::CommandFailed(format!("clipboard unavailable: {e}")))?;
    clipboard
        .set_text(text.to_owned())
        .map_err(|e| PassVaultError::CommandFailed(format!("clipboard write failed: {e}")))
}

//! `passvault list`: display every entry in a table.

use crate::cli::output;
use crate::cli::{open_store, Cli};
use crate::errors::Result;

/// Execute the `list` command.
pub fn execute(cli: &Cli) -> Result<()> {
    let store = open_store(cli)?;
    let entries = store.list();

    let files = entries.iter().filter(|e| e.is_file).count();
    output::info(&format!(
        "{} — {} site(s), {} file(s)",
        store.root().display(),
        entries.len() - files,
        files
    ));

    output::print_entries_table(&entries);

    if store.integrity().flag().is_set() {
        output::warning("This vault is flagged as under attack; run `passvault integrity`.");
    }

    Ok(())
}

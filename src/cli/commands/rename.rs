//! `passvault rename`: relabel an entry without re-sealing it.

use crate::cli::output;
use crate::cli::{audit, open_store, report_sync, Cli};
use crate::errors::Result;

/// Execute the `rename` command.
pub fn execute(cli: &Cli, old: &str, new: &str) -> Result<()> {
    let mut store = open_store(cli)?;
    let report = store.rename_entry(old, new)?;

    audit(store.root(), "rename", Some(new), Some(&format!("from {old}")));
    output::success(&format!("Renamed '{old}' to '{new}'"));
    report_sync(&report);

    Ok(())
}

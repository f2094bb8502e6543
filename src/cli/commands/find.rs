//! `passvault find` (alias `ls`): substring search over entry names.

use crate::cli::output;
use crate::cli::{open_store, Cli};
use crate::errors::Result;

/// Execute the `find` command.
pub fn execute(cli: &Cli, query: Option<&str>) -> Result<()> {
    let store = open_store(cli)?;
    let query = query.unwrap_or("");
    let matches = store.find(query);

    if matches.is_empty() {
        output::info(&format!("No entries match '{query}'."));
        return Ok(());
    }

    output::print_names(&matches);
    Ok(())
}

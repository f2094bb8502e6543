//! `passvault erase-pincode`: mask a pending one-time code without using it.

use crate::cli::output;
use crate::cli::{audit, vault_root, Cli};
use crate::config::Settings;
use crate::credential::OverrideStore;
use crate::errors::Result;

/// Execute the `erase-pincode` command.
pub fn execute(cli: &Cli) -> Result<()> {
    let root = vault_root(cli)?;
    let settings = Settings::load(&root)?;
    let overrides = OverrideStore::new(settings.override_path(&root));

    if !overrides.is_available() {
        output::info("No one-time code is pending.");
        return Ok(());
    }

    overrides.erase()?;
    audit(&root, "erase-pincode", None, None);
    output::success(&format!(
        "One-time code in {} erased",
        overrides.path().display()
    ));
    Ok(())
}

//! `passvault passwd`: change the master password.
//!
//! Only the sealed master private key is rewritten: entries are sealed
//! to the master public key, which stays the same.

use crate::cli::output;
use crate::cli::{audit, credentials, open_store, prompt_new_password, report_sync, Cli};
use crate::credential::{CredentialSource, FixedPassword};
use crate::errors::Result;

/// Execute the `passwd` command.
pub fn execute(cli: &Cli) -> Result<()> {
    let mut store = open_store(cli)?;

    // 1. Check the current password before asking for a new one.
    output::info("Enter your current master password.");
    let mut creds = credentials(cli, store.root(), store.settings());
    let current = creds.resolve()?;
    drop(store.config().unlock(current.secret().as_bytes())?);

    // 2. Prompt for the new password and re-seal the master key.
    output::info("Choose your new master password.");
    let new_password = prompt_new_password()?;
    let report = store.change_master_password(
        &mut FixedPassword::new(current.secret()),
        new_password.as_bytes(),
    )?;

    #[cfg(feature = "keyring-store")]
    if crate::keyring::delete_password(&crate::cli::vault_id(store.root())).is_ok() {
        output::tip("Any cached keyring password was removed; run `passvault keyring` to save the new one.");
    }

    audit(store.root(), "passwd", None, None);
    output::success("Master password changed");
    report_sync(&report);

    Ok(())
}

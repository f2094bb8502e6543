//! `passvault keyring`: save or remove the master password in the OS keyring.
//!
//! When the keyring feature is not compiled in, this returns a helpful
//! error message.

use crate::cli::Cli;
use crate::errors::Result;

/// Execute the `keyring` command.
pub fn execute(cli: &Cli, delete: bool) -> Result<()> {
    #[cfg(feature = "keyring-store")]
    {
        use crate::cli::{open_store, output, vault_id};
        use crate::credential::{CredentialSource, InteractivePrompt};

        let store = open_store(cli)?;
        let id = vault_id(store.root());

        if delete {
            crate::keyring::delete_password(&id)?;
            output::success("Password removed from OS keyring.");
        } else {
            // Verify the password works before storing it; skip the keyring
            // lookup since the user is explicitly setting it.
            let password = InteractivePrompt::new().obtain_master_password()?;
            drop(store.config().unlock(password.as_bytes())?);

            crate::keyring::store_password(&id, &password)?;
            output::success("Password saved to OS keyring. Future unlocks will be automatic.");
        }

        Ok(())
    }

    #[cfg(not(feature = "keyring-store"))]
    {
        let _ = (cli, delete);
        Err(crate::errors::PassVaultError::KeyringError(
            "keyring support not compiled — rebuild with `cargo build --features keyring-store`"
                .into(),
        ))
    }
}

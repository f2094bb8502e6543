//! CLI module: Clap argument parser, output helpers, and command implementations.

pub mod commands;
pub mod output;

use std::io::{self, IsTerminal, Read};
use std::path::{Path, PathBuf};

use clap::Parser;
use zeroize::Zeroizing;

use crate::config::{resolve_vault_root, Settings};
use crate::credential::{InteractivePrompt, OneTimeCodeSource, OverrideStore, PASSWORD_ENV};
use crate::errors::{PassVaultError, Result};
use crate::sync::SyncBridge;
use crate::vault::{MutationReport, VaultPaths, VaultStore};

/// Minimum password length to prevent trivially weak passwords.
const MIN_PASSWORD_LEN: usize = 8;

/// PassVault CLI: password and file vault with git sync.
#[derive(Parser)]
#[command(
    name = "passvault",
    about = "Password and file vault with per-entry sealing and git sync",
    version
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Commands>,

    /// Vault directory (default: $PASSVAULT_DIR, then ~/.passvault)
    #[arg(long, global = true)]
    pub vault_dir: Option<String>,

    /// One-time code to unlock the vault instead of the master password
    #[arg(long, global = true)]
    pub pincode: Option<String>,
}

/// All available subcommands.
#[derive(clap::Subcommand)]
pub enum Commands {
    /// Create a new vault and master key
    Init,

    /// List every entry
    List,

    /// Find entries whose name contains QUERY
    #[command(visible_alias = "ls")]
    Find {
        /// Substring to look for (omit to list everything)
        query: Option<String>,
    },

    /// Print a password, or write a file entry out
    Show {
        /// Entry name (e.g. email/gmail)
        name: String,
        /// Copy to the clipboard instead of printing
        #[arg(short, long)]
        copy: bool,
        /// Write file contents here instead of stdout
        #[arg(short, long)]
        output: Option<String>,
    },

    /// Add a password (inline, piped, or prompted)
    Insert {
        /// Entry name (e.g. email/gmail)
        name: String,
        /// Password value (omit for interactive prompt)
        value: Option<String>,
        /// Overwrite an existing entry without asking
        #[arg(short, long)]
        force: bool,
    },

    /// Add a file
    InsertFile {
        /// Entry name (e.g. docs/passport.pdf)
        name: String,
        /// File to seal
        path: PathBuf,
        /// Overwrite an existing entry without asking
        #[arg(short, long)]
        force: bool,
    },

    /// Replace the password of an existing entry
    Edit {
        /// Entry name
        name: String,
        /// New value (omit for interactive prompt)
        value: Option<String>,
    },

    /// Rename an entry
    Rename {
        /// Current name
        old: String,
        /// New name
        new: String,
    },

    /// Remove a password entry
    #[command(visible_alias = "rm")]
    Remove {
        /// Entry name
        name: String,
        /// Skip confirmation prompt
        #[arg(short, long)]
        force: bool,
    },

    /// Remove a file entry and its sealed blob
    RemoveFile {
        /// Entry name
        name: String,
        /// Skip confirmation prompt
        #[arg(short, long)]
        force: bool,
    },

    /// Print a random password
    Generate {
        /// Length (default: 24, minimum: 4)
        length: Option<usize>,
    },

    /// Verify the store digest and report the attack flag
    Integrity {
        /// Clear the attack flag and accept the current store (requires the master password)
        #[arg(long)]
        reset: bool,
    },

    /// Pull the vault from its remote
    Pull,

    /// Push the vault to its remote
    Push,

    /// Set the remote the vault syncs with
    Remote {
        /// Remote URL
        url: String,
    },

    /// Clone an existing vault from a remote
    Clone {
        /// Remote URL
        url: String,
    },

    /// Change the master password
    Passwd,

    /// Mask a pending one-time unlock code without using it
    ErasePincode,

    /// Save or remove the master password in the OS keyring
    Keyring {
        /// Remove the stored password instead of saving it
        #[arg(long)]
        delete: bool,
    },

    /// Show version
    Version,

    /// Generate shell completion scripts
    Completions {
        /// Shell to generate completions for (bash, zsh, fish, powershell)
        shell: String,
    },

    /// View the audit log of vault operations
    Audit {
        /// Number of entries to show (default: 50)
        #[arg(long, default_value = "50")]
        last: usize,
        /// Show entries since a duration ago (e.g. 7d, 24h, 30m)
        #[arg(long)]
        since: Option<String>,
    },
}

// ---------------------------------------------------------------------------
// Shared helpers used by multiple commands
// ---------------------------------------------------------------------------

/// Resolve the vault root from the CLI arguments.
pub fn vault_root(cli: &Cli) -> Result<PathBuf> {
    resolve_vault_root(cli.vault_dir.as_deref())
}

/// Open the vault named by the CLI arguments, verifying its digest.
pub fn open_store(cli: &Cli) -> Result<VaultStore> {
    let root = vault_root(cli)?;
    let settings = Settings::load(&root)?;
    let sync = SyncBridge::git(&root, &settings);
    VaultStore::open(VaultPaths::new(root), settings, sync)
}

/// Credential source for this invocation: `--pincode`, then the
/// override file, then env var / keyring / prompt.
pub fn credentials(
    cli: &Cli,
    root: &Path,
    settings: &Settings,
) -> OneTimeCodeSource<InteractivePrompt> {
    let prompt = InteractivePrompt::with_keyring(vault_id(root));
    let overrides = OverrideStore::new(settings.override_path(root));

    let source = OneTimeCodeSource::new(prompt).with_store(overrides);
    match &cli.pincode {
        Some(code) => source.with_code(code.clone()),
        None => source,
    }
}

/// Identifier of a vault in the OS keyring.
pub fn vault_id(root: &Path) -> String {
    root.canonicalize()
        .unwrap_or_else(|_| root.to_path_buf())
        .to_string_lossy()
        .into_owned()
}

/// Prompt for a new master password with confirmation (used during
/// `init` and `passwd`).
///
/// Also respects `PASSVAULT_PASSWORD` for scripted/CI usage.
/// Enforces a minimum password length.
pub fn prompt_new_password() -> Result<Zeroizing<String>> {
    if let Ok(pw) = std::env::var(PASSWORD_ENV) {
        if !pw.is_empty() {
            if pw.len() < MIN_PASSWORD_LEN {
                return Err(PassVaultError::CommandFailed(format!(
                    "password must be at least {MIN_PASSWORD_LEN} characters"
                )));
            }
            return Ok(Zeroizing::new(pw));
        }
    }

    loop {
        let password = dialoguer::Password::new()
            .with_prompt("Choose master password")
            .with_confirmation(
                "Confirm master password",
                "Passwords do not match, try again",
            )
            .interact()
            .map_err(|e| PassVaultError::CommandFailed(format!("password prompt: {e}")))?;

        if password.len() < MIN_PASSWORD_LEN {
            output::warning(&format!(
                "Password must be at least {MIN_PASSWORD_LEN} characters. Try again."
            ));
            continue;
        }

        return Ok(Zeroizing::new(password));
    }
}

/// Read a secret value from one of three sources: the command line,
/// piped stdin, or an interactive prompt.
pub fn read_secret_value(name: &str, inline: Option<&str>) -> Result<Zeroizing<String>> {
    if let Some(v) = inline {
        output::warning("Value provided on command line — it may appear in shell history.");
        return Ok(Zeroizing::new(v.to_string()));
    }

    if !io::stdin().is_terminal() {
        let mut buf = Zeroizing::new(String::new());
        io::stdin().read_to_string(&mut buf)?;
        let trimmed = buf.trim_end_matches(['\r', '\n']).to_string();
        return Ok(Zeroizing::new(trimmed));
    }

    let value = dialoguer::Password::new()
        .with_prompt(format!("Enter password for {name}"))
        .with_confirmation("Retype password", "Values do not match, try again")
        .interact()
        .map_err(|e| PassVaultError::CommandFailed(format!("input prompt: {e}")))?;
    Ok(Zeroizing::new(value))
}

/// Ask a yes/no question, defaulting to "no".
pub fn confirm(prompt: &str) -> Result<bool> {
    dialoguer::Confirm::new()
        .with_prompt(prompt)
        .default(false)
        .interact()
        .map_err(|e| PassVaultError::CommandFailed(format!("confirm prompt: {e}")))
}

/// Print the sync outcome of a mutation.
pub fn report_sync(report: &MutationReport) {
    if let Some(e) = &report.sync_warning {
        output::warning(&format!("Saved locally, but the sync commit failed: {e}"));
    }
}

/// Record an operation in the audit log (when compiled in).
pub fn audit(root: &Path, op: &str, name: Option<&str>, details: Option<&str>) {
    #[cfg(feature = "audit-log")]
    crate::audit::log_audit(root, op, name, details);

    #[cfg(not(feature = "audit-log"))]
    let _ = (root, op, name, details);
}

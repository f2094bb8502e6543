//! SyncBridge: hands vault mutations to the version-control collaborator.
//!
//! Every successful mutation asks for a commit. Commit failures are
//! returned to the store, which reports them as warnings: the local
//! write is already durable. `push`, `pull`, `remote` and `clone` are
//! forwarded as-is, except that anything arriving from the remote is
//! re-verified before it is trusted.

pub mod gitignore;

use std::fmt;
use std::path::{Path, PathBuf};

use crate::config::Settings;
use crate::errors::{PassVaultError, Result};
use crate::git::{GitCli, VersionControl};
use crate::vault::integrity::{AttackFlag, IntegrityGuard};
use crate::vault::layout::VaultPaths;

/// A completed change to the vault, described for the commit log.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Mutation {
    Init,
    Insert { name: String, is_file: bool },
    Replace { name: String, is_file: bool },
    Edit { name: String, is_file: bool },
    Rename { from: String, to: String },
    Remove { name: String, is_file: bool },
    MasterPassword,
    ClearAttackFlag,
}

impl Mutation {
    /// Commit message for this mutation.
    pub fn commit_message(&self) -> String {
        self.to_string()
    }
}

fn kind(is_file: bool) -> &'static str {
    if is_file {
        "file"
    } else {
        "site"
    }
}

impl fmt::Display for Mutation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Init => f.write_str("Initialize vault"),
            Self::Insert { name, is_file } => write!(f, "Insert {}: {name}", kind(*is_file)),
            Self::Replace { name, is_file } => write!(f, "Replace {}: {name}", kind(*is_file)),
            Self::Edit { name, is_file } => write!(f, "Edit {}: {name}", kind(*is_file)),
            Self::Rename { from, to } => write!(f, "Rename site: {from} -> {to}"),
            Self::Remove { name, is_file } => write!(f, "Remove {}: {name}", kind(*is_file)),
            Self::MasterPassword => f.write_str("Change master password"),
            Self::ClearAttackFlag => f.write_str("Clear attack flag"),
        }
    }
}

/// Boundary between the vault and its remote.
pub struct SyncBridge {
    vcs: Box<dyn VersionControl>,
    root: PathBuf,
    auto_commit: bool,
}

impl SyncBridge {
    pub fn new(vcs: Box<dyn VersionControl>, root: impl Into<PathBuf>, auto_commit: bool) -> Self {
        Self {
            vcs,
            root: root.into(),
            auto_commit,
        }
    }

    /// Bridge driving the git binary named in `settings`.
    pub fn git(root: impl Into<PathBuf>, settings: &Settings) -> Self {
        Self::new(
            Box::new(GitCli::new(&settings.git_program)),
            root,
            settings.auto_commit,
        )
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn auto_commit(&self) -> bool {
        self.auto_commit
    }

    /// Create the repository backing a fresh vault.
    pub fn init_repository(&self) -> Result<()> {
        self.vcs.init(&self.root)
    }

    /// Commit the on-disk state after `mutation`.
    pub fn notify_mutation(&self, mutation: &Mutation) -> Result<()> {
        if !self.auto_commit {
            tracing::debug!(%mutation, "auto-commit disabled, skipping commit");
            return Ok(());
        }
        self.vcs.commit_all(&self.root, &mutation.commit_message())
    }

    pub fn push(&self) -> Result<()> {
        self.vcs.push(&self.root)
    }

    /// Pull from the remote, then verify the store that arrived.
    ///
    /// A pulled store that fails verification raises the attack flag
    /// exactly as a local edit would.
    pub fn pull(&self, guard: &IntegrityGuard) -> Result<()> {
        self.vcs.pull(&self.root)?;
        self.verify_store(guard)
    }

    pub fn configure_remote(&self, url: &str) -> Result<()> {
        if url.trim().is_empty() {
            return Err(PassVaultError::SyncFailure("remote URL cannot be empty".into()));
        }
        self.vcs.set_remote(&self.root, url)
    }

    /// Clone `url` into this bridge's root and verify the result.
    ///
    /// Refuses to touch a root that already exists.
    pub fn clone_vault(&self, url: &str) -> Result<()> {
        if self.root.exists() {
            return Err(PassVaultError::VaultAlreadyExists(self.root.clone()));
        }
        self.vcs.clone_into(url, &self.root)?;

        let paths = VaultPaths::new(&self.root);
        if !paths.is_initialized() {
            return Err(PassVaultError::VaultNotInitialized(self.root.clone()));
        }
        gitignore::exclude_local_state(&self.root)?;
        let guard = IntegrityGuard::new(AttackFlag::new(paths.attack_flag()));
        self.verify_store(&guard)
    }

    fn verify_store(&self, guard: &IntegrityGuard) -> Result<()> {
        let store = VaultPaths::new(&self.root).store();
        if !store.is_file() {
            return Err(PassVaultError::VaultNotInitialized(self.root.clone()));
        }
        guard.verify_file(&store).map(|_| ())
    }
}

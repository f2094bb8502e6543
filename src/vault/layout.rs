//! On-disk layout of a vault directory.
//!
//! ```text
//! <root>/
//!   config          master public key + sealed master private key (JSON)
//!   sites.vault     entries + embedded integrity digest
//!   files/<token>   one sealed blob per file entry
//!   attacked        present only while the vault is flagged as under attack
//!   .lock           advisory lock held by the running command
//!   audit.db        local operation history (never synced)
//! ```

use std::fs;
use std::path::{Path, PathBuf};

use crate::errors::Result;

/// File names inside the vault root.
pub const CONFIG_FILE: &str = "config";
pub const STORE_FILE: &str = "sites.vault";
pub const FILES_DIR: &str = "files";
pub const ATTACK_FILE: &str = "attacked";
pub const LOCK_FILE: &str = ".lock";

/// Entries written to the vault's `.gitignore`: local state that must
/// never travel through the remote.
pub const LOCAL_ONLY: &[&str] = &[ATTACK_FILE, LOCK_FILE, "audit.db", "unlock.toml", ".*.tmp"];

/// Resolved paths of one vault.
#[derive(Debug, Clone)]
pub struct VaultPaths {
    root: PathBuf,
}

impl VaultPaths {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn config(&self) -> PathBuf {
        self.root.join(CONFIG_FILE)
    }

    pub fn store(&self) -> PathBuf {
        self.root.join(STORE_FILE)
    }

    pub fn files_dir(&self) -> PathBuf {
        self.root.join(FILES_DIR)
    }

    /// Path of the sealed blob named by `token`.
    pub fn blob(&self, token: &str) -> PathBuf {
        self.files_dir().join(token)
    }

    pub fn attack_flag(&self) -> PathBuf {
        self.root.join(ATTACK_FILE)
    }

    pub fn lock(&self) -> PathBuf {
        self.root.join(LOCK_FILE)
    }

    /// `true` once `init` (or `clone`) has produced a config record.
    pub fn is_initialized(&self) -> bool {
        self.config().is_file()
    }

    /// Create the root and `files/` directories with owner-only access.
    pub fn create_dirs(&self) -> Result<()> {
        fs::create_dir_all(self.files_dir())?;

        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            fs::set_permissions(&self.root, fs::Permissions::from_mode(0o700))?;
            fs::set_permissions(self.files_dir(), fs::Permissions::from_mode(0o700))?;
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn paths_are_rooted() {
        let paths = VaultPaths::new("/v");
        assert_eq!(paths.config(), PathBuf::from("/v/config"));
        assert_eq!(paths.store(), PathBuf::from("/v/sites.vault"));
        assert_eq!(paths.blob("ab12"), PathBuf::from("/v/files/ab12"));
        assert_eq!(paths.attack_flag(), PathBuf::from("/v/attacked"));
    }

    #[test]
    fn create_dirs_makes_files_dir() {
        let tmp = TempDir::new().unwrap();
        let paths = VaultPaths::new(tmp.path().join("vault"));
        paths.create_dirs().unwrap();
        assert!(paths.files_dir().is_dir());
        assert!(!paths.is_initialized());
    }
}

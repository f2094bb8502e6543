//! Advisory lock held from load through persist.
//!
//! The lock is a file created with create-new semantics, so two
//! invocations cannot both hold it.  It records the holder's pid and is
//! removed when the guard drops.  A lock older than the configured stale
//! age (left behind by a crashed process) is taken over.

use std::fs;
use std::io::{ErrorKind, Write};
use std::path::{Path, PathBuf};
use std::time::{Duration, SystemTime};

use crate::errors::{PassVaultError, Result};

/// RAII guard for the vault lock file.
#[derive(Debug)]
pub struct VaultLock {
    path: PathBuf,
}

impl VaultLock {
    /// Acquire the lock at `path`, taking over a lock older than `stale_after`.
    pub fn acquire(path: &Path, stale_after: Duration) -> Result<Self> {
        match Self::try_create(path) {
            Ok(lock) => Ok(lock),
            Err(e) if e.kind() == ErrorKind::AlreadyExists => {
                if !Self::is_stale(path, stale_after) {
                    return Err(PassVaultError::VaultLocked(path.to_path_buf()));
                }
                tracing::warn!(lock = %path.display(), "taking over stale vault lock");
                fs::remove_file(path)?;
                Self::try_create(path).map_err(|e| match e.kind() {
                    ErrorKind::AlreadyExists => PassVaultError::VaultLocked(path.to_path_buf()),
                    _ => e.into(),
                })
            }
            Err(e) => Err(e.into()),
        }
    }

    fn try_create(path: &Path) -> std::io::Result<Self> {
        let mut file = fs::OpenOptions::new()
            .write(true)
            .create_new(true)
            .open(path)?;
        writeln!(file, "{}", std::process::id())?;
        Ok(Self {
            path: path.to_path_buf(),
        })
    }

    fn is_stale(path: &Path, stale_after: Duration) -> bool {
        fs::metadata(path)
            .and_then(|m| m.modified())
            .ok()
            .and_then(|modified| SystemTime::now().duration_since(modified).ok())
            .is_some_and(|age| age > stale_after)
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl Drop for VaultLock {
    fn drop(&mut self) {
        let _ = fs::remove_file(&self.path);
    }
}

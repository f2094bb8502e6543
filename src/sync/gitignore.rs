//! Shared `.gitignore` patching logic.
//!
//! Used by `init` and `clone` to keep vault-local state (the attack
//! flag, the lock file, the audit log, one-time codes) out of the remote.

use std::fs;
use std::path::Path;

use crate::errors::Result;
use crate::vault::layout::LOCAL_ONLY;

/// Append `entry` to `<dir>/.gitignore` if not already present.
///
/// Creates the file if it doesn't exist. Returns `true` when a line was
/// added.
pub fn patch_gitignore(dir: &Path, entry: &str) -> Result<bool> {
    let gitignore_path = dir.join(".gitignore");

    let existing = match fs::read_to_string(&gitignore_path) {
        Ok(text) => text,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => String::new(),
        Err(e) => return Err(e.into()),
    };

    if existing.lines().any(|line| line.trim() == entry) {
        return Ok(false);
    }

    let separator = if existing.ends_with('\n') || existing.is_empty() {
        ""
    } else {
        "\n"
    };

    fs::write(&gitignore_path, format!("{existing}{separator}{entry}\n"))?;
    tracing::debug!(entry, "added to .gitignore");
    Ok(true)
}

/// Make sure every local-only path of the vault is ignored.
pub fn exclude_local_state(root: &Path) -> Result<()> {
    for entry in LOCAL_ONLY {
        patch_gitignore(root, entry)?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn adds_entry_to_new_gitignore() {
        let dir = TempDir::new().unwrap();
        assert!(patch_gitignore(dir.path(), "attacked").unwrap());

        let content = fs::read_to_string(dir.path().join(".gitignore")).unwrap();
        assert!(content.contains("attacked"));
    }

    #[test]
    fn does_not_duplicate_entry() {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join(".gitignore"), ".lock\n").unwrap();

        assert!(!patch_gitignore(dir.path(), ".lock").unwrap());

        let content = fs::read_to_string(dir.path().join(".gitignore")).unwrap();
        assert_eq!(content.matches(".lock").count(), 1);
    }

    #[test]
    fn appends_with_newline_separator() {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join(".gitignore"), "notes.txt").unwrap(); // no trailing newline

        patch_gitignore(dir.path(), "audit.db").unwrap();

        let content = fs::read_to_string(dir.path().join(".gitignore")).unwrap();
        assert_eq!(content, "notes.txt\naudit.db\n");
    }

    #[test]
    fn exclude_local_state_covers_every_local_path() {
        let dir = TempDir::new().unwrap();
        exclude_local_state(dir.path()).unwrap();
        exclude_local_state(dir.path()).unwrap();

        let content = fs::read_to_string(dir.path().join(".gitignore")).unwrap();
        for entry in LOCAL_ONLY {
            assert_eq!(content.lines().filter(|l| l == entry).count(), 1);
        }
    }
}

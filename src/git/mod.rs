//! Git integration: the external version-control collaborator.
//!
//! The vault never speaks git itself; it shells out to the `git` binary
//! through the `VersionControl` trait so tests (and alternative
//! transports) can swap in their own implementation.

use std::path::{Path, PathBuf};
use std::process::{Command, Output};

use crate::errors::{PassVaultError, Result};

/// Remote name used for `push`, `pull` and `remote`.
pub const REMOTE_NAME: &str = "origin";

/// Operations the vault requests from its version-control collaborator.
pub trait VersionControl {
    /// Create a repository in `dir` (no-op if one already exists).
    fn init(&self, dir: &Path) -> Result<()>;

    /// Stage everything in `dir` and commit it with `message`.
    /// A clean tree is not an error.
    fn commit_all(&self, dir: &Path, message: &str) -> Result<()>;

    fn push(&self, dir: &Path) -> Result<()>;

    fn pull(&self, dir: &Path) -> Result<()>;

    /// Point `origin` at `url`, replacing any previous value.
    fn set_remote(&self, dir: &Path, url: &str) -> Result<()>;

    /// Clone `url` into `dir`, which must not exist yet.
    fn clone_into(&self, url: &str, dir: &Path) -> Result<()>;
}

/// `VersionControl` backed by the git command line.
#[derive(Debug, Clone)]
pub struct GitCli {
    program: PathBuf,
}

impl Default for GitCli {
    fn default() -> Self {
        Self::new("git")
    }
}

impl GitCli {
    pub fn new(program: impl Into<PathBuf>) -> Self {
        Self {
            program: program.into(),
        }
    }

    /// Run `git <args>` inside `dir`.
    fn run(&self, dir: &Path, args: &[&str]) -> Result<Output> {
        tracing::debug!(dir = %dir.display(), ?args, "running git");
        Command::new(&self.program)
            .arg("-C")
            .arg(dir)
            .args(args)
            .output()
            .map_err(|e| {
                PassVaultError::SyncFailure(format!(
                    "failed to run '{}': {e}",
                    self.program.display()
                ))
            })
    }

    fn run_checked(&self, dir: &Path, args: &[&str]) -> Result<Output> {
        let output = self.run(dir, args)?;
        if output.status.success() {
            Ok(output)
        } else {
            Err(failure(args, &output))
        }
    }
}

impl VersionControl for GitCli {
    fn init(&self, dir: &Path) -> Result<()> {
        if dir.join(".git").exists() {
            return Ok(());
        }
        self.run_checked(dir, &["init", "--quiet"])?;
        Ok(())
    }

    fn commit_all(&self, dir: &Path, message: &str) -> Result<()> {
        self.run_checked(dir, &["add", "--all"])?;

        let output = self.run(dir, &["commit", "--quiet", "-m", message])?;
        if output.status.success() || nothing_to_commit(&output) {
            return Ok(());
        }
        Err(failure(&["commit"], &output))
    }

    fn push(&self, dir: &Path) -> Result<()> {
        self.run_checked(dir, &["push", REMOTE_NAME, "HEAD"])?;
        Ok(())
    }

    fn pull(&self, dir: &Path) -> Result<()> {
        self.run_checked(dir, &["pull", "--ff-only", REMOTE_NAME])?;
        Ok(())
    }

    fn set_remote(&self, dir: &Path, url: &str) -> Result<()> {
        let existing = self.run(dir, &["remote", "get-url", REMOTE_NAME])?;
        let verb = if existing.status.success() {
            "set-url"
        } else {
            "add"
        };
        self.run_checked(dir, &["remote", verb, REMOTE_NAME, url])?;
        Ok(())
    }

    fn clone_into(&self, url: &str, dir: &Path) -> Result<()> {
        let parent = dir.parent().unwrap_or(Path::new("."));
        let target = dir.to_string_lossy();
        self.run_checked(parent, &["clone", "--quiet", url, &target])?;
        Ok(())
    }
}

fn nothing_to_commit(output: &Output) -> bool {
    let stdout = String::from_utf8_lossy(&output.stdout);
    let stderr = String::from_utf8_lossy(&output.stderr);
    stdout.contains("nothing to commit") || stderr.contains("nothing to commit")
}

fn failure(args: &[&str], output: &Output) -> PassVaultError {
    let stderr = String::from_utf8_lossy(&output.stderr);
    let detail = stderr.trim();
    let verb = args.first().copied().unwrap_or("git");
    if detail.is_empty() {
        PassVaultError::SyncFailure(format!("git {verb} exited with {}", output.status))
    } else {
        PassVaultError::SyncFailure(format!("git {verb}: {detail}"))
    }
}

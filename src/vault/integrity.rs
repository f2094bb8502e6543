//! Tamper evidence for the store file.
//!
//! The store embeds a SHA-256 digest over every byte that precedes it:
//! magic, version, header length, header and entries.
//! A mismatch on load raises the `AttackFlag`, a sentinel file in the
//! vault root.  While the flag is up every mutation is refused and the
//! digest is never recomputed, so the evidence stays on disk until an
//! operator clears it.
//!
//! This detects edits; it does not undo them.

use std::fs;
use std::path::{Path, PathBuf};

use chrono::Utc;
use sha2::{Digest, Sha256};
use subtle::ConstantTimeEq;

use super::format::{decode_store, read_image, split_body, write_atomic, RawStore};
use crate::errors::{PassVaultError, Result};

/// Length of the integrity digest (SHA-256).
pub const DIGEST_LEN: usize = 32;

/// Compute the integrity digest over a framed store body.
pub fn compute_digest(body: &[u8]) -> [u8; DIGEST_LEN] {
    Sha256::digest(body).into()
}

/// Persisted "under attack" signal.
///
/// Backed by a file so that it survives the process and so that an
/// external probe can raise it by creating the file.
#[derive(Debug, Clone)]
pub struct AttackFlag {
    path: PathBuf,
}

impl AttackFlag {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn is_set(&self) -> bool {
        self.path.exists()
    }

    /// Why the flag was raised, as recorded in the sentinel file.
    pub fn reason(&self) -> Option<String> {
        if !self.is_set() {
            return None;
        }
        let text = fs::read_to_string(&self.path).unwrap_or_default();
        let text = text.trim();
        Some(if text.is_empty() {
            "raised externally".to_string()
        } else {
            text.to_string()
        })
    }

    /// Raise the flag.  An existing reason is kept.
    pub fn raise(&self, reason: &str) -> Result<()> {
        if self.is_set() {
            return Ok(());
        }
        tracing::error!(flag = %self.path.display(), reason, "vault flagged as under attack");
        let line = format!("{} {reason}\n", Utc::now().to_rfc3339());
        write_atomic(&self.path, line.as_bytes())
    }

    /// Lower the flag.  Administrative action only.
    pub fn clear(&self) -> Result<()> {
        match fs::remove_file(&self.path) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }

    /// Fail with `VaultUnderAttack` if the flag is up.
    pub fn ensure_clear(&self) -> Result<()> {
        match self.reason() {
            Some(reason) => Err(PassVaultError::VaultUnderAttack(reason)),
            None => Ok(()),
        }
    }
}

/// Verifies and recomputes store digests, guarding the attack flag.
#[derive(Debug, Clone)]
pub struct IntegrityGuard {
    flag: AttackFlag,
}

impl IntegrityGuard {
    pub fn new(flag: AttackFlag) -> Self {
        Self { flag }
    }

    pub fn flag(&self) -> &AttackFlag {
        &self.flag
    }

    /// Digest for a freshly encoded store.
    ///
    /// Refuses while the attack flag is set: recomputing would paper over
    /// the evidence.
    pub fn recompute(&self, body: &[u8]) -> Result<[u8; DIGEST_LEN]> {
        self.flag.ensure_clear()?;
        Ok(compute_digest(body))
    }

    /// Check `stored` against the body bytes read from disk.
    ///
    /// On mismatch the attack flag is raised and `IntegrityMismatch`
    /// returned.
    pub fn verify(&self, body: &[u8], stored: &[u8; DIGEST_LEN]) -> Result<()> {
        let actual = compute_digest(body);
        if bool::from(actual[..].ct_eq(&stored[..])) {
            return Ok(());
        }
        self.flag.raise("store digest mismatch")?;
        Err(PassVaultError::IntegrityMismatch)
    }

    /// Read the store at `path` and verify its embedded digest before
    /// parsing anything, the prefix included, so any edit to the file is
    /// caught here rather than surfacing as a parse error.
    pub fn verify_file(&self, path: &Path) -> Result<RawStore> {
        let (body, stored_digest) = read_image(path)?;
        self.verify(&body, &stored_digest)?;
        let encoded = split_body(&body)?;
        let (header, entries) = decode_store(&encoded)?;
        Ok(RawStore {
            header,
            entries,
            encoded,
            stored_digest,
        })
    }
}

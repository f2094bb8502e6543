//! Audit log: SQLite-based operation history.
//!
//! Stores a record of every vault operation (insert, remove, rename,
//! show, ...) in a local SQLite database at `<vault root>/audit.db`.
//! The database is listed in the vault's `.gitignore` and never synced.
//!
//! Designed for graceful degradation: if the database can't be opened or
//! written to, operations silently continue without logging.

use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use rusqlite::Connection;

use crate::errors::{PassVaultError, Result};

/// File name of the audit database inside the vault root.
pub const AUDIT_DB: &str = "audit.db";

/// A single audit log entry.
#[derive(Debug, Clone)]
pub struct AuditEntry {
    pub id: i64,
    pub timestamp: DateTime<Utc>,
    pub operation: String,
    pub name: Option<String>,
    pub details: Option<String>,
}

/// SQLite-backed audit log.
pub struct AuditLog {
    conn: Connection,
}

impl AuditLog {
    /// Open (or create) the audit database at `<vault_root>/audit.db`.
    ///
    /// Returns `None` if the database can't be opened; callers treat
    /// this as "audit logging unavailable" and continue normally.
    pub fn open(vault_root: &Path) -> Option<Self> {
        let db_path = Self::db_path(vault_root);
        let conn = Connection::open(&db_path).ok()?;

        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            let perms = std::fs::Permissions::from_mode(0o600);
            let _ = std::fs::set_permissions(&db_path, perms);
        }

        conn.execute_batch(
            "CREATE TABLE IF NOT EXISTS audit_log (
                id          INTEGER PRIMARY KEY AUTOINCREMENT,
                timestamp   TEXT NOT NULL,
                operation   TEXT NOT NULL,
                name        TEXT,
                details     TEXT
            );",
        )
        .ok()?;

        Some(Self { conn })
    }

    /// Record an operation. Fire-and-forget: errors are ignored.
    pub fn log(&self, operation: &str, name: Option<&str>, details: Option<&str>) {
        let now = Utc::now().to_rfc3339();
        if let Err(e) = self.conn.execute(
            "INSERT INTO audit_log (timestamp, operation, name, details)
             VALUES (?1, ?2, ?3, ?4)",
            rusqlite::params![now, operation, name, details],
        ) {
            tracing::debug!(error = %e, operation, "audit write failed");
        }
    }

    /// Query recent audit entries, most recent first.
    ///
    /// - `limit`: maximum number of entries to return.
    /// - `since`: if provided, only return entries newer than this timestamp.
    pub fn query(&self, limit: usize, since: Option<DateTime<Utc>>) -> Result<Vec<AuditEntry>> {
        let limit_i64 = i64::try_from(limit).unwrap_or(i64::MAX);
        let since = since.map_or_else(String::new, |ts| ts.to_rfc3339());

        let mut stmt = self
            .conn
            .prepare(
                "SELECT id, timestamp, operation, name, details
                 FROM audit_log
                 WHERE timestamp >= ?1
                 ORDER BY id DESC
                 LIMIT ?2",
            )
            .map_err(|e| PassVaultError::AuditError(format!("query prepare: {e}")))?;

        let rows = stmt
            .query_map(rusqlite::params![since, limit_i64], |row| {
                let ts_str: String = row.get(1)?;
                let timestamp = DateTime::parse_from_rfc3339(&ts_str)
                    .map_or_else(|_| Utc::now(), |dt| dt.with_timezone(&Utc));

                Ok(AuditEntry {
                    id: row.get(0)?,
                    timestamp,
                    operation: row.get(2)?,
                    name: row.get(3)?,
                    details: row.get(4)?,
                })
            })
            .map_err(|e| PassVaultError::AuditError(format!("query exec: {e}")))?;

        let entries = rows
            .map(|row| row.map_err(|e| PassVaultError::AuditError(format!("row parse: {e}"))))
            .collect::<Result<Vec<_>>>()?;
        Ok(entries)
    }

    /// Path of the audit database for a vault root.
    pub fn db_path(vault_root: &Path) -> PathBuf {
        vault_root.join(AUDIT_DB)
    }
}

/// Log an audit event for the vault at `vault_root`.
///
/// Never fails the parent operation.
pub fn log_audit(vault_root: &Path, op: &str, name: Option<&str>, details: Option<&str>) {
    if let Some(audit) = AuditLog::open(vault_root) {
        audit.log(op, name, details);
    }
}

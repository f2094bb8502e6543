//! Entry and EntryMetadata types stored inside a vault.
//!
//! Each entry holds its name, the public half of the one-off key pair
//! that sealed it, and either the sealed payload inline (passwords) or a
//! token naming a sealed side-car blob (files).  The `sealed` field uses
//! custom serde helpers so it serializes as a base64 string in JSON
//! rather than a raw byte array.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::format::{base64_decode, base64_encode};
use crate::crypto::PublicKey;
use crate::errors::{PassVaultError, Result};

/// Longest accepted entry name, in bytes.
const MAX_NAME_LEN: usize = 256;

/// A single sealed entry stored in the vault.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Entry {
    /// Site or file path, e.g. "email/gmail".  `/` separates groups.
    pub name: String,

    /// Public key of the ephemeral key pair that sealed this entry.
    /// Never changes once written.
    pub public_key: PublicKey,

    /// Sealed password (nonce + ciphertext).  Empty for file entries.
    #[serde(
        default,
        serialize_with = "base64_encode",
        deserialize_with = "base64_decode"
    )]
    pub sealed: Vec<u8>,

    /// `true` when the payload lives in a blob under `files/`.
    #[serde(default)]
    pub is_file: bool,

    /// Token naming the sealed blob (file entries only).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub blob: Option<String>,

    /// When this entry was first created.
    pub created_at: DateTime<Utc>,

    /// When this entry was last re-sealed or renamed.
    pub updated_at: DateTime<Utc>,
}

impl Entry {
    /// Group part of the name ("email" for "email/gmail"), if any.
    pub fn group(&self) -> Option<&str> {
        self.name.rsplit_once('/').map(|(group, _)| group)
    }

    /// Leaf part of the name ("gmail" for "email/gmail").
    pub fn leaf(&self) -> &str {
        self.name
            .rsplit_once('/')
            .map_or(self.name.as_str(), |(_, leaf)| leaf)
    }

    pub fn metadata(&self) -> EntryMetadata {
        EntryMetadata {
            name: self.name.clone(),
            is_file: self.is_file,
            created_at: self.created_at,
            updated_at: self.updated_at,
        }
    }
}

/// Lightweight metadata about an entry (no sealed payload).
///
/// Used for listing so callers can display names and timestamps
/// without touching any ciphertext.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EntryMetadata {
    pub name: String,
    pub is_file: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Validate that an entry name is usable as a site/file path.
///
/// Must be non-empty, at most 256 bytes, free of control characters,
/// and must not start or end with `/` or contain an empty group (`//`).
pub fn validate_name(name: &str) -> Result<()> {
    let invalid = |reason: &str| PassVaultError::InvalidName {
        name: name.to_string(),
        reason: reason.to_string(),
    };

    if name.trim().is_empty() {
        return Err(invalid("name cannot be empty"));
    }
    if name.len() > MAX_NAME_LEN {
        return Err(invalid("name cannot exceed 256 bytes"));
    }
    if name.chars().any(char::is_control) {
        return Err(invalid("name cannot contain control characters"));
    }
    if name.starts_with('/') || name.ends_with('/') {
        return Err(invalid("name cannot start or end with '/'"));
    }
    if name.split('/').any(|segment| segment.trim().is_empty()) {
        return Err(invalid("group names cannot be empty"));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::crypto::generate_keypair;

    fn sample(name: &str) -> Entry {
        let now = Utc::now();
        Entry {
            name: name.to_string(),
            public_key: generate_keypair().unwrap().public,
            sealed: vec![1, 2, 3],
            is_file: false,
            blob: None,
            created_at: now,
            updated_at: now,
        }
    }

    #[test]
    fn group_and_leaf() {
        let e = sample("email/work/gmail");
        assert_eq!(e.group(), Some("email/work"));
        assert_eq!(e.leaf(), "gmail");

        let flat = sample("github");
        assert_eq!(flat.group(), None);
        assert_eq!(flat.leaf(), "github");
    }

    #[test]
    fn valid_names() {
        assert!(validate_name("github").is_ok());
        assert!(validate_name("email/gmail").is_ok());
        assert!(validate_name("bank accounts/My Bank").is_ok());
    }

    #[test]
    fn rejects_bad_names() {
        assert!(validate_name("").is_err());
        assert!(validate_name("   ").is_err());
        assert!(validate_name("/leading").is_err());
        assert!(validate_name("trailing/").is_err());
        assert!(validate_name("a//b").is_err());
        assert!(validate_name("tab\there").is_err());
        assert!(validate_name(&"x".repeat(257)).is_err());
    }

    #[test]
    fn password_entry_json_has_no_blob_field() {
        let json = serde_json::to_string(&sample("site")).unwrap();
        assert!(!json.contains("\"blob\""));
        assert!(json.contains("\"sealed\":\"AQID\""));
    }

    #[test]
    fn file_entry_deserializes_without_sealed_field() {
        let pk = generate_keypair().unwrap().public.to_hex();
        let json = format!(
            r#"{{"name":"docs/id.pdf","public_key":"{pk}","is_file":true,"blob":"abcd","created_at":"2024-01-01T00:00:00Z","updated_at":"2024-01-01T00:00:00Z"}}"#
        );
        let e: Entry = serde_json::from_str(&json).unwrap();
        assert!(e.is_file);
        assert!(e.sealed.is_empty());
        assert_eq!(e.blob.as_deref(), Some("abcd"));
    }
}

//! Binary store file format and atomic file writes.
//!
//! A `sites.vault` file has this layout:
//!
//! ```text
//! [PVLT: 4 bytes][version: 1 byte][header_len: 4 bytes LE][header JSON][entries JSON][SHA-256: 32 bytes]
//! ```
//!
//! - **Magic** (`PVLT`): identifies the file as a PassVault store.
//! - **Version**: format version (currently `1`).
//! - **Header length**: little-endian u32 telling us where the header
//!   JSON ends and the entries JSON begins.
//! - **Header JSON**: serialized `StoreHeader`.
//! - **Entries JSON**: serialized `Vec<Entry>`, in store order.
//! - **Digest**: integrity digest over every byte before it, prefix
//!   included, written in the same file so store and digest are replaced
//!   by one rename.

use std::fs;
use std::io::Write;
use std::path::Path;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::entry::Entry;
use super::integrity::DIGEST_LEN;
use crate::errors::{PassVaultError, Result};

// ---------------------------------------------------------------------------
// Constants
// ---------------------------------------------------------------------------

/// Magic bytes at the start of every store file.
const MAGIC: &[u8; 4] = b"PVLT";

/// Current binary format version.
pub const CURRENT_VERSION: u8 = 1;

/// Fixed-size prefix: 4 (magic) + 1 (version) + 4 (header_len).
const PREFIX_LEN: usize = 9;

// ---------------------------------------------------------------------------
// StoreHeader
// ---------------------------------------------------------------------------

/// Metadata stored at the beginning of a store file.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StoreHeader {
    /// Format version.
    pub version: u8,

    /// When this store was first created.
    pub created_at: DateTime<Utc>,

    /// When this store was last written.
    pub updated_at: DateTime<Utc>,
}

impl StoreHeader {
    pub fn new() -> Self {
        let now = Utc::now();
        Self {
            version: CURRENT_VERSION,
            created_at: now,
            updated_at: now,
        }
    }
}

impl Default for StoreHeader {
    fn default() -> Self {
        Self::new()
    }
}

// ---------------------------------------------------------------------------
// Encoding
// ---------------------------------------------------------------------------

/// The header and entries sections of a store, as bytes.
#[derive(Debug, Clone)]
pub struct EncodedStore {
    pub header_bytes: Vec<u8>,
    pub entries_bytes: Vec<u8>,
}

impl EncodedStore {
    /// Lay out the digested body: prefix, header JSON, entries JSON.
    pub fn frame(&self) -> Result<Vec<u8>> {
        let header_len = u32::try_from(self.header_bytes.len()).map_err(|_| {
            PassVaultError::SerializationError(format!(
                "header length {} exceeds u32::MAX",
                self.header_bytes.len()
            ))
        })?;
        let mut body =
            Vec::with_capacity(PREFIX_LEN + self.header_bytes.len() + self.entries_bytes.len());

        body.extend_from_slice(MAGIC); // 4 bytes
        body.push(CURRENT_VERSION); // 1 byte
        body.extend_from_slice(&header_len.to_le_bytes()); // 4 bytes LE
        body.extend_from_slice(&self.header_bytes); // header JSON
        body.extend_from_slice(&self.entries_bytes); // entries JSON
        Ok(body)
    }
}

/// Serialize header and entries into their canonical byte form.
pub fn encode_store(header: &StoreHeader, entries: &[Entry]) -> Result<EncodedStore> {
    let header_bytes = serde_json::to_vec(header)
        .map_err(|e| PassVaultError::SerializationError(format!("header: {e}")))?;
    let entries_bytes = serde_json::to_vec(entries)
        .map_err(|e| PassVaultError::SerializationError(format!("entries: {e}")))?;
    Ok(EncodedStore {
        header_bytes,
        entries_bytes,
    })
}

/// Write a framed body and its digest to disk **atomically**.
pub fn write_store(path: &Path, body: &[u8], digest: &[u8; DIGEST_LEN]) -> Result<()> {
    let mut buf = Vec::with_capacity(body.len() + DIGEST_LEN);
    buf.extend_from_slice(body);
    buf.extend_from_slice(digest); // 32 bytes
    write_atomic(path, &buf)
}

/// Raw data read from a store file on disk.
///
/// Keeps the original bytes so the digest can be verified over the
/// exact bytes that were written.
#[derive(Debug)]
pub struct RawStore {
    pub header: StoreHeader,
    pub entries: Vec<Entry>,
    pub encoded: EncodedStore,
    /// The digest stored at the end of the file.
    pub stored_digest: [u8; DIGEST_LEN],
}

/// Read a store file and parse it **without** checking the digest.
///
/// Structural problems are `CorruptionError`.  Only for callers that
/// have deliberately chosen to accept unverified bytes.
pub fn read_store(path: &Path) -> Result<RawStore> {
    let (body, stored_digest) = read_image(path)?;
    let encoded = split_body(&body)?;
    let (header, entries) = decode_store(&encoded)?;
    Ok(RawStore {
        header,
        entries,
        encoded,
        stored_digest,
    })
}

/// Split a store file into its digested body and the trailing digest.
///
/// Only the minimum length is checked; the prefix is left for
/// `split_body` so that edits to it are caught by the digest first.
pub fn read_image(path: &Path) -> Result<(Vec<u8>, [u8; DIGEST_LEN])> {
    let mut data = fs::read(path)?;

    if data.len() < PREFIX_LEN + DIGEST_LEN {
        return Err(PassVaultError::CorruptionError(
            "file too small to be a valid store".into(),
        ));
    }

    let body_len = data.len() - DIGEST_LEN;
    let mut stored_digest = [0u8; DIGEST_LEN];
    stored_digest.copy_from_slice(&data[body_len..]);
    data.truncate(body_len);
    Ok((data, stored_digest))
}

/// Parse the fixed prefix of a body and cut out its two sections.
pub fn split_body(body: &[u8]) -> Result<EncodedStore> {
    if body.len() < PREFIX_LEN {
        return Err(PassVaultError::CorruptionError(
            "file too small to be a valid store".into(),
        ));
    }

    if &body[0..4] != MAGIC {
        return Err(PassVaultError::CorruptionError(
            "missing PVLT magic bytes".into(),
        ));
    }

    let version = body[4];
    if version != CURRENT_VERSION {
        return Err(PassVaultError::CorruptionError(format!(
            "unsupported version {version}, expected {CURRENT_VERSION}"
        )));
    }

    let header_len_u32 = u32::from_le_bytes([body[5], body[6], body[7], body[8]]);
    let header_len = usize::try_from(header_len_u32).map_err(|_| {
        PassVaultError::CorruptionError(format!(
            "header length {header_len_u32} exceeds platform address space"
        ))
    })?;

    let header_end = PREFIX_LEN
        .checked_add(header_len)
        .filter(|end| *end <= body.len())
        .ok_or_else(|| PassVaultError::CorruptionError("header length exceeds file size".into()))?;

    Ok(EncodedStore {
        header_bytes: body[PREFIX_LEN..header_end].to_vec(),
        entries_bytes: body[header_end..].to_vec(),
    })
}

/// Parse the header and entries sections.
pub fn decode_store(encoded: &EncodedStore) -> Result<(StoreHeader, Vec<Entry>)> {
    let header: StoreHeader = serde_json::from_slice(&encoded.header_bytes)
        .map_err(|e| PassVaultError::CorruptionError(format!("header JSON: {e}")))?;

    let entries: Vec<Entry> = serde_json::from_slice(&encoded.entries_bytes)
        .map_err(|e| PassVaultError::CorruptionError(format!("entries JSON: {e}")))?;

    Ok((header, entries))
}

/// Replace `path` with `data` so readers see either the old or the new
/// content, never a partial write.
///
/// The temp file lives in the same directory so the rename stays on one
/// filesystem.  On Unix the file is created owner-only.
pub fn write_atomic(path: &Path, data: &[u8]) -> Result<()> {
    let parent = path.parent().unwrap_or(Path::new("."));
    let tmp_path = parent.join(format!(
        ".{}.tmp",
        path.file_name().unwrap_or_default().to_string_lossy()
    ));

    let mut options = fs::OpenOptions::new();
    options.write(true).create(true).truncate(true);
    #[cfg(unix)]
    {
        use std::os::unix::fs::OpenOptionsExt;
        options.mode(0o600);
    }

    let mut file = options.open(&tmp_path)?;
    file.write_all(data)?;
    file.sync_all()?;
    drop(file);

    fs::rename(&tmp_path, path)?;
    Ok(())
}

// ---------------------------------------------------------------------------
// Serde helpers for base64-encoded Vec<u8> fields
// ---------------------------------------------------------------------------

use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine;

pub(crate) fn base64_encode<S>(data: &[u8], serializer: S) -> std::result::Result<S::Ok, S::Error>
where
    S: serde::Serializer,
{
    let encoded = BASE64.encode(data);
    serializer.serialize_str(&encoded)
}

pub(crate) fn base64_decode<'de, D>(deserializer: D) -> std::result::Result<Vec<u8>, D::Error>
where
    D: serde::Deserializer<'de>,
{
    let s = String::deserialize(deserializer)?;
    BASE64.decode(&s).map_err(serde::de::Error::custom)
}

//! High-level vault operations used by CLI commands.
//!
//! `VaultStore` ties the store file, the master config record, the
//! integrity guard and the sync bridge together so the rest of the
//! application can work with calls like
//! `store.insert_password("email/gmail", "hunter2", false)`.
//!
//! Every mutation follows the same path: refuse if the attack flag is up,
//! build the new entry list, persist it (digest included) with one atomic
//! rename, adopt it in memory, then ask the sync bridge for a commit.

use std::fs;
use std::path::Path;
use std::time::Duration;

use chrono::Utc;
use zeroize::Zeroizing;

use crate::config::Settings;
use crate::credential::CredentialSource;
use crate::crypto::{generate_keypair, generate_token, seal, unseal, PrivateKey, PublicKey};
use crate::errors::{PassVaultError, Result};
use crate::sync::{gitignore, Mutation, SyncBridge};

use super::entry::{validate_name, Entry, EntryMetadata};
use super::format::{self, write_atomic, StoreHeader};
use super::integrity::{compute_digest, AttackFlag, IntegrityGuard};
use super::layout::VaultPaths;
use super::lock::VaultLock;
use super::master::{current_user, ConfigRecord};

/// Outcome of a successful mutation.
///
/// The mutation is durable whatever `sync_warning` says.
#[derive(Debug)]
pub struct MutationReport {
    pub name: String,
    pub sync_warning: Option<PassVaultError>,
}

/// The main vault handle.  Create one with `VaultStore::init` or
/// `VaultStore::open`; it holds the vault lock until dropped.
pub struct VaultStore {
    paths: VaultPaths,
    settings: Settings,
    config: ConfigRecord,
    header: StoreHeader,
    entries: Vec<Entry>,
    guard: IntegrityGuard,
    sync: SyncBridge,
    _lock: VaultLock,
}

impl VaultStore {
    // ------------------------------------------------------------------
    // Construction
    // ------------------------------------------------------------------

    /// Create a brand-new vault under `paths`.
    ///
    /// Generates the master key pair, seals its private half under
    /// `password`, writes the config record and an empty store, and asks
    /// the sync bridge to set up a repository (best effort).
    pub fn init(
        paths: VaultPaths,
        password: &[u8],
        settings: Settings,
        sync: SyncBridge,
    ) -> Result<Self> {
        if paths.is_initialized() {
            return Err(PassVaultError::VaultAlreadyExists(paths.root().to_path_buf()));
        }
        paths.create_dirs()?;
        let lock = Self::lock(&paths, &settings)?;

        let config = ConfigRecord::generate(password, &current_user(), &settings.argon2_params())?;
        config.save(&paths.config())?;

        let guard = IntegrityGuard::new(AttackFlag::new(paths.attack_flag()));
        let mut store = Self {
            header: StoreHeader::new(),
            entries: Vec::new(),
            guard,
            config,
            settings,
            sync,
            paths,
            _lock: lock,
        };
        let entries = Vec::new();
        store.persist(&entries)?;
        gitignore::exclude_local_state(store.paths.root())?;

        if let Err(e) = store.sync.init_repository() {
            tracing::warn!(error = %e, "could not initialise the sync repository");
        } else if let Some(e) = store.notify(&Mutation::Init) {
            tracing::warn!(error = %e, "initial commit failed");
        }

        tracing::info!(root = %store.paths.root().display(), "vault initialised");
        Ok(store)
    }

    /// Open an existing vault, verifying the store digest.
    ///
    /// A digest mismatch raises the attack flag and fails with
    /// `IntegrityMismatch`.  A vault whose flag is already up still opens
    /// for reading as long as its digest verifies.
    pub fn open(paths: VaultPaths, settings: Settings, sync: SyncBridge) -> Result<Self> {
        if !paths.is_initialized() || !paths.store().is_file() {
            return Err(PassVaultError::VaultNotInitialized(paths.root().to_path_buf()));
        }
        let lock = Self::lock(&paths, &settings)?;

        let config = ConfigRecord::load(&paths.config())?;
        let guard = IntegrityGuard::new(AttackFlag::new(paths.attack_flag()));
        let raw = guard.verify_file(&paths.store())?;

        if let Some(reason) = guard.flag().reason() {
            tracing::warn!(reason, "vault is flagged as under attack; mutations are disabled");
        }

        Ok(Self {
            paths,
            settings,
            config,
            header: raw.header,
            entries: raw.entries,
            guard,
            sync,
            _lock: lock,
        })
    }

    fn lock(paths: &VaultPaths, settings: &Settings) -> Result<VaultLock> {
        VaultLock::acquire(
            &paths.lock(),
            Duration::from_secs(settings.lock_stale_secs),
        )
    }

    // ------------------------------------------------------------------
    // Mutations
    // ------------------------------------------------------------------

    /// Insert a fully built entry, writing `blob` (if any) under the
    /// entry's blob token first.
    ///
    /// Fails with `DuplicateName` when `entry.name` exists and
    /// `overwrite` is false; the store is left untouched.  Replacing an
    /// entry keeps its position and creation time and releases the blob
    /// it used to reference.
    pub fn insert_entry(
        &mut self,
        entry: Entry,
        blob: Option<Vec<u8>>,
        overwrite: bool,
    ) -> Result<MutationReport> {
        let (name, is_file) = (entry.name.clone(), entry.is_file);
        let replaced = self.put_entry(entry, blob, overwrite)?;

        let mutation = if replaced {
            Mutation::Replace {
                name: name.clone(),
                is_file,
            }
        } else {
            Mutation::Insert {
                name: name.clone(),
                is_file,
            }
        };
        Ok(self.report(name, &mutation))
    }

    /// Seal `secret` under a fresh entry key and insert it.
    pub fn insert_password(
        &mut self,
        name: &str,
        secret: &str,
        overwrite: bool,
    ) -> Result<MutationReport> {
        self.ensure_writable()?;
        let (public_key, sealed) = self.seal_fresh(secret.as_bytes())?;
        let entry = new_entry(name, public_key, sealed, None);
        self.insert_entry(entry, None, overwrite)
    }

    /// Seal `contents` into a new blob and insert a file entry for it.
    pub fn insert_file(
        &mut self,
        name: &str,
        contents: &[u8],
        overwrite: bool,
    ) -> Result<MutationReport> {
        self.ensure_writable()?;
        let (public_key, sealed) = self.seal_fresh(contents)?;
        let token = generate_token()?;
        let entry = new_entry(name, public_key, Vec::new(), Some(token));
        self.insert_entry(entry, Some(sealed), overwrite)
    }

    /// Re-seal an existing entry with new contents under a fresh entry key.
    ///
    /// File entries get a new blob; the old one is released.
    pub fn replace_secret(&mut self, name: &str, plaintext: &[u8]) -> Result<MutationReport> {
        self.ensure_writable()?;
        let idx = self
            .position(name)
            .ok_or_else(|| PassVaultError::NotFound(name.to_string()))?;
        let is_file = self.entries[idx].is_file;

        let (public_key, sealed) = self.seal_fresh(plaintext)?;
        if is_file {
            let entry = new_entry(name, public_key, Vec::new(), Some(generate_token()?));
            self.put_entry(entry, Some(sealed), true)?;
        } else {
            let entry = new_entry(name, public_key, sealed, None);
            self.put_entry(entry, None, true)?;
        }

        let mutation = Mutation::Edit {
            name: name.to_string(),
            is_file,
        };
        Ok(self.report(name.to_string(), &mutation))
    }

    /// Relabel an entry without touching its sealed payload or key.
    pub fn rename_entry(&mut self, old_name: &str, new_name: &str) -> Result<MutationReport> {
        self.ensure_writable()?;
        validate_name(new_name)?;
        let idx = self
            .position(old_name)
            .ok_or_else(|| PassVaultError::NotFound(old_name.to_string()))?;
        if self.position(new_name).is_some() {
            return Err(PassVaultError::DuplicateName(new_name.to_string()));
        }

        let mut entries = self.entries.clone();
        entries[idx].name = new_name.to_string();
        entries[idx].updated_at = Utc::now();
        self.persist(&entries)?;

        let mutation = Mutation::Rename {
            from: old_name.to_string(),
            to: new_name.to_string(),
        };
        Ok(self.report(new_name.to_string(), &mutation))
    }

    /// Remove an entry by exact name, releasing its blob if it has one.
    pub fn remove_entry(&mut self, name: &str) -> Result<MutationReport> {
        self.ensure_writable()?;
        let idx = self
            .position(name)
            .ok_or_else(|| PassVaultError::NotFound(name.to_string()))?;

        let mut entries = self.entries.clone();
        let removed = entries.remove(idx);
        self.persist(&entries)?;
        if let Some(token) = &removed.blob {
            self.release_blob(token);
        }

        let mutation = Mutation::Remove {
            name: removed.name.clone(),
            is_file: removed.is_file,
        };
        Ok(self.report(removed.name, &mutation))
    }

    /// Re-seal the master private key under `new_password`.
    ///
    /// Entries are sealed to the master public key, which does not
    /// change, so none of them is rewritten.
    pub fn change_master_password(
        &mut self,
        credentials: &mut dyn CredentialSource,
        new_password: &[u8],
    ) -> Result<MutationReport> {
        self.ensure_writable()?;
        let current = credentials.resolve()?;

        let mut config = self.config.clone();
        config.rewrap(
            current.secret().as_bytes(),
            new_password,
            &self.settings.argon2_params(),
        )?;
        config.save(&self.paths.config())?;
        self.config = config;

        Ok(self.report(String::new(), &Mutation::MasterPassword))
    }

    /// Administrative clear of the attack flag.
    ///
    /// Used instead of `open` when the store no longer verifies.  Requires
    /// unlocking the master key; the current on-disk entries are then
    /// accepted as-is (structure is still checked) and written back with
    /// a fresh digest.  The flag is lowered only after that write lands.
    pub fn acknowledge_tampering(
        paths: VaultPaths,
        settings: Settings,
        sync: SyncBridge,
        credentials: &mut dyn CredentialSource,
    ) -> Result<(Self, MutationReport)> {
        if !paths.is_initialized() || !paths.store().is_file() {
            return Err(PassVaultError::VaultNotInitialized(paths.root().to_path_buf()));
        }
        let lock = Self::lock(&paths, &settings)?;

        let config = ConfigRecord::load(&paths.config())?;
        drop(unlock_with(&config, credentials)?);

        let raw = format::read_store(&paths.store())?;
        let mut header = raw.header;
        header.updated_at = Utc::now();

        // The flag comes down only once the re-digested store is on disk.
        let body = format::encode_store(&header, &raw.entries)?.frame()?;
        format::write_store(&paths.store(), &body, &compute_digest(&body))?;
        let guard = IntegrityGuard::new(AttackFlag::new(paths.attack_flag()));
        guard.flag().clear()?;

        let store = Self {
            paths,
            settings,
            config,
            header,
            entries: raw.entries,
            guard,
            sync,
            _lock: lock,
        };
        tracing::warn!("attack flag cleared by operator; current store accepted");

        let report = store.report(String::new(), &Mutation::ClearAttackFlag);
        Ok((store, report))
    }

    // ------------------------------------------------------------------
    // Reads
    // ------------------------------------------------------------------

    /// Entries whose name contains `query` (case-sensitive), in store
    /// order.  An empty query matches everything.
    pub fn find(&self, query: &str) -> Vec<&Entry> {
        self.entries
            .iter()
            .filter(|e| e.name.contains(query))
            .collect()
    }

    /// Unlock the master key and recover the plaintext of `name`.
    pub fn retrieve_plaintext(
        &self,
        name: &str,
        credentials: &mut dyn CredentialSource,
    ) -> Result<Zeroizing<Vec<u8>>> {
        let entry = self
            .get(name)
            .ok_or_else(|| PassVaultError::NotFound(name.to_string()))?;
        let master = self.unlock(credentials)?;
        self.unseal_entry(entry, &master)
    }

    /// Recover the plaintext of `entry` with an already unlocked key.
    pub fn unseal_entry(&self, entry: &Entry, master: &PrivateKey) -> Result<Zeroizing<Vec<u8>>> {
        match (&entry.blob, entry.is_file) {
            (Some(token), true) => {
                let payload = fs::read(self.paths.blob(token)).map_err(|e| match e.kind() {
                    std::io::ErrorKind::NotFound => PassVaultError::CorruptionError(format!(
                        "blob for '{}' is missing",
                        entry.name
                    )),
                    _ => e.into(),
                })?;
                unseal(&payload, &entry.public_key, master)
            }
            (None, false) => unseal(&entry.sealed, &entry.public_key, master),
            _ => Err(PassVaultError::CorruptionError(format!(
                "entry '{}' has an inconsistent file marker",
                entry.name
            ))),
        }
    }

    /// Obtain credentials and recover the master private key.
    pub fn unlock(&self, credentials: &mut dyn CredentialSource) -> Result<PrivateKey> {
        unlock_with(&self.config, credentials)
    }

    pub fn get(&self, name: &str) -> Option<&Entry> {
        self.entries.iter().find(|e| e.name == name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.position(name).is_some()
    }

    pub fn entries(&self) -> &[Entry] {
        &self.entries
    }

    /// Metadata for every entry, in store order.
    pub fn list(&self) -> Vec<EntryMetadata> {
        self.entries.iter().map(Entry::metadata).collect()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    // ------------------------------------------------------------------
    // Accessors
    // ------------------------------------------------------------------

    pub fn paths(&self) -> &VaultPaths {
        &self.paths
    }

    pub fn root(&self) -> &Path {
        self.paths.root()
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    pub fn header(&self) -> &StoreHeader {
        &self.header
    }

    pub fn config(&self) -> &ConfigRecord {
        &self.config
    }

    pub fn master_public_key(&self) -> &PublicKey {
        &self.config.master_public_key
    }

    pub fn integrity(&self) -> &IntegrityGuard {
        &self.guard
    }

    pub fn sync(&self) -> &SyncBridge {
        &self.sync
    }

    /// Pull from the remote and reload the verified result.
    pub fn pull(&mut self) -> Result<()> {
        self.sync.pull(&self.guard)?;
        let raw = self.guard.verify_file(&self.paths.store())?;
        self.config = ConfigRecord::load(&self.paths.config())?;
        self.header = raw.header;
        self.entries = raw.entries;
        Ok(())
    }

    // ------------------------------------------------------------------
    // Internals
    // ------------------------------------------------------------------

    /// Write `blob`, then persist the entry list with `entry` added or
    /// replaced.  Returns `true` when an existing entry was replaced.
    fn put_entry(&mut self, mut entry: Entry, blob: Option<Vec<u8>>, overwrite: bool) -> Result<bool> {
        self.ensure_writable()?;
        validate_name(&entry.name)?;

        let existing = self.position(&entry.name);
        if existing.is_some() && !overwrite {
            return Err(PassVaultError::DuplicateName(entry.name));
        }

        let new_blob = match (&entry.blob, blob) {
            (Some(token), Some(bytes)) => {
                write_atomic(&self.paths.blob(token), &bytes)?;
                Some(token.clone())
            }
            (None, None) => None,
            _ => {
                return Err(PassVaultError::CorruptionError(format!(
                    "entry '{}' and its blob payload disagree",
                    entry.name
                )))
            }
        };

        let mut entries = self.entries.clone();
        let mut released = None;
        match existing {
            Some(idx) => {
                entry.created_at = entries[idx].created_at;
                released = entries[idx].blob.take();
                entries[idx] = entry;
            }
            None => entries.push(entry),
        }

        if let Err(e) = self.persist(&entries) {
            if let Some(token) = &new_blob {
                self.release_blob(token);
            }
            return Err(e);
        }
        if let Some(token) = released.filter(|old| Some(old) != new_blob.as_ref()) {
            self.release_blob(&token);
        }
        Ok(existing.is_some())
    }

    fn ensure_writable(&self) -> Result<()> {
        self.guard.flag().ensure_clear()
    }

    fn position(&self, name: &str) -> Option<usize> {
        self.entries.iter().position(|e| e.name == name)
    }

    /// Seal `plaintext` to the master public key under a fresh entry key.
    /// The entry private key is consumed by `seal` and never stored.
    fn seal_fresh(&self, plaintext: &[u8]) -> Result<(PublicKey, Vec<u8>)> {
        let pair = generate_keypair()?;
        let sealed = seal(plaintext, &self.config.master_public_key, pair.private)?;
        Ok((pair.public, sealed))
    }

    /// Write `entries` with a fresh digest, then adopt them in memory.
    fn persist(&mut self, entries: &[Entry]) -> Result<()> {
        let mut header = self.header.clone();
        header.updated_at = Utc::now();

        let body = format::encode_store(&header, entries)?.frame()?;
        let digest = self.guard.recompute(&body)?;
        format::write_store(&self.paths.store(), &body, &digest)?;
        tracing::debug!(entries = entries.len(), "store persisted");

        self.header = header;
        self.entries = entries.to_vec();
        Ok(())
    }

    fn release_blob(&self, token: &str) {
        match fs::remove_file(self.paths.blob(token)) {
            Ok(()) => {}
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
            Err(e) => tracing::warn!(token, error = %e, "could not remove superseded blob"),
        }
    }

    fn notify(&self, mutation: &Mutation) -> Option<PassVaultError> {
        match self.sync.notify_mutation(mutation) {
            Ok(()) => None,
            Err(e) => {
                tracing::warn!(%mutation, error = %e, "sync commit failed; local change kept");
                Some(e)
            }
        }
    }

    fn report(&self, name: String, mutation: &Mutation) -> MutationReport {
        MutationReport {
            name,
            sync_warning: self.notify(mutation),
        }
    }
}

fn unlock_with(config: &ConfigRecord, credentials: &mut dyn CredentialSource) -> Result<PrivateKey> {
    let secret = credentials.resolve()?;
    if secret.is_one_time() {
        tracing::info!("unlocking with a one-time code");
    }
    config.unlock(secret.secret().as_bytes())
}

fn new_entry(name: &str, public_key: PublicKey, sealed: Vec<u8>, blob: Option<String>) -> Entry {
    let now = Utc::now();
    Entry {
        name: name.to_string(),
        public_key,
        sealed,
        is_file: blob.is_some(),
        blob,
        created_at: now,
        updated_at: now,
    }
}

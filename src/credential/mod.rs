//! CredentialSource: supplies the secret that unlocks the master key.
//!
//! Two families of source share one contract:
//! - `InteractivePrompt`: environment variable, OS keyring, then a prompt.
//! - `OneTimeCodeSource`: a single-use code (from `--pincode` or the
//!   override file) that takes precedence over its fallback source.
//!
//! A source is built once per invocation and passed to the store
//! operations that need the master private key.

pub mod override_store;

use std::fmt;

use zeroize::Zeroizing;

use crate::errors::{PassVaultError, Result};

pub use override_store::OverrideStore;

/// Environment variable read before prompting (CI/scripted use).
pub const PASSWORD_ENV: &str = "PASSVAULT_PASSWORD";

/// Secret material that unlocks the master private key.
pub enum MasterKeyOverride {
    /// A typed (or scripted) master password.
    Password(Zeroizing<String>),
    /// A one-time code, already invalidated at its source.
    OneTimeCode(Zeroizing<String>),
}

impl MasterKeyOverride {
    pub fn secret(&self) -> &str {
        match self {
            Self::Password(s) | Self::OneTimeCode(s) => s.as_str(),
        }
    }

    pub fn is_one_time(&self) -> bool {
        matches!(self, Self::OneTimeCode(_))
    }
}

impl fmt::Debug for MasterKeyOverride {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Password(_) => f.write_str("Password(<redacted>)"),
            Self::OneTimeCode(_) => f.write_str("OneTimeCode(<redacted>)"),
        }
    }
}

/// Supplier of master-key material.
pub trait CredentialSource {
    /// An override, if one is present.  Obtaining it consumes it.
    fn obtain_override(&mut self) -> Result<Option<MasterKeyOverride>>;

    /// The master password, by whatever means this source has.
    fn obtain_master_password(&mut self) -> Result<Zeroizing<String>>;

    /// The override when present, otherwise the master password.
    fn resolve(&mut self) -> Result<MasterKeyOverride> {
        if let Some(found) = self.obtain_override()? {
            return Ok(found);
        }
        self.obtain_master_password()
            .map(MasterKeyOverride::Password)
    }
}

/// Prompt-backed source: `PASSVAULT_PASSWORD`, then the OS keyring (with
/// the `keyring-store` feature), then an interactive prompt.
#[derive(Debug, Clone, Default)]
pub struct InteractivePrompt {
    keyring_id: Option<String>,
}

impl InteractivePrompt {
    pub fn new() -> Self {
        Self::default()
    }

    /// Also look in the OS keyring under `vault_id`.
    pub fn with_keyring(vault_id: impl Into<String>) -> Self {
        Self {
            keyring_id: Some(vault_id.into()),
        }
    }
}

impl CredentialSource for InteractivePrompt {
    fn obtain_override(&mut self) -> Result<Option<MasterKeyOverride>> {
        Ok(None)
    }

    fn obtain_master_password(&mut self) -> Result<Zeroizing<String>> {
        if let Ok(pw) = std::env::var(PASSWORD_ENV) {
            if !pw.is_empty() {
                return Ok(Zeroizing::new(pw));
            }
        }

        #[cfg(feature = "keyring-store")]
        if let Some(id) = &self.keyring_id {
            match crate::keyring::get_password(id) {
                Ok(Some(pw)) => return Ok(Zeroizing::new(pw)),
                Ok(None) => {}
                Err(e) => tracing::debug!(error = %e, "keyring unavailable, prompting"),
            }
        }

        #[cfg(not(feature = "keyring-store"))]
        let _ = &self.keyring_id;

        let pw = dialoguer::Password::new()
            .with_prompt("Enter master password")
            .interact()
            .map_err(|e| PassVaultError::CommandFailed(format!("password prompt: {e}")))?;
        Ok(Zeroizing::new(pw))
    }
}

/// Source that prefers a single-use code over its fallback.
///
/// The in-memory code (from `--pincode`) is handed out at most once per
/// process; the file-backed code at most once ever.
pub struct OneTimeCodeSource<F> {
    code: Option<Zeroizing<String>>,
    store: Option<OverrideStore>,
    fallback: F,
}

impl<F: CredentialSource> OneTimeCodeSource<F> {
    pub fn new(fallback: F) -> Self {
        Self {
            code: None,
            store: None,
            fallback,
        }
    }

    /// Install an in-memory code.
    pub fn with_code(mut self, code: impl Into<String>) -> Self {
        let code = code.into();
        if !code.is_empty() {
            self.code = Some(Zeroizing::new(code));
        }
        self
    }

    /// Consult the override file at `store`.
    pub fn with_store(mut self, store: OverrideStore) -> Self {
        self.store = Some(store);
        self
    }

    /// Whether an override would be returned right now.
    pub fn is_available(&self) -> bool {
        self.code.is_some() || self.store.as_ref().is_some_and(OverrideStore::is_available)
    }
}

impl<F: CredentialSource> CredentialSource for OneTimeCodeSource<F> {
    fn obtain_override(&mut self) -> Result<Option<MasterKeyOverride>> {
        if let Some(code) = self.code.take() {
            return Ok(Some(MasterKeyOverride::OneTimeCode(code)));
        }
        match &self.store {
            Some(store) => Ok(store.consume()?.map(MasterKeyOverride::OneTimeCode)),
            None => Ok(None),
        }
    }

    fn obtain_master_password(&mut self) -> Result<Zeroizing<String>> {
        self.fallback.obtain_master_password()
    }
}

/// Fixed, non-interactive password.
pub struct FixedPassword(Zeroizing<String>);

impl FixedPassword {
    pub fn new(password: impl Into<String>) -> Self {
        Self(Zeroizing::new(password.into()))
    }
}

impl CredentialSource for FixedPassword {
    fn obtain_override(&mut self) -> Result<Option<MasterKeyOverride>> {
        Ok(None)
    }

    fn obtain_master_password(&mut self) -> Result<Zeroizing<String>> {
        Ok(self.0.clone())
    }
}

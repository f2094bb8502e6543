//! File-backed one-time unlock code.
//!
//! The file is a TOML table whose `pincode` key holds the code. Reading the
//! code replaces it with a masked sentinel in the same step, so a code can
//! be consumed exactly once across every process that looks at the file.
//! Other keys in the table are left as they are.

use std::fs;
use std::path::{Path, PathBuf};

use toml::{Table, Value};
use zeroize::Zeroizing;

use crate::errors::{PassVaultError, Result};
use crate::vault::format::write_atomic;

/// Value left behind once a code has been consumed.
pub const MASKED_SENTINEL: &str = "--*+--+**+--+*--*+--+**+--+**+--";

const PINCODE_KEY: &str = "pincode";

/// One-time code stored on disk.
#[derive(Debug, Clone)]
pub struct OverrideStore {
    path: PathBuf,
}

impl OverrideStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// `true` if an unconsumed code is waiting.  Does not consume it.
    pub fn is_available(&self) -> bool {
        matches!(self.read(), Ok(Some(_)))
    }

    /// Take the code, leaving the masked sentinel in its place.
    ///
    /// The sentinel is written (atomically) before the code is handed
    /// back; a crash after this returns `None` on the next call rather
    /// than the same code twice.
    pub fn consume(&self) -> Result<Option<Zeroizing<String>>> {
        let Some(code) = self.read()? else {
            return Ok(None);
        };
        self.write_value(MASKED_SENTINEL)?;
        tracing::info!(file = %self.path.display(), "one-time unlock code consumed");
        Ok(Some(code))
    }

    /// Store a fresh code, replacing whatever was there.
    pub fn install(&self, code: &str) -> Result<()> {
        if code.is_empty() || code == MASKED_SENTINEL {
            return Err(PassVaultError::ConfigError(
                "one-time code cannot be empty or the masked sentinel".into(),
            ));
        }
        self.write_value(code)
    }

    /// Mask any pending code without reading it.
    pub fn erase(&self) -> Result<()> {
        if self.path.exists() {
            self.write_value(MASKED_SENTINEL)?;
        }
        Ok(())
    }

    fn read(&self) -> Result<Option<Zeroizing<String>>> {
        let Some(table) = self.load_table()? else {
            return Ok(None);
        };
        let code = match table.get(PINCODE_KEY) {
            None => return Ok(None),
            Some(Value::String(code)) => Zeroizing::new(code.clone()),
            Some(_) => {
                return Err(PassVaultError::ConfigError(format!(
                    "{}: `{PINCODE_KEY}` must be a string",
                    self.path.display()
                )))
            }
        };
        if code.is_empty() || code.as_str() == MASKED_SENTINEL {
            return Ok(None);
        }
        Ok(Some(code))
    }

    fn load_table(&self) -> Result<Option<Table>> {
        let contents = match fs::read_to_string(&self.path) {
            Ok(text) => Zeroizing::new(text),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(e.into()),
        };
        let table = contents.parse::<Table>().map_err(|e| {
            PassVaultError::ConfigError(format!("Failed to parse {}: {e}", self.path.display()))
        })?;
        Ok(Some(table))
    }

    /// Replace the `pincode` value, keeping every other key.
    fn write_value(&self, value: &str) -> Result<()> {
        let mut table = self.load_table()?.unwrap_or_default();
        table.insert(PINCODE_KEY.to_string(), Value::String(value.to_string()));
        let body = toml::to_string(&table)
            .map_err(|e| PassVaultError::SerializationError(format!("override file: {e}")))?;
        write_atomic(&self.path, Zeroizing::new(body).as_bytes())
    }
}

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::crypto::kdf::Argon2Params;
use crate::errors::{PassVaultError, Result};

/// Environment variable that overrides the default vault location.
pub const VAULT_DIR_ENV: &str = "PASSVAULT_DIR";

/// Directory name used under the home directory.
const DEFAULT_VAULT_DIR_NAME: &str = ".passvault";

/// Vault-level configuration, loaded from `<vault root>/passvault.toml`.
///
/// Every field has a sensible default so PassVault works out-of-the-box
/// without any config file at all.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Settings {
    /// Argon2 memory cost in KiB (default: 64 MB).
    #[serde(default = "default_argon2_memory_kib")]
    pub argon2_memory_kib: u32,

    /// Argon2 iteration count (default: 3).
    #[serde(default = "default_argon2_iterations")]
    pub argon2_iterations: u32,

    /// Argon2 parallelism degree (default: 4).
    #[serde(default = "default_argon2_parallelism")]
    pub argon2_parallelism: u32,

    /// Commit to git after every successful mutation.
    #[serde(default = "default_auto_commit")]
    pub auto_commit: bool,

    /// Git executable used for sync.
    #[serde(default = "default_git_program")]
    pub git_program: String,

    /// File holding a one-time unlock code.  Relative paths are resolved
    /// against the vault root; default is `unlock.toml` in the root.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub override_file: Option<String>,

    /// Age in seconds after which a leftover lock file is considered stale.
    #[serde(default = "default_lock_stale_secs")]
    pub lock_stale_secs: u64,
}

// ── Serde default helpers ────────────────────────────────────────────

fn default_argon2_memory_kib() -> u32 {
    65_536 // 64 MB
}

fn default_argon2_iterations() -> u32 {
    3
}

fn default_argon2_parallelism() -> u32 {
    4
}

fn default_auto_commit() -> bool {
    true
}

fn default_git_program() -> String {
    "git".to_string()
}

fn default_lock_stale_secs() -> u64 {
    300
}

// ── Implementation ───────────────────────────────────────────────────

impl Default for Settings {
    fn default() -> Self {
        Self {
            argon2_memory_kib: default_argon2_memory_kib(),
            argon2_iterations: default_argon2_iterations(),
            argon2_parallelism: default_argon2_parallelism(),
            auto_commit: default_auto_commit(),
            git_program: default_git_program(),
            override_file: None,
            lock_stale_secs: default_lock_stale_secs(),
        }
    }
}

impl Settings {
    /// Name of the settings file inside the vault root.
    pub const FILE_NAME: &'static str = "passvault.toml";

    /// Default name of the one-time unlock code file.
    pub const DEFAULT_OVERRIDE_FILE: &'static str = "unlock.toml";

    /// Load settings from `<vault_root>/passvault.toml`.
    ///
    /// If the file does not exist, sensible defaults are returned.
    /// If the file exists but cannot be parsed, an error is returned.
    pub fn load(vault_root: &Path) -> Result<Self> {
        let config_path = vault_root.join(Self::FILE_NAME);

        if !config_path.exists() {
            return Ok(Self::default());
        }

        let contents = std::fs::read_to_string(&config_path)?;

        let settings: Settings = toml::from_str(&contents).map_err(|e| {
            PassVaultError::ConfigError(format!("Failed to parse {}: {e}", config_path.display()))
        })?;

        Ok(settings)
    }

    /// Convert the Argon2 settings into crypto-layer params.
    pub fn argon2_params(&self) -> Argon2Params {
        Argon2Params {
            memory_kib: self.argon2_memory_kib,
            iterations: self.argon2_iterations,
            parallelism: self.argon2_parallelism,
        }
    }

    /// Location of the one-time unlock code file.
    pub fn override_path(&self, vault_root: &Path) -> PathBuf {
        let name = self
            .override_file
            .as_deref()
            .unwrap_or(Self::DEFAULT_OVERRIDE_FILE);
        vault_root.join(name)
    }
}

/// Resolve the vault root directory.
///
/// Order: explicit `--vault-dir`, then `PASSVAULT_DIR`, then
/// `$HOME/.passvault`.
pub fn resolve_vault_root(explicit: Option<&str>) -> Result<PathBuf> {
    if let Some(dir) = explicit {
        return Ok(PathBuf::from(dir));
    }
    if let Ok(dir) = std::env::var(VAULT_DIR_ENV) {
        if !dir.is_empty() {
            return Ok(PathBuf::from(dir));
        }
    }
    let home = dirs::home_dir().ok_or_else(|| {
        PassVaultError::ConfigError(format!(
            "cannot determine home directory — set {VAULT_DIR_ENV} or pass --vault-dir"
        ))
    })?;
    Ok(home.join(DEFAULT_VAULT_DIR_NAME))
}

// ── Tests ────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn default_settings_are_sensible() {
        let s = Settings::default();
        assert_eq!(s.argon2_memory_kib, 65_536);
        assert_eq!(s.argon2_iterations, 3);
        assert_eq!(s.argon2_parallelism, 4);
        assert!(s.auto_commit);
        assert_eq!(s.git_program, "git");
        assert_eq!(s.lock_stale_secs, 300);
    }

    #[test]
    fn load_returns_defaults_when_no_config_file() {
        let tmp = TempDir::new().unwrap();
        let settings = Settings::load(tmp.path()).unwrap();
        assert!(settings.auto_commit);
        assert!(settings.override_file.is_none());
    }

    #[test]
    fn load_parses_toml_file() {
        let tmp = TempDir::new().unwrap();
        let config = r#"
argon2_memory_kib = 131072
argon2_iterations = 5
argon2_parallelism = 8
auto_commit = false
git_program = "/usr/local/bin/git"
override_file = "/boot/unlock.toml"
lock_stale_secs = 60
"#;
        fs::write(tmp.path().join(Settings::FILE_NAME), config).unwrap();

        let settings = Settings::load(tmp.path()).unwrap();
        assert_eq!(settings.argon2_memory_kib, 131_072);
        assert_eq!(settings.argon2_iterations, 5);
        assert_eq!(settings.argon2_parallelism, 8);
        assert!(!settings.auto_commit);
        assert_eq!(settings.git_program, "/usr/local/bin/git");
        assert_eq!(settings.lock_stale_secs, 60);
        assert_eq!(
            settings.override_path(tmp.path()),
            PathBuf::from("/boot/unlock.toml")
        );
    }

    #[test]
    fn load_uses_defaults_for_missing_fields() {
        let tmp = TempDir::new().unwrap();
        fs::write(tmp.path().join(Settings::FILE_NAME), "auto_commit = false\n").unwrap();

        let settings = Settings::load(tmp.path()).unwrap();
        assert!(!settings.auto_commit);
        assert_eq!(settings.argon2_iterations, 3);
        assert_eq!(settings.git_program, "git");
    }

    #[test]
    fn load_errors_on_invalid_toml() {
        let tmp = TempDir::new().unwrap();
        fs::write(tmp.path().join(Settings::FILE_NAME), "not valid {{toml").unwrap();

        let result = Settings::load(tmp.path());
        assert!(result.is_err());
    }

    #[test]
    fn override_path_defaults_inside_root() {
        let s = Settings::default();
        let root = Path::new("/home/user/.passvault");
        assert_eq!(
            s.override_path(root),
            PathBuf::from("/home/user/.passvault/unlock.toml")
        );
    }

    #[test]
    fn explicit_vault_dir_wins() {
        let root = resolve_vault_root(Some("/tmp/my-vault")).unwrap();
        assert_eq!(root, PathBuf::from("/tmp/my-vault"));
    }
}

//! Configuration: settings file and vault root resolution.

pub mod settings;

pub use settings::{resolve_vault_root, Settings};

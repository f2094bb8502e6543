//! Vault module: sealed entry storage.
//!
//! This module provides:
//! - `Entry` and `EntryMetadata` types plus name rules (`entry`)
//! - The store file format and atomic writes (`format`)
//! - Tamper evidence: digest checks and the attack flag (`integrity`)
//! - Paths inside a vault directory (`layout`)
//! - The advisory lock (`lock`)
//! - The master key config record (`master`)
//! - High-level `VaultStore` for creating, opening, and managing vaults (`store`)

pub mod entry;
pub mod format;
pub mod integrity;
pub mod layout;
pub mod lock;
pub mod master;
pub mod store;

// Re-export the most commonly used items.
pub use entry::{validate_name, Entry, EntryMetadata};
pub use format::StoreHeader;
pub use integrity::{AttackFlag, IntegrityGuard};
pub use layout::VaultPaths;
pub use master::ConfigRecord;
pub use store::{MutationReport, VaultStore};

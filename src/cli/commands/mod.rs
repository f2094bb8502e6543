//! One module per subcommand.

pub mod audit_cmd;
pub mod completions;
pub mod edit;
pub mod erase_pincode;
pub mod find;
pub mod generate;
pub mod init;
pub mod insert;
pub mod insert_file;
pub mod integrity;
pub mod keyring_cmd;
pub mod list;
pub mod passwd;
pub mod remove;
pub mod rename;
pub mod show;
pub mod sync_cmd;
pub mod version;

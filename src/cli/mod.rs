//! CLI command handlers for cardkeeper

pub mod backup;

pub use backup::{handle_backup_command, BackupCommands};

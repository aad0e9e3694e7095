//! Encrypted backup and restore engine
//!
//! Backups are single portable files: a versioned JSON snapshot of all four
//! collections, encrypted under a user-supplied password with authenticated
//! encryption, base64-encoded on disk. [`BackupManager`] creates, lists,
//! prunes, and exports them; [`RestoreManager`] verifies and merges them
//! back into live storage.

pub mod manager;
pub mod payload;
pub mod restore;

pub use manager::{
    AutoBackupOutcome, BackupFileInfo, BackupManager, BackupReceipt, CleanupOutcome,
    BACKUP_FILE_EXT, BACKUP_FILE_PREFIX, DEFAULT_KEEP_COUNT,
};
pub use payload::{BackupData, BackupPayload, RecordCounts, PAYLOAD_VERSION};
pub use restore::{RestoreManager, RestoreOutcome, VerifyReport};

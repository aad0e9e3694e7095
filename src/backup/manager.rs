//! Backup manager for cardkeeper
//!
//! Orchestrates backup creation, listing, retention cleanup, export, and
//! the unattended auto-backup path. A backup is a single encrypted file
//! written in one shot and never rewritten; retention deletes whole files.

use std::fs;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use serde::Serialize;
use tracing::{debug, info, warn};

use crate::backup::payload::BackupPayload;
use crate::config::paths::KeeperPaths;
use crate::crypto::envelope;
use crate::error::{KeeperError, KeeperResult};
use crate::storage::BackupStore;

/// Filename prefix for backup files
pub const BACKUP_FILE_PREFIX: &str = "IDCardBackup_";

/// Filename extension for backup files
pub const BACKUP_FILE_EXT: &str = "bak";

/// Default number of backups kept by the retention policy
pub const DEFAULT_KEEP_COUNT: usize = 10;

/// Result of creating a backup
#[derive(Debug, Clone, Serialize)]
pub struct BackupReceipt {
    /// Backup filename
    pub filename: String,
    /// Full path to the written file
    pub path: PathBuf,
    /// Size of the written file in bytes
    pub size_bytes: u64,
    /// Snapshot capture time (also embedded in the payload)
    pub timestamp: String,
}

/// Metadata about one backup file, derived from filesystem stat
#[derive(Debug, Clone, Serialize)]
pub struct BackupFileInfo {
    /// Backup filename
    pub filename: String,
    /// Full path to backup
    pub path: PathBuf,
    /// Size in bytes
    pub size_bytes: u64,
    /// When the file was created (falls back to modification time on
    /// platforms without a creation timestamp)
    pub created_at: DateTime<Utc>,
    /// When the file was last modified; retention ordering uses this
    pub modified_at: DateTime<Utc>,
}

/// Result of a retention cleanup pass
#[derive(Debug, Clone, Copy, Serialize)]
pub struct CleanupOutcome {
    /// Number of files actually removed
    pub deleted: usize,
}

/// Result of an unattended auto-backup run
#[derive(Debug, Clone, Serialize)]
pub struct AutoBackupOutcome {
    /// Whether the backup itself succeeded
    pub success: bool,
    /// Filename of the created backup, when successful
    pub filename: Option<String>,
    /// Number of old backups removed afterwards
    pub deleted: usize,
    /// Failure message, when unsuccessful
    pub error: Option<String>,
}

/// Manages backup creation and retention for one backup directory
pub struct BackupManager<'a, S: BackupStore> {
    store: &'a S,
    backup_dir: PathBuf,
}

impl<'a, S: BackupStore> BackupManager<'a, S> {
    /// Create a new BackupManager over the configured backup directory
    pub fn new(store: &'a S, paths: &KeeperPaths) -> Self {
        Self {
            store,
            backup_dir: paths.backup_dir(),
        }
    }

    /// Create a BackupManager over an explicit directory (useful for testing)
    pub fn with_backup_dir(store: &'a S, backup_dir: PathBuf) -> Self {
        Self { store, backup_dir }
    }

    /// Get the backup directory path
    pub fn backup_dir(&self) -> &PathBuf {
        &self.backup_dir
    }

    /// Create an encrypted backup of all data
    ///
    /// Snapshots the four collections, encrypts the payload under the
    /// given password, and writes one file. The write is the only side
    /// effect; nothing in storage is touched.
    pub fn create_backup(&self, password: &str) -> KeeperResult<BackupReceipt> {
        fs::create_dir_all(&self.backup_dir)
            .map_err(|e| KeeperError::Io(format!("Failed to create backup directory: {}", e)))?;

        let payload = BackupPayload::snapshot(self.store);
        let timestamp = payload.timestamp.clone();

        let plaintext = serde_json::to_vec(&payload)
            .map_err(|e| KeeperError::Json(format!("Failed to serialize backup: {}", e)))?;
        let envelope_text = envelope::encrypt(&plaintext, password)?;

        let filename = backup_filename(&timestamp);
        let path = self.backup_dir.join(&filename);

        fs::write(&path, &envelope_text)
            .map_err(|e| KeeperError::Io(format!("Failed to write backup file: {}", e)))?;

        info!("created backup {} ({} bytes)", filename, envelope_text.len());

        Ok(BackupReceipt {
            filename,
            path,
            size_bytes: envelope_text.len() as u64,
            timestamp,
        })
    }

    /// List all backup files, most recently modified first
    ///
    /// Listing is advisory: a missing or unreadable directory yields an
    /// empty list rather than an error.
    pub fn list_backups(&self) -> Vec<BackupFileInfo> {
        let entries = match fs::read_dir(&self.backup_dir) {
            Ok(entries) => entries,
            Err(err) => {
                warn!("failed to read backup directory: {}", err);
                return Vec::new();
            }
        };

        let mut backups = Vec::new();
        for entry in entries.flatten() {
            let path = entry.path();
            if path
                .extension()
                .map_or(false, |ext| ext == BACKUP_FILE_EXT)
            {
                if let Some(info) = stat_backup(&path) {
                    backups.push(info);
                }
            }
        }

        // Newest first
        backups.sort_by(|a, b| b.modified_at.cmp(&a.modified_at));
        backups
    }

    /// Get the most recent backup, if any
    pub fn get_latest_backup(&self) -> Option<BackupFileInfo> {
        self.list_backups().into_iter().next()
    }

    /// Delete backups beyond the `keep_count` most recent
    ///
    /// Deletions are attempted independently; a file that cannot be
    /// removed is logged and excluded from the returned count.
    pub fn cleanup_old_backups(&self, keep_count: usize) -> CleanupOutcome {
        let mut deleted = 0;

        for backup in self.list_backups().into_iter().skip(keep_count) {
            match fs::remove_file(&backup.path) {
                Ok(()) => {
                    debug!("deleted old backup {}", backup.filename);
                    deleted += 1;
                }
                Err(err) => {
                    warn!("failed to delete old backup {}: {}", backup.filename, err);
                }
            }
        }

        CleanupOutcome { deleted }
    }

    /// Copy a backup file to an external destination
    ///
    /// A plain file copy; the envelope is portable as-is.
    pub fn export_backup(&self, source: &Path, dest: &Path) -> KeeperResult<()> {
        if let Some(parent) = dest.parent() {
            fs::create_dir_all(parent).map_err(|e| {
                KeeperError::Io(format!("Failed to create export directory: {}", e))
            })?;
        }

        fs::copy(source, dest)
            .map_err(|e| KeeperError::Io(format!("Failed to export backup: {}", e)))?;
        Ok(())
    }

    /// Create a backup and prune to the default retention depth
    ///
    /// Meant for unattended runs: failures are swallowed into the outcome
    /// instead of propagating.
    pub fn auto_backup(&self, password: &str) -> AutoBackupOutcome {
        match self.create_backup(password) {
            Ok(receipt) => {
                let cleanup = self.cleanup_old_backups(DEFAULT_KEEP_COUNT);
                AutoBackupOutcome {
                    success: true,
                    filename: Some(receipt.filename),
                    deleted: cleanup.deleted,
                    error: None,
                }
            }
            Err(err) => {
                warn!("automatic backup failed: {}", err);
                AutoBackupOutcome {
                    success: false,
                    filename: None,
                    deleted: 0,
                    error: Some(err.to_string()),
                }
            }
        }
    }
}

/// Build a backup filename from an ISO-8601 timestamp
///
/// Colons and dots are not filesystem-safe everywhere, so they become
/// dashes: `IDCardBackup_2026-08-07T12-34-56-789Z.bak`.
fn backup_filename(timestamp: &str) -> String {
    format!(
        "{}{}.{}",
        BACKUP_FILE_PREFIX,
        timestamp.replace([':', '.'], "-"),
        BACKUP_FILE_EXT
    )
}

/// Stat one backup file into its metadata record
fn stat_backup(path: &Path) -> Option<BackupFileInfo> {
    let filename = path.file_name()?.to_string_lossy().to_string();
    let metadata = fs::metadata(path).ok()?;

    let modified_at = metadata.modified().map(DateTime::<Utc>::from).ok()?;
    let created_at = metadata
        .created()
        .map(DateTime::<Utc>::from)
        .unwrap_or(modified_at);

    Some(BackupFileInfo {
        filename,
        path: path.to_path_buf(),
        size_bytes: metadata.len(),
        created_at,
        modified_at,
    })
}

//! Backup CLI commands
//!
//! Implements CLI commands for backup management. The backup password is
//! collected interactively and never accepted as an argument, so it cannot
//! leak into shell history or the process list.

use clap::Subcommand;
use std::path::PathBuf;

use crate::backup::{BackupManager, RestoreManager, BACKUP_FILE_EXT};
use crate::config::paths::KeeperPaths;
use crate::config::settings::Settings;
use crate::error::{KeeperError, KeeperResult};
use crate::storage::Storage;

/// Backup subcommands
#[derive(Subcommand)]
pub enum BackupCommands {
    /// Create a new encrypted backup
    Create,

    /// List all available backups
    List {
        /// Show detailed information
        #[arg(short, long)]
        verbose: bool,
    },

    /// Restore from a backup
    Restore {
        /// Backup filename or path (use 'latest' for most recent)
        backup: String,

        /// Skip confirmation prompt
        #[arg(short, long)]
        force: bool,
    },

    /// Verify a backup without restoring it
    Verify {
        /// Backup filename or path (use 'latest' for most recent)
        backup: String,
    },

    /// Export a backup to an external location
    Export {
        /// Backup filename or path (use 'latest' for most recent)
        backup: String,

        /// Destination file path
        dest: PathBuf,
    },

    /// Delete old backups beyond the retention keep-count
    Prune {
        /// Number of backups to keep (defaults to the configured policy)
        #[arg(short, long)]
        keep: Option<usize>,

        /// Skip confirmation prompt
        #[arg(short, long)]
        force: bool,
    },

    /// Create a backup and prune in one unattended step
    Auto,
}

/// Handle a backup command
pub fn handle_backup_command(
    storage: &Storage,
    settings: &Settings,
    paths: &KeeperPaths,
    cmd: BackupCommands,
) -> KeeperResult<()> {
    let manager = BackupManager::new(storage, paths);
    let restore_manager = RestoreManager::new(storage);

    match cmd {
        BackupCommands::Create => {
            let password = prompt_new_password()?;

            println!("Creating backup...");
            let receipt = manager.create_backup(&password)?;

            println!("Backup created: {}", receipt.filename);
            println!("Location: {}", receipt.path.display());
            println!("Size: {}", format_size(receipt.size_bytes));
        }

        BackupCommands::List { verbose } => {
            let backups = manager.list_backups();

            if backups.is_empty() {
                println!("No backups found.");
                println!("Create one with: cardkeeper backup create");
                return Ok(());
            }

            println!("Available Backups");
            println!("=================");
            println!();

            for (i, backup) in backups.iter().enumerate() {
                let age = chrono::Utc::now().signed_duration_since(backup.modified_at);

                if verbose {
                    println!(
                        "{}. {}\n   Modified: {}\n   Size: {}\n   Age: {}\n",
                        i + 1,
                        backup.filename,
                        backup.modified_at.format("%Y-%m-%d %H:%M:%S UTC"),
                        format_size(backup.size_bytes),
                        format_duration(age),
                    );
                } else {
                    println!(
                        "  {}. {} ({} ago, {})",
                        i + 1,
                        backup.filename,
                        format_duration(age),
                        format_size(backup.size_bytes),
                    );
                }
            }

            println!();
            println!("Total: {} backup(s)", backups.len());
        }

        BackupCommands::Restore { backup, force } => {
            let backup_path = resolve_backup_path(&manager, paths, &backup)?;
            let password = rpassword::prompt_password("Backup password: ")
                .map_err(|e| KeeperError::Io(format!("Failed to read password: {}", e)))?;

            // Dry-run first so a wrong password stops before any writes
            let report = restore_manager.verify_backup(&backup_path, &password);
            if !report.valid {
                println!(
                    "Cannot restore: {}",
                    report.error.unwrap_or_else(|| "unknown error".into())
                );
                return Ok(());
            }

            let counts = report.counts.unwrap_or_default();
            println!("Backup Information");
            println!("==================");
            println!("File: {}", backup_path.display());
            if let Some(timestamp) = &report.timestamp {
                println!("Created: {}", timestamp);
            }
            println!(
                "Contents: {} users, {} templates, {} credentials, {} fields",
                counts.users, counts.templates, counts.credentials, counts.fields
            );
            println!();

            if !force {
                println!("Restore merges these records into your current data.");
                println!("To proceed, run again with --force flag:");
                println!("  cardkeeper backup restore {} --force", backup);
                return Ok(());
            }

            println!("Restoring from backup...");
            let outcome = restore_manager.restore_from_file(&backup_path, &password)?;

            println!("Restore complete!");
            println!(
                "Restored: {} of {} users, {} of {} templates, {} of {} credentials, {} of {} fields",
                outcome.restored.users,
                counts.users,
                outcome.restored.templates,
                counts.templates,
                outcome.restored.credentials,
                counts.credentials,
                outcome.restored.fields,
                counts.fields,
            );

            if outcome.restored.total() < counts.total() {
                println!("\nNote: some records were skipped; see the log for details.");
            }
        }

        BackupCommands::Verify { backup } => {
            let backup_path = resolve_backup_path(&manager, paths, &backup)?;
            let password = rpassword::prompt_password("Backup password: ")
                .map_err(|e| KeeperError::Io(format!("Failed to read password: {}", e)))?;

            let report = restore_manager.verify_backup(&backup_path, &password);

            println!("Backup Verification");
            println!("===================");
            println!("File: {}", backup_path.display());

            if report.valid {
                println!("Status: valid");
                if let Some(version) = &report.version {
                    println!("Version: {}", version);
                }
                if let Some(timestamp) = &report.timestamp {
                    println!("Created: {}", timestamp);
                }
                if let Some(counts) = report.counts {
                    println!(
                        "Contents: {} users, {} templates, {} credentials, {} fields",
                        counts.users, counts.templates, counts.credentials, counts.fields
                    );
                }
            } else {
                println!("Status: INVALID");
                println!(
                    "Reason: {}",
                    report.error.unwrap_or_else(|| "unknown error".into())
                );
            }
        }

        BackupCommands::Export { backup, dest } => {
            let backup_path = resolve_backup_path(&manager, paths, &backup)?;

            manager.export_backup(&backup_path, &dest)?;
            println!("Exported {} to {}", backup_path.display(), dest.display());
        }

        BackupCommands::Prune { keep, force } => {
            let keep_count = keep.unwrap_or(settings.backup_retention.keep_count);
            let backups = manager.list_backups();
            let to_delete = backups.len().saturating_sub(keep_count);

            if to_delete == 0 {
                println!("No backups to prune.");
                println!(
                    "You have {} backup(s); the policy keeps {}.",
                    backups.len(),
                    keep_count
                );
                return Ok(());
            }

            println!(
                "{} of {} backup(s) would be deleted (keeping the {} most recent).",
                to_delete,
                backups.len(),
                keep_count
            );

            if !force {
                println!("To delete old backups, run again with --force flag:");
                println!("  cardkeeper backup prune --force");
                return Ok(());
            }

            let outcome = manager.cleanup_old_backups(keep_count);
            println!("Deleted {} backup(s).", outcome.deleted);
        }

        BackupCommands::Auto => {
            let password = rpassword::prompt_password("Backup password: ")
                .map_err(|e| KeeperError::Io(format!("Failed to read password: {}", e)))?;

            let outcome = manager.auto_backup(&password);

            if outcome.success {
                println!(
                    "Auto-backup complete: {} (pruned {})",
                    outcome.filename.unwrap_or_default(),
                    outcome.deleted
                );
            } else {
                println!(
                    "Auto-backup failed: {}",
                    outcome.error.unwrap_or_else(|| "unknown error".into())
                );
            }
        }
    }

    Ok(())
}

/// Prompt for a new backup password, with confirmation
fn prompt_new_password() -> KeeperResult<String> {
    let password = rpassword::prompt_password("Backup password: ")
        .map_err(|e| KeeperError::Io(format!("Failed to read password: {}", e)))?;

    if password.is_empty() {
        return Err(KeeperError::Validation(
            "Backup password cannot be empty".into(),
        ));
    }

    let confirm = rpassword::prompt_password("Confirm password: ")
        .map_err(|e| KeeperError::Io(format!("Failed to read password: {}", e)))?;

    if password != confirm {
        return Err(KeeperError::Validation("Passwords do not match".into()));
    }

    Ok(password)
}

/// Resolve a backup identifier to a full path
fn resolve_backup_path<S: crate::storage::BackupStore>(
    manager: &BackupManager<'_, S>,
    paths: &KeeperPaths,
    backup: &str,
) -> KeeperResult<PathBuf> {
    // Handle "latest" keyword
    if backup.eq_ignore_ascii_case("latest") {
        return manager
            .get_latest_backup()
            .map(|b| b.path)
            .ok_or_else(|| KeeperError::backup_not_found("latest"));
    }

    // Check if it's a full path
    let path = PathBuf::from(backup);
    if path.exists() {
        return Ok(path);
    }

    // Check if it's a filename in the backup directory
    let backup_path = paths.backup_dir().join(backup);
    if backup_path.exists() {
        return Ok(backup_path);
    }

    // Try with the backup extension appended
    let with_ext = paths
        .backup_dir()
        .join(format!("{}.{}", backup, BACKUP_FILE_EXT));
    if with_ext.exists() {
        return Ok(with_ext);
    }

    Err(KeeperError::backup_not_found(backup))
}

/// Format a duration in human-readable form
fn format_duration(duration: chrono::Duration) -> String {
    let total_seconds = duration.num_seconds();

    if total_seconds < 60 {
        return format!("{}s", total_seconds);
    }

    let minutes = total_seconds / 60;
    if minutes < 60 {
        return format!("{}m", minutes);
    }

    let hours = minutes / 60;
    if hours < 24 {
        return format!("{}h", hours);
    }

    let days = hours / 24;
    if days < 30 {
        return format!("{}d", days);
    }

    format!("{}mo", days / 30)
}

/// Format a file size in human-readable form
fn format_size(bytes: u64) -> String {
    const KB: u64 = 1024;
    const MB: u64 = KB * 1024;
    const GB: u64 = MB * 1024;

    if bytes >= GB {
        format!("{:.1} GB", bytes as f64 / GB as f64)
    } else if bytes >= MB {
        format!("{:.1} MB", bytes as f64 / MB as f64)
    } else if bytes >= KB {
        format!("{:.1} KB", bytes as f64 / KB as f64)
    } else {
        format!("{} B", bytes)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_size() {
        assert_eq!(format_size(512), "512 B");
        assert_eq!(format_size(2048), "2.0 KB");
        assert_eq!(format_size(5 * 1024 * 1024), "5.0 MB");
    }

    #[test]
    fn test_format_duration() {
        assert_eq!(format_duration(chrono::Duration::seconds(30)), "30s");
        assert_eq!(format_duration(chrono::Duration::minutes(5)), "5m");
        assert_eq!(format_duration(chrono::Duration::hours(3)), "3h");
        assert_eq!(format_duration(chrono::Duration::days(2)), "2d");
        assert_eq!(format_duration(chrono::Duration::days(90)), "3mo");
    }
}

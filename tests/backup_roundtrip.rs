//! End-to-end backup and restore tests
//!
//! Exercises the full pipeline across two independent data directories:
//! snapshot → encrypt → file → decrypt → merge.

use cardkeeper::backup::{BackupManager, RecordCounts, RestoreManager, PAYLOAD_VERSION};
use cardkeeper::config::paths::KeeperPaths;
use cardkeeper::crypto::password::hash_password;
use cardkeeper::models::{Credential, Field, FieldType, Template, User};
use cardkeeper::storage::{BackupStore, Storage};
use cardkeeper::KeeperError;
use tempfile::TempDir;

/// Helper: a fresh storage in its own temp directory.
fn fresh_storage() -> (TempDir, KeeperPaths, Storage) {
    let dir = TempDir::new().expect("create temp dir");
    let paths = KeeperPaths::with_base_dir(dir.path().to_path_buf());
    let storage = Storage::new(paths.clone()).expect("create storage");
    storage.load_all().expect("load storage");
    (dir, paths, storage)
}

// ---------------------------------------------------------------------------
// Create on one database, restore into another
// ---------------------------------------------------------------------------

#[test]
fn backup_and_restore_into_empty_database() {
    let (_source_dir, source_paths, source) = fresh_storage();

    // Seed: two users, no templates, one credential, one field
    let mut user1 = User::new();
    user1.set_value("Full Name", serde_json::json!("Dana Smith"));
    let user2 = User::new();
    source.upsert_user(user1).unwrap();
    source.upsert_user(user2).unwrap();

    let hash = hash_password("operator-pw").unwrap();
    source
        .upsert_credential(Credential::new("operator", hash))
        .unwrap();

    let mut field = Field::new("Full Name", FieldType::Text);
    field.required = true;
    source.upsert_field(field).unwrap();

    // Create the backup
    let manager = BackupManager::new(&source, &source_paths);
    let receipt = manager.create_backup("Secr3t!").unwrap();
    assert!(receipt.path.exists());

    // Restore into a completely separate, empty database
    let (_dest_dir, _dest_paths, dest) = fresh_storage();
    let restore = RestoreManager::new(&dest);
    let outcome = restore.restore_from_file(&receipt.path, "Secr3t!").unwrap();

    assert_eq!(
        outcome.restored,
        RecordCounts {
            users: 2,
            templates: 0,
            credentials: 1,
            fields: 1,
        }
    );
    assert_eq!(outcome.backup_version, PAYLOAD_VERSION);
    assert_eq!(outcome.backup_timestamp, receipt.timestamp);

    // The destination now holds the same records
    assert_eq!(dest.all_users().unwrap().len(), 2);
    assert!(dest.all_templates().unwrap().is_empty());
    let credential = dest.credentials.get_by_username("operator").unwrap();
    assert!(credential.is_some());
    let field = dest.fields.get_by_label("Full Name").unwrap().unwrap();
    assert!(field.required);
}

// ---------------------------------------------------------------------------
// Wrong password never yields a payload
// ---------------------------------------------------------------------------

#[test]
fn restore_with_wrong_password_fails() {
    let (_source_dir, source_paths, source) = fresh_storage();
    source.upsert_user(User::new()).unwrap();

    let manager = BackupManager::new(&source, &source_paths);
    let receipt = manager.create_backup("right password").unwrap();

    let (_dest_dir, _dest_paths, dest) = fresh_storage();
    let restore = RestoreManager::new(&dest);
    let result = restore.restore_from_file(&receipt.path, "wrong password");

    assert!(matches!(result, Err(KeeperError::InvalidEnvelope)));
    // Nothing was merged
    assert!(dest.all_users().unwrap().is_empty());
}

// ---------------------------------------------------------------------------
// Restore merges into existing data without replacing it
// ---------------------------------------------------------------------------

#[test]
fn restore_preserves_unrelated_records() {
    let (_source_dir, source_paths, source) = fresh_storage();
    source
        .upsert_template(Template::new("Template A", 85.6, 54.0))
        .unwrap();

    let manager = BackupManager::new(&source, &source_paths);
    let receipt = manager.create_backup("Secr3t!").unwrap();

    // The destination already has an unrelated template
    let (_dest_dir, _dest_paths, dest) = fresh_storage();
    dest.upsert_template(Template::new("Template B", 105.0, 74.0))
        .unwrap();

    let restore = RestoreManager::new(&dest);
    let outcome = restore.restore_from_file(&receipt.path, "Secr3t!").unwrap();
    assert_eq!(outcome.restored.templates, 1);

    let templates = dest.all_templates().unwrap();
    assert_eq!(templates.len(), 2);
    assert!(dest.templates.get_by_name("Template A").unwrap().is_some());
    assert!(dest.templates.get_by_name("Template B").unwrap().is_some());
}

// ---------------------------------------------------------------------------
// Verify is a pure dry run
// ---------------------------------------------------------------------------

#[test]
fn verify_reports_without_merging() {
    let (_source_dir, source_paths, source) = fresh_storage();
    source.upsert_user(User::new()).unwrap();
    source
        .upsert_field(Field::new("Department", FieldType::Text))
        .unwrap();

    let manager = BackupManager::new(&source, &source_paths);
    let receipt = manager.create_backup("Secr3t!").unwrap();

    let (_dest_dir, _dest_paths, dest) = fresh_storage();
    let restore = RestoreManager::new(&dest);
    let report = restore.verify_backup(&receipt.path, "Secr3t!");

    assert!(report.valid);
    assert_eq!(report.version.as_deref(), Some(PAYLOAD_VERSION));
    assert_eq!(report.timestamp.as_deref(), Some(receipt.timestamp.as_str()));
    let counts = report.counts.unwrap();
    assert_eq!(counts.users, 1);
    assert_eq!(counts.fields, 1);

    assert!(dest.all_users().unwrap().is_empty());
    assert!(dest.all_fields().unwrap().is_empty());
}

// ---------------------------------------------------------------------------
// Exported backups stay restorable
// ---------------------------------------------------------------------------

#[test]
fn exported_backup_restores_from_new_location() {
    let (_source_dir, source_paths, source) = fresh_storage();
    source.upsert_user(User::new()).unwrap();

    let manager = BackupManager::new(&source, &source_paths);
    let receipt = manager.create_backup("Secr3t!").unwrap();

    let export_dir = TempDir::new().unwrap();
    let exported = export_dir.path().join("offsite").join("keep.bak");
    manager.export_backup(&receipt.path, &exported).unwrap();

    let (_dest_dir, _dest_paths, dest) = fresh_storage();
    let restore = RestoreManager::new(&dest);
    let outcome = restore.restore_from_file(&exported, "Secr3t!").unwrap();

    assert_eq!(outcome.restored.users, 1);
}

//! Backup restoration for cardkeeper
//!
//! Decrypts a backup file and merges its contents back into live storage.
//! Restore is additive: records are upserted by their natural keys and
//! nothing already in storage is ever deleted. Each record merges
//! independently: one bad record is skipped and logged, the rest of the
//! restore continues. The operation never aborts partway and never rolls
//! back.

use std::fs;
use std::path::Path;

use serde::Serialize;
use serde_json::Value;
use tracing::{info, warn};

use crate::backup::payload::{BackupPayload, RecordCounts};
use crate::crypto::envelope;
use crate::error::{KeeperError, KeeperResult};
use crate::models::{Credential, Field, Template, User};
use crate::storage::BackupStore;

/// Result of a restore operation
#[derive(Debug, Clone, Serialize)]
pub struct RestoreOutcome {
    /// Records successfully merged, per entity type
    pub restored: RecordCounts,
    /// Version tag of the restored backup
    pub backup_version: String,
    /// Capture time of the restored backup
    pub backup_timestamp: String,
}

/// Result of verifying a backup without restoring it
#[derive(Debug, Clone, Serialize)]
pub struct VerifyReport {
    /// Whether the file decrypted and parsed
    pub valid: bool,
    /// Version tag, when valid
    pub version: Option<String>,
    /// Capture time, when valid
    pub timestamp: Option<String>,
    /// Per-entity record counts, when valid
    pub counts: Option<RecordCounts>,
    /// Failure message, when invalid
    pub error: Option<String>,
}

/// One entity type's merge behavior during restore
///
/// Each entity merges through its own strategy so the one with unusual
/// needs (credentials, whose upsert re-hashes the stored password) stays
/// an explicit, separately testable unit. Strategies deserialize a single
/// raw record and hand it to the store; any error is the caller's signal
/// to skip that record.
trait EntityMerger {
    /// Entity name, for logging
    fn entity(&self) -> &'static str;

    /// Merge one raw record into storage
    fn merge_one(&mut self, record: &Value) -> KeeperResult<()>;
}

struct UserMerger<'a, S: BackupStore> {
    store: &'a S,
}

impl<S: BackupStore> EntityMerger for UserMerger<'_, S> {
    fn entity(&self) -> &'static str {
        "users"
    }

    fn merge_one(&mut self, record: &Value) -> KeeperResult<()> {
        let user: User = serde_json::from_value(record.clone())?;
        self.store.upsert_user(user)
    }
}

struct TemplateMerger<'a, S: BackupStore> {
    store: &'a S,
}

impl<S: BackupStore> EntityMerger for TemplateMerger<'_, S> {
    fn entity(&self) -> &'static str {
        "templates"
    }

    fn merge_one(&mut self, record: &Value) -> KeeperResult<()> {
        let template: Template = serde_json::from_value(record.clone())?;
        self.store.upsert_template(template)
    }
}

struct CredentialMerger<'a, S: BackupStore> {
    store: &'a S,
}

impl<S: BackupStore> EntityMerger for CredentialMerger<'_, S> {
    fn entity(&self) -> &'static str {
        "credentials"
    }

    fn merge_one(&mut self, record: &Value) -> KeeperResult<()> {
        // The upsert may re-hash the password, which is expensive; records
        // reach this strategy strictly one at a time.
        let credential: Credential = serde_json::from_value(record.clone())?;
        self.store.upsert_credential(credential)
    }
}

struct FieldMerger<'a, S: BackupStore> {
    store: &'a S,
}

impl<S: BackupStore> EntityMerger for FieldMerger<'_, S> {
    fn entity(&self) -> &'static str {
        "fields"
    }

    fn merge_one(&mut self, record: &Value) -> KeeperResult<()> {
        let field: Field = serde_json::from_value(record.clone())?;
        self.store.upsert_field(field)
    }
}

/// Handles restoring and verifying backup files
pub struct RestoreManager<'a, S: BackupStore> {
    store: &'a S,
}

impl<'a, S: BackupStore> RestoreManager<'a, S> {
    /// Create a new RestoreManager over the given store
    pub fn new(store: &'a S) -> Self {
        Self { store }
    }

    /// Restore a backup file into live storage
    ///
    /// Fails fast on anything before merging begins (missing file, bad
    /// password, corrupted envelope, missing data section). Once merging
    /// starts, failures are record-scoped: the outcome counts what merged,
    /// and skipped records appear in the log.
    pub fn restore_from_file(&self, path: &Path, password: &str) -> KeeperResult<RestoreOutcome> {
        let envelope_text = fs::read_to_string(path)
            .map_err(|e| KeeperError::Io(format!("Failed to read backup file: {}", e)))?;

        let plaintext = envelope::decrypt(&envelope_text, password)?;

        // Plaintext that isn't a payload is indistinguishable from a
        // corrupted file, so it reports the same way.
        let payload: BackupPayload =
            serde_json::from_slice(&plaintext).map_err(|_| KeeperError::InvalidEnvelope)?;

        let data = payload.data.ok_or(KeeperError::InvalidStructure)?;

        let users = merge_section(&mut UserMerger { store: self.store }, &data.users);
        let templates = merge_section(&mut TemplateMerger { store: self.store }, &data.templates);
        let credentials =
            merge_section(&mut CredentialMerger { store: self.store }, &data.credentials);
        let fields = merge_section(&mut FieldMerger { store: self.store }, &data.fields);

        let restored = RecordCounts {
            users,
            templates,
            credentials,
            fields,
        };
        info!(
            "restore complete: {} of {} records merged",
            restored.total(),
            RecordCounts::from(&data).total()
        );

        Ok(RestoreOutcome {
            restored,
            backup_version: payload.version,
            backup_timestamp: payload.timestamp,
        })
    }

    /// Verify a backup file without touching storage
    ///
    /// A dry run: decrypts and parses, then reports the payload's version,
    /// capture time, and record counts. Any failure lands in the report
    /// rather than an error; this is the one place the generic decrypt
    /// message is surfaced directly.
    pub fn verify_backup(&self, path: &Path, password: &str) -> VerifyReport {
        match inspect_backup(path, password) {
            Ok((version, timestamp, counts)) => VerifyReport {
                valid: true,
                version: Some(version),
                timestamp: Some(timestamp),
                counts: Some(counts),
                error: None,
            },
            Err(err) => VerifyReport {
                valid: false,
                version: None,
                timestamp: None,
                counts: None,
                error: Some(err.to_string()),
            },
        }
    }
}

/// Merge one collection, counting successes and logging skips
fn merge_section(merger: &mut dyn EntityMerger, records: &[Value]) -> usize {
    let mut merged = 0;

    for (index, record) in records.iter().enumerate() {
        match merger.merge_one(record) {
            Ok(()) => merged += 1,
            Err(err) => {
                warn!(
                    "skipping {} record {} that failed to merge: {}",
                    merger.entity(),
                    index,
                    err
                );
            }
        }
    }

    merged
}

/// Decrypt and parse a backup for verification
fn inspect_backup(path: &Path, password: &str) -> KeeperResult<(String, String, RecordCounts)> {
    let envelope_text = fs::read_to_string(path)
        .map_err(|e| KeeperError::Io(format!("Failed to read backup file: {}", e)))?;

    let plaintext = envelope::decrypt(&envelope_text, password)?;
    let payload: BackupPayload =
        serde_json::from_slice(&plaintext).map_err(|_| KeeperError::InvalidEnvelope)?;

    let data = payload.data.ok_or(KeeperError::InvalidStructure)?;

    Ok((payload.version, payload.timestamp, RecordCounts::from(&data)))
}

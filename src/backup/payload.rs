//! Backup payload assembly
//!
//! The plaintext inside a backup envelope is one versioned JSON document
//! holding all four persisted collections. Records are carried as raw JSON
//! values rather than typed structs: the restore side deserializes them one
//! at a time, so a single malformed record can only ever cost itself, never
//! the whole payload.

use chrono::{SecondsFormat, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::warn;

use crate::error::KeeperResult;
use crate::storage::BackupStore;

/// Payload format version tag, for forward compatibility
pub const PAYLOAD_VERSION: &str = "1.0.0";

/// The decrypted content of a backup file
#[derive(Debug, Serialize, Deserialize)]
pub struct BackupPayload {
    /// Format version tag
    pub version: String,
    /// Snapshot capture time (ISO-8601, informational only)
    pub timestamp: String,
    /// The four collections; absent in a structurally invalid backup
    pub data: Option<BackupData>,
}

/// The four persisted collections, one JSON value per record
#[derive(Debug, Default, Serialize, Deserialize)]
pub struct BackupData {
    #[serde(default)]
    pub users: Vec<Value>,
    #[serde(default)]
    pub templates: Vec<Value>,
    #[serde(default)]
    pub credentials: Vec<Value>,
    #[serde(default)]
    pub fields: Vec<Value>,
}

/// Per-entity record counts, used by restore results and verify reports
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecordCounts {
    pub users: usize,
    pub templates: usize,
    pub credentials: usize,
    pub fields: usize,
}

impl RecordCounts {
    /// Total records across all entity types
    pub fn total(&self) -> usize {
        self.users + self.templates + self.credentials + self.fields
    }
}

impl From<&BackupData> for RecordCounts {
    fn from(data: &BackupData) -> Self {
        Self {
            users: data.users.len(),
            templates: data.templates.len(),
            credentials: data.credentials.len(),
            fields: data.fields.len(),
        }
    }
}

impl BackupPayload {
    /// Capture a snapshot of all four collections from the store
    ///
    /// Each accessor is called independently; a failing one degrades its
    /// section to an empty list so one corrupted collection cannot block
    /// backing up the other three.
    pub fn snapshot<S: BackupStore>(store: &S) -> Self {
        let data = BackupData {
            users: collect_section("users", store.all_users()),
            templates: collect_section("templates", store.all_templates()),
            credentials: collect_section("credentials", store.all_credentials()),
            fields: collect_section("fields", store.all_fields()),
        };

        Self {
            version: PAYLOAD_VERSION.to_string(),
            timestamp: timestamp_now(),
            data: Some(data),
        }
    }
}

/// Current time as an ISO-8601 string with millisecond precision
pub fn timestamp_now() -> String {
    Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true)
}

/// Serialize one collection for the payload, degrading to empty on failure
fn collect_section<T: Serialize>(entity: &str, records: KeeperResult<Vec<T>>) -> Vec<Value> {
    let records = match records {
        Ok(records) => records,
        Err(err) => {
            warn!("failed to read {} for backup, section will be empty: {}", entity, err);
            return Vec::new();
        }
    };

    records
        .into_iter()
        .filter_map(|record| match serde_json::to_value(record) {
            Ok(value) => Some(value),
            Err(err) => {
                warn!("failed to serialize a {} record for backup: {}", entity, err);
                None
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::paths::KeeperPaths;
    use crate::error::KeeperError;
    use crate::models::{Credential, Field, FieldType, Template, User};
    use crate::storage::Storage;
    use tempfile::TempDir;

    /// Store double whose user accessor always fails
    struct BrokenUsersStore;

    impl BackupStore for BrokenUsersStore {
        fn all_users(&self) -> KeeperResult<Vec<User>> {
            Err(KeeperError::Storage("users table corrupted".into()))
        }
        fn all_templates(&self) -> KeeperResult<Vec<Template>> {
            Ok(vec![Template::new("Staff Badge", 85.6, 54.0)])
        }
        fn all_credentials(&self) -> KeeperResult<Vec<Credential>> {
            Ok(Vec::new())
        }
        fn all_fields(&self) -> KeeperResult<Vec<Field>> {
            Ok(vec![Field::new("Full Name", FieldType::Text)])
        }
        fn upsert_user(&self, _: User) -> KeeperResult<()> {
            unreachable!("snapshot never writes")
        }
        fn upsert_template(&self, _: Template) -> KeeperResult<()> {
            unreachable!("snapshot never writes")
        }
        fn upsert_credential(&self, _: Credential) -> KeeperResult<()> {
            unreachable!("snapshot never writes")
        }
        fn upsert_field(&self, _: Field) -> KeeperResult<()> {
            unreachable!("snapshot never writes")
        }
    }

    #[test]
    fn test_snapshot_stamps_version_and_timestamp() {
        let temp_dir = TempDir::new().unwrap();
        let paths = KeeperPaths::with_base_dir(temp_dir.path().to_path_buf());
        let storage = Storage::new(paths).unwrap();
        storage.load_all().unwrap();

        let payload = BackupPayload::snapshot(&storage);

        assert_eq!(payload.version, PAYLOAD_VERSION);
        // ISO-8601 with millisecond precision and Z suffix
        assert!(payload.timestamp.ends_with('Z'));
        assert!(payload.timestamp.contains('T'));
        assert!(payload.data.is_some());
    }

    #[test]
    fn test_snapshot_collects_all_sections() {
        let temp_dir = TempDir::new().unwrap();
        let paths = KeeperPaths::with_base_dir(temp_dir.path().to_path_buf());
        let storage = Storage::new(paths).unwrap();
        storage.load_all().unwrap();

        storage.users.upsert(User::new()).unwrap();
        storage.users.upsert(User::new()).unwrap();
        storage
            .fields
            .upsert(Field::new("Full Name", FieldType::Text))
            .unwrap();

        let payload = BackupPayload::snapshot(&storage);
        let counts = RecordCounts::from(payload.data.as_ref().unwrap());

        assert_eq!(
            counts,
            RecordCounts {
                users: 2,
                templates: 0,
                credentials: 0,
                fields: 1,
            }
        );
    }

    #[test]
    fn test_failing_section_degrades_to_empty() {
        let payload = BackupPayload::snapshot(&BrokenUsersStore);
        let data = payload.data.unwrap();

        // The broken section is empty, the others are intact
        assert!(data.users.is_empty());
        assert_eq!(data.templates.len(), 1);
        assert_eq!(data.fields.len(), 1);
    }

    #[test]
    fn test_payload_serialization_shape() {
        let payload = BackupPayload {
            version: PAYLOAD_VERSION.to_string(),
            timestamp: timestamp_now(),
            data: Some(BackupData::default()),
        };

        let json: Value = serde_json::to_value(&payload).unwrap();
        assert!(json.get("version").is_some());
        assert!(json.get("timestamp").is_some());
        assert!(json["data"].get("users").unwrap().is_array());
    }
}

//! Storage layer for cardkeeper
//!
//! JSON file storage with atomic writes, plus the [`BackupStore`] trait the
//! backup engine consumes. The engine never touches repositories directly;
//! it is handed a `BackupStore` at construction, so tests (and any future
//! relational backend) can substitute their own implementation.

pub mod credentials;
pub mod fields;
pub mod file_io;
pub mod templates;
pub mod users;

pub use credentials::CredentialRepository;
pub use fields::FieldRepository;
pub use file_io::{read_json, write_json_atomic};
pub use templates::TemplateRepository;
pub use users::UserRepository;

use crate::config::paths::KeeperPaths;
use crate::error::{KeeperError, KeeperResult};
use crate::models::{Credential, Field, Template, User};

/// The storage contract the backup engine is built against
///
/// Four read accessors and four upserts, each independently failable. A
/// failing reader degrades that section of a snapshot; a failing upsert
/// skips that one record of a restore.
pub trait BackupStore {
    /// All card-holder records
    fn all_users(&self) -> KeeperResult<Vec<User>>;

    /// All card templates
    fn all_templates(&self) -> KeeperResult<Vec<Template>>;

    /// All login credentials
    fn all_credentials(&self) -> KeeperResult<Vec<Credential>>;

    /// All predefined field definitions
    fn all_fields(&self) -> KeeperResult<Vec<Field>>;

    /// Insert or update a user, keyed by id
    fn upsert_user(&self, user: User) -> KeeperResult<()>;

    /// Insert or update a template, keyed by name
    fn upsert_template(&self, template: Template) -> KeeperResult<()>;

    /// Insert or update a credential, keyed by username.
    ///
    /// May re-hash the stored password; implementations should expect this
    /// to be called sequentially, one record at a time.
    fn upsert_credential(&self, credential: Credential) -> KeeperResult<()>;

    /// Insert or update a field definition, keyed by label
    fn upsert_field(&self, field: Field) -> KeeperResult<()>;
}

/// Main storage coordinator that provides access to all repositories
pub struct Storage {
    paths: KeeperPaths,
    pub users: UserRepository,
    pub templates: TemplateRepository,
    pub credentials: CredentialRepository,
    pub fields: FieldRepository,
}

impl Storage {
    /// Create a new Storage instance
    pub fn new(paths: KeeperPaths) -> Result<Self, KeeperError> {
        // Ensure directories exist
        paths.ensure_directories()?;

        Ok(Self {
            users: UserRepository::new(paths.users_file()),
            templates: TemplateRepository::new(paths.templates_file()),
            credentials: CredentialRepository::new(paths.credentials_file()),
            fields: FieldRepository::new(paths.fields_file()),
            paths,
        })
    }

    /// Get the paths configuration
    pub fn paths(&self) -> &KeeperPaths {
        &self.paths
    }

    /// Load all collections from disk
    pub fn load_all(&self) -> Result<(), KeeperError> {
        self.users.load()?;
        self.templates.load()?;
        self.credentials.load()?;
        self.fields.load()?;
        Ok(())
    }

    /// Save all collections to disk
    pub fn save_all(&self) -> Result<(), KeeperError> {
        self.users.save()?;
        self.templates.save()?;
        self.credentials.save()?;
        self.fields.save()?;
        Ok(())
    }
}

// Upserts persist the touched collection immediately: a restore merges
// records one at a time and each merged record must survive a crash that
// happens before the operation finishes.
impl BackupStore for Storage {
    fn all_users(&self) -> KeeperResult<Vec<User>> {
        self.users.get_all()
    }

    fn all_templates(&self) -> KeeperResult<Vec<Template>> {
        self.templates.get_all()
    }

    fn all_credentials(&self) -> KeeperResult<Vec<Credential>> {
        self.credentials.get_all()
    }

    fn all_fields(&self) -> KeeperResult<Vec<Field>> {
        self.fields.get_all()
    }

    fn upsert_user(&self, user: User) -> KeeperResult<()> {
        self.users.upsert(user)?;
        self.users.save()
    }

    fn upsert_template(&self, template: Template) -> KeeperResult<()> {
        self.templates.upsert(template)?;
        self.templates.save()
    }

    fn upsert_credential(&self, credential: Credential) -> KeeperResult<()> {
        self.credentials.upsert(credential)?;
        self.credentials.save()
    }

    fn upsert_field(&self, field: Field) -> KeeperResult<()> {
        self.fields.upsert(field)?;
        self.fields.save()
    }
}

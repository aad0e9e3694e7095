//! Core data models for cardkeeper
//!
//! The four persisted record types (users, templates, credentials, fields)
//! plus strongly-typed ID newtypes.

pub mod credential;
pub mod field;
pub mod ids;
pub mod template;
pub mod user;

pub use credential::Credential;
pub use field::{Field, FieldType};
pub use ids::{CredentialId, FieldId, TemplateId, UserId};
pub use template::Template;
pub use user::User;

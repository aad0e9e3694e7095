//! cardkeeper - Desktop ID-card record manager: data engine and backup CLI
//!
//! This library holds the persisted-data engine behind the cardkeeper
//! desktop application: the record models, the JSON-file storage layer,
//! and the encrypted backup-and-restore engine.
//!
//! # Architecture
//!
//! The crate is organized into the following modules:
//!
//! - `config`: Configuration and path management
//! - `error`: Custom error types
//! - `models`: Core data models (users, templates, credentials, fields)
//! - `storage`: JSON file storage layer and the [`storage::BackupStore`] trait
//! - `crypto`: Envelope encryption, key derivation, password hashing
//! - `backup`: Encrypted backup creation, restore, verification, retention
//! - `cli`: Command handlers for the `cardkeeper` binary
//!
//! # Example
//!
//! ```rust,ignore
//! use cardkeeper::backup::BackupManager;
//! use cardkeeper::config::KeeperPaths;
//! use cardkeeper::storage::Storage;
//!
//! let paths = KeeperPaths::new()?;
//! let storage = Storage::new(paths.clone())?;
//! storage.load_all()?;
//!
//! let manager = BackupManager::new(&storage, &paths);
//! let receipt = manager.create_backup("correct horse battery staple")?;
//! ```

pub mod backup;
pub mod cli;
pub mod config;
pub mod crypto;
pub mod error;
pub mod models;
pub mod storage;

pub use error::{KeeperError, KeeperResult};

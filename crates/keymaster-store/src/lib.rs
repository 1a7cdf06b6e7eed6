//! Credential persistence for Keymaster.
//!
//! Three tables back the credential model: `credentials`, `app_identifiers`
//! and `app_keys`. Rows are soft-deleted through a `deleted_at` tombstone and
//! every query filters on it.

pub mod db;
pub mod error;
pub mod models;
pub mod repository;

pub use db::Database;
pub use error::{Result, StoreError};
pub use models::{AppIdentifier, AppKey, Credential};
pub use repository::{CredentialRepository, SqliteCredentialRepository};

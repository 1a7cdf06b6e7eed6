//! Credential entities.

use chrono::{DateTime, Utc};

/// An alias name bound to exactly one credential.
#[derive(Debug, Clone, PartialEq, Eq, sqlx::FromRow)]
pub struct AppIdentifier {
    pub id: Option<i64>,
    pub app_name: String,
    pub credentials_id: Option<i64>,
    pub deleted_at: Option<DateTime<Utc>>,
}

impl AppIdentifier {
    /// An unsaved identifier.
    pub fn new(app_name: impl Into<String>) -> Self {
        Self {
            id: None,
            app_name: app_name.into(),
            credentials_id: None,
            deleted_at: None,
        }
    }
}

/// One named secret value. `info` is kept as plaintext.
#[derive(Debug, Clone, PartialEq, Eq, sqlx::FromRow)]
pub struct AppKey {
    pub id: Option<i64>,
    pub name: String,
    pub info: String,
    pub credentials_id: Option<i64>,
    pub deleted_at: Option<DateTime<Utc>>,
}

impl AppKey {
    /// An unsaved secret.
    pub fn new(name: impl Into<String>, info: impl Into<String>) -> Self {
        Self {
            id: None,
            name: name.into(),
            info: info.into(),
            credentials_id: None,
            deleted_at: None,
        }
    }
}

/// The aggregate secret bundle for one or more app names.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Credential {
    pub id: Option<i64>,
    /// Key material in UUID text form.
    pub cipher_key: String,
    pub app_names: Vec<AppIdentifier>,
    pub keys: Vec<AppKey>,
    pub created_at: Option<DateTime<Utc>>,
    pub updated_at: Option<DateTime<Utc>>,
    pub deleted_at: Option<DateTime<Utc>>,
}

impl Credential {
    /// An unsaved credential.
    pub fn new(cipher_key: impl Into<String>, app_names: Vec<AppIdentifier>, keys: Vec<AppKey>) -> Self {
        Self {
            id: None,
            cipher_key: cipher_key.into(),
            app_names,
            keys,
            created_at: None,
            updated_at: None,
            deleted_at: None,
        }
    }

    /// The app names bound to this credential, in stored order.
    pub fn app_name_list(&self) -> Vec<&str> {
        self.app_names.iter().map(|a| a.app_name.as_str()).collect()
    }

    /// (name, info) pairs of every secret.
    pub fn secrets(&self) -> impl Iterator<Item = (&str, &str)> {
        self.keys.iter().map(|k| (k.name.as_str(), k.info.as_str()))
    }

    /// Strip persistence state so the entity can be inserted as a new row set.
    pub(crate) fn detach(&mut self) {
        self.id = None;
        self.created_at = None;
        self.updated_at = None;
        self.deleted_at = None;
        for ident in &mut self.app_names {
            ident.id = None;
            ident.credentials_id = None;
            ident.deleted_at = None;
        }
        for key in &mut self.keys {
            key.id = None;
            key.credentials_id = None;
            key.deleted_at = None;
        }
    }
}

/// A `credentials` row without its children.
#[derive(Debug, sqlx::FromRow)]
pub(crate) struct CredentialRow {
    pub id: i64,
    pub cipher_key: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub deleted_at: Option<DateTime<Utc>>,
}

impl CredentialRow {
    pub fn into_credential(self, app_names: Vec<AppIdentifier>, keys: Vec<AppKey>) -> Credential {
        Credential {
            id: Some(self.id),
            cipher_key: self.cipher_key,
            app_names,
            keys,
            created_at: Some(self.created_at),
            updated_at: Some(self.updated_at),
            deleted_at: self.deleted_at,
        }
    }
}

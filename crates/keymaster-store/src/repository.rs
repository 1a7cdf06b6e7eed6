//! Credential repository.
//!
//! [`CredentialRepository`] is the storage capability the HTTP handlers are
//! given. Multi-row mutations (`save`, `replace_cascade`) each run in a single
//! transaction, so a failure part way through leaves nothing behind.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::sqlite::{Sqlite, SqliteConnection, SqlitePool};
use sqlx::QueryBuilder;
use tracing::debug;

use crate::db::Database;
use crate::error::{Result, StoreError, NOT_FOUND};
use crate::models::{AppIdentifier, AppKey, Credential, CredentialRow};

/// Message for an alias whose owning credential row is gone.
const ORPHANED_ALIAS: &str = "Application id exists but credentials are missing or removed";

/// Storage operations over credentials and their aliases and secrets.
#[async_trait]
pub trait CredentialRepository: Send + Sync {
    /// Resolve an app name to its owning credential, fully populated.
    async fn find_by_app_name(&self, app_name: &str) -> Result<Credential>;

    /// The subset of `candidates` already bound to a live credential, sorted.
    async fn existing_app_names(&self, candidates: &[String]) -> Result<Vec<String>>;

    /// Insert a new credential, or update an existing one and its children.
    async fn save(&self, credential: Credential) -> Result<Credential>;

    /// Tombstone credential `old_id` with all its children and insert `replacement`.
    async fn replace_cascade(&self, old_id: i64, replacement: Credential) -> Result<Credential>;

    /// Live app names, one group per credential, ordered by (credential id, app name).
    async fn list_app_names_grouped(&self) -> Result<Vec<Vec<String>>>;
}

/// SQLite implementation of [`CredentialRepository`].
#[derive(Debug, Clone)]
pub struct SqliteCredentialRepository {
    pool: SqlitePool,
}

impl SqliteCredentialRepository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    pub fn from_database(db: &Database) -> Self {
        Self::new(db.pool().clone())
    }

    async fn load_children(&self, row: CredentialRow) -> Result<Credential> {
        let app_names: Vec<AppIdentifier> = sqlx::query_as(
            r#"
            SELECT id, app_name, credentials_id, deleted_at
            FROM app_identifiers
            WHERE credentials_id = ? AND deleted_at IS NULL
            ORDER BY id
            "#,
        )
        .bind(row.id)
        .fetch_all(&self.pool)
        .await?;

        let keys: Vec<AppKey> = sqlx::query_as(
            r#"
            SELECT id, name, info, credentials_id, deleted_at
            FROM app_keys
            WHERE credentials_id = ? AND deleted_at IS NULL
            ORDER BY id
            "#,
        )
        .bind(row.id)
        .fetch_all(&self.pool)
        .await?;

        Ok(row.into_credential(app_names, keys))
    }
}

/// Build `SELECT app_name ... WHERE app_name IN (candidates)`, optionally
/// ignoring names owned by `exclude`.
fn bound_names_query<'a>(candidates: &'a [String], exclude: Option<i64>) -> QueryBuilder<'a, Sqlite> {
    let mut builder = QueryBuilder::new(
        "SELECT app_name FROM app_identifiers WHERE deleted_at IS NULL AND app_name IN (",
    );
    let mut separated = builder.separated(", ");
    for name in candidates {
        separated.push_bind(name.as_str());
    }
    separated.push_unseparated(")");
    if let Some(id) = exclude {
        builder.push(" AND credentials_id <> ");
        builder.push_bind(id);
    }
    builder.push(" ORDER BY app_name");
    builder
}

/// Group `(credentials_id, app_name)` rows, already sorted, into one list per credential.
fn group_by_credential(rows: Vec<(i64, String)>) -> Vec<Vec<String>> {
    let mut groups: Vec<Vec<String>> = Vec::new();
    let mut last_id = None;
    for (credentials_id, app_name) in rows {
        if last_id == Some(credentials_id) {
            if let Some(group) = groups.last_mut() {
                group.push(app_name);
            }
        } else {
            groups.push(vec![app_name]);
            last_id = Some(credentials_id);
        }
    }
    groups
}

async fn insert_credential(
    conn: &mut SqliteConnection,
    credential: &mut Credential,
    now: DateTime<Utc>,
) -> Result<i64> {
    let id = sqlx::query(
        "INSERT INTO credentials (cipher_key, created_at, updated_at) VALUES (?, ?, ?)",
    )
    .bind(&credential.cipher_key)
    .bind(now)
    .bind(now)
    .execute(&mut *conn)
    .await?
    .last_insert_rowid();

    credential.id = Some(id);
    credential.created_at = Some(now);
    credential.updated_at = Some(now);
    Ok(id)
}

async fn upsert_identifier(
    conn: &mut SqliteConnection,
    credentials_id: i64,
    ident: &mut AppIdentifier,
) -> Result<()> {
    match ident.id {
        None => {
            let id = sqlx::query("INSERT INTO app_identifiers (app_name, credentials_id) VALUES (?, ?)")
                .bind(&ident.app_name)
                .bind(credentials_id)
                .execute(&mut *conn)
                .await
                .map_err(|e| StoreError::from_identifier_write(e, &ident.app_name))?
                .last_insert_rowid();
            ident.id = Some(id);
        }
        Some(id) => {
            sqlx::query("UPDATE app_identifiers SET app_name = ? WHERE id = ? AND credentials_id = ?")
                .bind(&ident.app_name)
                .bind(id)
                .bind(credentials_id)
                .execute(&mut *conn)
                .await
                .map_err(|e| StoreError::from_identifier_write(e, &ident.app_name))?;
        }
    }
    ident.credentials_id = Some(credentials_id);
    Ok(())
}

async fn upsert_key(conn: &mut SqliteConnection, credentials_id: i64, key: &mut AppKey) -> Result<()> {
    match key.id {
        None => {
            let id = sqlx::query("INSERT INTO app_keys (name, info, credentials_id) VALUES (?, ?, ?)")
                .bind(&key.name)
                .bind(&key.info)
                .bind(credentials_id)
                .execute(&mut *conn)
                .await?
                .last_insert_rowid();
            key.id = Some(id);
        }
        Some(id) => {
            sqlx::query("UPDATE app_keys SET name = ?, info = ? WHERE id = ? AND credentials_id = ?")
                .bind(&key.name)
                .bind(&key.info)
                .bind(id)
                .bind(credentials_id)
                .execute(&mut *conn)
                .await?;
        }
    }
    key.credentials_id = Some(credentials_id);
    Ok(())
}

async fn write_children(
    conn: &mut SqliteConnection,
    credentials_id: i64,
    credential: &mut Credential,
) -> Result<()> {
    for ident in &mut credential.app_names {
        upsert_identifier(conn, credentials_id, ident).await?;
    }
    for key in &mut credential.keys {
        upsert_key(conn, credentials_id, key).await?;
    }
    Ok(())
}

fn require_app_names(credential: &Credential) -> Result<()> {
    if credential.app_names.is_empty() {
        return Err(StoreError::Invalid(
            "a credential needs at least one app name".to_string(),
        ));
    }
    Ok(())
}

#[async_trait]
impl CredentialRepository for SqliteCredentialRepository {
    async fn find_by_app_name(&self, app_name: &str) -> Result<Credential> {
        let owner: Option<i64> = sqlx::query_scalar(
            "SELECT credentials_id FROM app_identifiers WHERE app_name = ? AND deleted_at IS NULL",
        )
        .bind(app_name)
        .fetch_optional(&self.pool)
        .await?;

        let credentials_id = owner.ok_or_else(|| StoreError::NotFound(NOT_FOUND.to_string()))?;

        let row: CredentialRow = sqlx::query_as(
            r#"
            SELECT id, cipher_key, created_at, updated_at, deleted_at
            FROM credentials
            WHERE id = ? AND deleted_at IS NULL
            "#,
        )
        .bind(credentials_id)
        .fetch_optional(&self.pool)
        .await?
        .ok_or_else(|| StoreError::NotFound(ORPHANED_ALIAS.to_string()))?;

        debug!(app_name, credentials_id, "resolved app name");
        self.load_children(row).await
    }

    async fn existing_app_names(&self, candidates: &[String]) -> Result<Vec<String>> {
        if candidates.is_empty() {
            return Ok(Vec::new());
        }

        let mut query = bound_names_query(candidates, None);
        let names = query.build_query_scalar::<String>().fetch_all(&self.pool).await?;
        Ok(names)
    }

    async fn save(&self, mut credential: Credential) -> Result<Credential> {
        require_app_names(&credential)?;

        let now = Utc::now();
        let mut tx = self.pool.begin().await?;

        let id = match credential.id {
            None => insert_credential(&mut tx, &mut credential, now).await?,
            Some(id) => {
                let updated = sqlx::query(
                    "UPDATE credentials SET cipher_key = ?, updated_at = ? WHERE id = ? AND deleted_at IS NULL",
                )
                .bind(&credential.cipher_key)
                .bind(now)
                .bind(id)
                .execute(&mut *tx)
                .await?;
                if updated.rows_affected() == 0 {
                    return Err(StoreError::NotFound(NOT_FOUND.to_string()));
                }
                credential.updated_at = Some(now);
                id
            }
        };

        write_children(&mut tx, id, &mut credential).await?;
        tx.commit().await?;

        debug!(credentials_id = id, "saved credential");
        Ok(credential)
    }

    async fn replace_cascade(&self, old_id: i64, mut replacement: Credential) -> Result<Credential> {
        require_app_names(&replacement)?;
        replacement.detach();

        let candidates: Vec<String> = replacement
            .app_names
            .iter()
            .map(|a| a.app_name.clone())
            .collect();

        let now = Utc::now();
        let mut tx = self.pool.begin().await?;

        // Write before reading: a deferred transaction that reads first
        // cannot take the write lock later while another writer holds it.
        let retired = sqlx::query(
            "UPDATE credentials SET deleted_at = ?, updated_at = ? WHERE id = ? AND deleted_at IS NULL",
        )
        .bind(now)
        .bind(now)
        .bind(old_id)
        .execute(&mut *tx)
        .await?;
        if retired.rows_affected() == 0 {
            return Err(StoreError::NotFound(NOT_FOUND.to_string()));
        }

        let mut query = bound_names_query(&candidates, Some(old_id));
        let conflicts = query.build_query_scalar::<String>().fetch_all(&mut *tx).await?;
        if !conflicts.is_empty() {
            return Err(StoreError::Conflict(conflicts));
        }

        sqlx::query("UPDATE app_identifiers SET deleted_at = ? WHERE credentials_id = ? AND deleted_at IS NULL")
            .bind(now)
            .bind(old_id)
            .execute(&mut *tx)
            .await?;

        sqlx::query("UPDATE app_keys SET deleted_at = ? WHERE credentials_id = ? AND deleted_at IS NULL")
            .bind(now)
            .bind(old_id)
            .execute(&mut *tx)
            .await?;

        let new_id = insert_credential(&mut tx, &mut replacement, now).await?;
        write_children(&mut tx, new_id, &mut replacement).await?;
        tx.commit().await?;

        debug!(old_id, new_id, "replaced credential");
        Ok(replacement)
    }

    async fn list_app_names_grouped(&self) -> Result<Vec<Vec<String>>> {
        let rows: Vec<(i64, String)> = sqlx::query_as(
            r#"
            SELECT ai.credentials_id, ai.app_name
            FROM app_identifiers ai
            JOIN credentials c ON c.id = ai.credentials_id
            WHERE ai.deleted_at IS NULL AND c.deleted_at IS NULL
            ORDER BY ai.credentials_id, ai.app_name
            "#,
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(group_by_credential(rows))
    }
}

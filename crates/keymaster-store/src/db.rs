//! SQLite pool setup and schema bootstrap.

use std::str::FromStr;
use std::time::Duration;

use keymaster_core::config::StoreConfig;
use sqlx::sqlite::{SqliteConnectOptions, SqliteJournalMode, SqlitePool, SqlitePoolOptions};

use crate::error::Result;

/// Schema statements, applied in order. Each one is idempotent.
const SCHEMA: &[&str] = &[
    r#"
    CREATE TABLE IF NOT EXISTS credentials (
        id          INTEGER PRIMARY KEY AUTOINCREMENT,
        cipher_key  TEXT NOT NULL,
        created_at  TEXT NOT NULL,
        updated_at  TEXT NOT NULL,
        deleted_at  TEXT
    )
    "#,
    r#"
    CREATE TABLE IF NOT EXISTS app_identifiers (
        id              INTEGER PRIMARY KEY AUTOINCREMENT,
        app_name        TEXT NOT NULL,
        credentials_id  INTEGER NOT NULL REFERENCES credentials(id),
        deleted_at      TEXT
    )
    "#,
    r#"
    CREATE TABLE IF NOT EXISTS app_keys (
        id              INTEGER PRIMARY KEY AUTOINCREMENT,
        name            TEXT NOT NULL,
        info            TEXT NOT NULL,
        credentials_id  INTEGER NOT NULL REFERENCES credentials(id),
        deleted_at      TEXT
    )
    "#,
    // An app name may be bound at most once among live identifiers.
    r#"
    CREATE UNIQUE INDEX IF NOT EXISTS idx_app_identifiers_live_name
        ON app_identifiers(app_name) WHERE deleted_at IS NULL
    "#,
    r#"
    CREATE INDEX IF NOT EXISTS idx_app_identifiers_credentials
        ON app_identifiers(credentials_id)
    "#,
    r#"
    CREATE INDEX IF NOT EXISTS idx_app_keys_credentials
        ON app_keys(credentials_id)
    "#,
];

/// How long a writer waits for the database lock before giving up.
const BUSY_TIMEOUT: Duration = Duration::from_secs(5);

/// Handle on the credential database.
#[derive(Debug, Clone)]
pub struct Database {
    pool: SqlitePool,
}

impl Database {
    /// Open (or create) the database file named in `config` and bootstrap the schema.
    pub async fn connect(config: &StoreConfig) -> Result<Self> {
        let options = SqliteConnectOptions::new()
            .filename(&config.path)
            .create_if_missing(true)
            .journal_mode(SqliteJournalMode::Wal)
            .busy_timeout(BUSY_TIMEOUT)
            .foreign_keys(true);

        let pool = SqlitePoolOptions::new()
            .max_connections(config.max_connections)
            .acquire_timeout(Duration::from_secs(30))
            .connect_with(options)
            .await?;

        let db = Self { pool };
        db.run_migrations().await?;
        tracing::info!(path = %config.path.display(), "credential store opened");
        Ok(db)
    }

    /// Open a private in-memory database.
    ///
    /// The pool is pinned to a single connection that never expires, since every
    /// SQLite in-memory connection is its own database.
    pub async fn in_memory() -> Result<Self> {
        let options = SqliteConnectOptions::from_str("sqlite::memory:")?.foreign_keys(true);

        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .idle_timeout(None)
            .max_lifetime(None)
            .connect_with(options)
            .await?;

        let db = Self { pool };
        db.run_migrations().await?;
        Ok(db)
    }

    /// The underlying connection pool.
    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    async fn run_migrations(&self) -> Result<()> {
        for statement in SCHEMA {
            sqlx::query(*statement).execute(&self.pool).await?;
        }

        tracing::debug!("Database migrations completed successfully");
        Ok(())
    }
}

//! Serve command.

use std::path::PathBuf;
use std::sync::Arc;

use clap::Args;
use keymaster_core::config::Config;
use keymaster_gateway::{Gateway, GatewayConfig};
use keymaster_store::{Database, SqliteCredentialRepository};
use tracing::info;

use crate::logging;

/// Serve command arguments.
#[derive(Args, Debug, Default)]
pub struct ServeArgs {
    /// Path to config file
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Address to bind
    #[arg(short, long)]
    pub bind: Option<String>,

    /// Port number
    #[arg(short, long)]
    pub port: Option<u16>,

    /// Path of the SQLite database file
    #[arg(long)]
    pub db: Option<PathBuf>,

    /// Append logs to this file instead of stderr
    #[arg(long)]
    pub log_file: Option<PathBuf>,
}

impl ServeArgs {
    /// Resolve the config file and lay the command-line overrides over it.
    pub fn load_config(&self) -> anyhow::Result<Config> {
        let mut config = Config::resolve(self.config.as_deref())?;

        if let Some(bind) = &self.bind {
            config.server.bind = bind.clone();
        }
        if let Some(port) = self.port {
            config.server.port = port;
        }
        if let Some(db) = &self.db {
            config.store.path = db.clone();
        }
        if let Some(file) = &self.log_file {
            config.logging.file = Some(file.clone());
        }

        config.validate()?;
        Ok(config)
    }
}

/// Run the serve command.
pub async fn run(args: ServeArgs, verbose: u8) -> anyhow::Result<()> {
    let config = args.load_config()?;

    logging::init(
        logging::level_for(verbose, config.logging.level),
        config.logging.file.as_deref(),
    )?;

    let db = Database::connect(&config.store).await?;
    let repository = Arc::new(SqliteCredentialRepository::from_database(&db));

    info!(
        "keymaster started (store: {})",
        config.store.path.display()
    );

    Gateway::new(GatewayConfig::from(&config.server), repository)
        .run()
        .await?;
    Ok(())
}

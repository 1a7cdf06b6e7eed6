//! Keymaster command-line interface.
//!
//! One binary covers both sides: `serve` runs the credential server, the
//! other commands talk to a running server over HTTP.

pub mod client;
pub mod commands;
pub mod logging;
pub mod render;

use clap::{Parser, Subcommand};
use keymaster_core::config::LogLevel;
use keymaster_core::env::vars;

pub use client::{ClientError, KeymasterClient};

/// Server address used when neither `--server` nor the environment names one.
pub const DEFAULT_SERVER_URL: &str = "http://127.0.0.1:8080";

/// Keymaster - credential storage and retrieval
#[derive(Parser)]
#[command(name = "keymaster")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Increase logging verbosity
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    pub verbose: u8,

    /// Base URL of the keymaster server
    #[arg(long, global = true, env = vars::KEYMASTER_SERVER_URL, default_value = DEFAULT_SERVER_URL)]
    pub server: String,

    #[command(subcommand)]
    pub command: Commands,
}

/// Available commands
#[derive(Subcommand)]
pub enum Commands {
    /// Run the credential server
    Serve(commands::serve::ServeArgs),

    /// Create a credential set from a spec file
    Add(commands::credentials::AddArgs),

    /// Fetch the credential set bound to an app id
    Get(commands::credentials::GetArgs),

    /// Replace the credential set bound to an app id
    Update(commands::credentials::UpdateArgs),

    /// Issue a new cipher key for the credential set bound to an app id
    Reissue(commands::credentials::ReissueArgs),

    /// List app ids grouped by credential set
    List,

    /// Show version information
    Version,
}

/// Run the CLI with the given arguments.
pub async fn run(cli: Cli) -> anyhow::Result<()> {
    match cli.command {
        Commands::Serve(args) => commands::serve::run(args, cli.verbose).await,
        Commands::Add(args) => commands::credentials::add(&connect(&cli.server, cli.verbose)?, args).await,
        Commands::Get(args) => commands::credentials::get(&connect(&cli.server, cli.verbose)?, args).await,
        Commands::Update(args) => {
            commands::credentials::update(&connect(&cli.server, cli.verbose)?, args).await
        }
        Commands::Reissue(args) => {
            commands::credentials::reissue(&connect(&cli.server, cli.verbose)?, args).await
        }
        Commands::List => commands::credentials::list(&connect(&cli.server, cli.verbose)?).await,
        Commands::Version => {
            println!("keymaster {}", env!("CARGO_PKG_VERSION"));
            Ok(())
        }
    }
}

/// Set up client-side logging and a client for `server`.
fn connect(server: &str, verbose: u8) -> anyhow::Result<KeymasterClient> {
    logging::init(logging::level_for(verbose, LogLevel::Warn), None)?;
    Ok(KeymasterClient::new(server)?)
}

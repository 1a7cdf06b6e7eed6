//! Keymaster CLI entry point.

use clap::Parser;
use console::style;
use keymaster_cli::{run, Cli};

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    if let Err(e) = run(cli).await {
        eprintln!("{} {:#}", style("error:").for_stderr().red().bold(), e);
        std::process::exit(1);
    }
}

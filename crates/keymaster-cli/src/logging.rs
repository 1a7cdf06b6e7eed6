//! Tracing subscriber setup.

use std::fs::OpenOptions;
use std::path::Path;
use std::sync::Mutex;

use keymaster_core::config::LogLevel;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Pick the log level: each `-v` raises `base` by one step.
pub fn level_for(verbose: u8, base: LogLevel) -> LogLevel {
    const LADDER: [LogLevel; 5] = [
        LogLevel::Error,
        LogLevel::Warn,
        LogLevel::Info,
        LogLevel::Debug,
        LogLevel::Trace,
    ];
    let start = LADDER.iter().position(|l| *l == base).unwrap_or(2);
    let index = (start + verbose as usize).min(LADDER.len() - 1);
    LADDER[index]
}

/// The default filter directive for `level`.
pub fn directive(level: LogLevel) -> String {
    format!("keymaster={0},tower_http={0}", level.as_str())
}

/// Install the global subscriber. `RUST_LOG` wins over `level` when set.
///
/// Logs go to stderr, or are appended to `file` when given.
pub fn init(level: LogLevel, file: Option<&Path>) -> anyhow::Result<()> {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(directive(level)));
    let registry = tracing_subscriber::registry().with(filter);

    match file {
        Some(path) => {
            let file = OpenOptions::new().create(true).append(true).open(path)?;
            registry
                .with(fmt::layer().with_ansi(false).with_writer(Mutex::new(file)))
                .try_init()?;
        }
        None => {
            registry
                .with(fmt::layer().with_writer(std::io::stderr))
                .try_init()?;
        }
    }

    Ok(())
}

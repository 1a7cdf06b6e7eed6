//! # keymaster-core
//!
//! Core configuration and utilities for Keymaster.
//!
//! This crate provides shared functionality used across the Keymaster crates:
//!
//! - **Configuration**: Loading, validation, and persistence of the server config file
//! - **Utilities**: Path resolution and environment variable handling

pub mod config;
pub mod env;
pub mod error;
pub mod paths;

// Re-exports for convenience
pub use config::Config;
pub use error::ConfigError;

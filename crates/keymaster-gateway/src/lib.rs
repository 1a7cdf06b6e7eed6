//! HTTP resource handlers for Keymaster.
//!
//! This crate provides:
//! - The credentials resource (create, retrieve, replace, reissue)
//! - The grouped app name listing
//! - The axum server wiring around a [`keymaster_store::CredentialRepository`]

pub mod error;
pub mod handlers;
pub mod protocol;
pub mod routes;
pub mod server;

pub use error::GatewayError;
pub use handlers::HandlerContext;
pub use protocol::{AppNameEntry, CredentialsRequest, ErrorMessage, KeyEntry};
pub use routes::CredentialsRoute;
pub use server::{Gateway, GatewayConfig};

/// Result type for gateway operations.
pub type Result<T> = std::result::Result<T, GatewayError>;

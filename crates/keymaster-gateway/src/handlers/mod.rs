//! HTTP resource handlers.

pub mod apps;
pub mod credentials;
pub mod health;

use std::sync::Arc;

use keymaster_store::CredentialRepository;

use crate::error::GatewayError;

/// Shared state handed to every handler.
#[derive(Clone)]
pub struct HandlerContext {
    /// Credential persistence.
    pub repository: Arc<dyn CredentialRepository>,
}

impl HandlerContext {
    /// Create a new handler context.
    pub fn new(repository: Arc<dyn CredentialRepository>) -> Self {
        Self { repository }
    }
}

/// Fallback for unmatched paths and unsupported methods.
pub async fn not_found() -> GatewayError {
    GatewayError::NotFound(keymaster_store::error::NOT_FOUND.to_string())
}

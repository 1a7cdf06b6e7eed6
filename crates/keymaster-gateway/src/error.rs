//! Gateway error types.

use axum::extract::rejection::{BytesRejection, PathRejection};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use keymaster_cipher::CipherError;
use keymaster_store::StoreError;
use thiserror::Error;
use tracing::{debug, error, warn};

use crate::protocol::ErrorMessage;

/// Errors that can occur while serving a request.
#[derive(Debug, Error)]
pub enum GatewayError {
    /// Malformed request: bad path shape or unparseable body.
    #[error("Invalid request: {0}")]
    Validation(String),

    /// Not found error.
    #[error("Not found: {0}")]
    NotFound(String),

    /// An app name is already bound to another credential.
    #[error("Conflict: {0}")]
    Conflict(String),

    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Internal error.
    #[error("Internal error: {0}")]
    Internal(String),
}

impl GatewayError {
    /// The HTTP status this error is reported with.
    pub fn status(&self) -> StatusCode {
        match self {
            Self::Validation(_) => StatusCode::BAD_REQUEST,
            Self::NotFound(_) => StatusCode::NOT_FOUND,
            Self::Conflict(_) => StatusCode::CONFLICT,
            Self::Io(_) | Self::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// The text placed in the `Message` field of the response body.
    pub fn message(&self) -> String {
        match self {
            Self::Validation(msg)
            | Self::NotFound(msg)
            | Self::Conflict(msg)
            | Self::Internal(msg) => msg.clone(),
            Self::Io(e) => e.to_string(),
        }
    }
}

impl From<StoreError> for GatewayError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::NotFound(msg) => Self::NotFound(msg),
            StoreError::Invalid(msg) => Self::Validation(msg),
            StoreError::Conflict(_) => Self::Conflict(err.to_string()),
            StoreError::Database(e) => Self::Internal(format!("database error: {e}")),
        }
    }
}

impl From<CipherError> for GatewayError {
    fn from(err: CipherError) -> Self {
        Self::Internal(format!("envelope construction failed: {err}"))
    }
}

impl From<PathRejection> for GatewayError {
    fn from(rejection: PathRejection) -> Self {
        Self::Validation(rejection.body_text())
    }
}

impl From<BytesRejection> for GatewayError {
    fn from(rejection: BytesRejection) -> Self {
        Self::Validation(rejection.body_text())
    }
}

impl IntoResponse for GatewayError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            error!(error = %self, "request failed");
        } else if status == StatusCode::NOT_FOUND {
            debug!(error = %self, "request rejected");
        } else {
            warn!(error = %self, "request rejected");
        }

        let body = ErrorMessage {
            message: self.message(),
        };
        (status, Json(body)).into_response()
    }
}

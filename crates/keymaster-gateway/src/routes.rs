//! Route table for the credentials resource.
//!
//! axum only matches the path prefix; the method and the segments after
//! `/api/credentials` are resolved here so that every malformed shape gets
//! a precise status code.

use axum::http::Method;

use crate::error::GatewayError;
use crate::Result;

/// Message for a path with an empty segment.
pub const MISSING_IDENTIFIER: &str = "Missing application identifier";

/// Actions that can be applied to a single credential.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CredentialAction {
    Reissue,
}

impl CredentialAction {
    /// Match an action segment, ignoring ASCII case.
    pub fn parse(segment: &str) -> Option<Self> {
        if segment.eq_ignore_ascii_case("reissue") {
            Some(Self::Reissue)
        } else {
            None
        }
    }
}

/// A resolved operation on the credentials resource.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CredentialsRoute {
    Create,
    Retrieve { app_name: String },
    Replace { app_name: String },
    Reissue { app_name: String },
}

impl CredentialsRoute {
    /// Resolve `method` against the path tail after `/api/credentials`.
    ///
    /// `tail` carries no leading slash and is empty for the collection itself.
    /// Unsupported methods are `NotFound`; a supported method with the wrong
    /// path shape is a `Validation` error.
    pub fn resolve(method: &Method, tail: &str) -> Result<Self> {
        if tail.is_empty() {
            return match *method {
                Method::POST => Ok(Self::Create),
                _ => Err(not_found()),
            };
        }

        if !matches!(*method, Method::GET | Method::PUT | Method::PATCH) {
            return Err(not_found());
        }

        let segments: Vec<&str> = tail.split('/').collect();
        if segments.iter().any(|s| s.is_empty()) {
            return Err(GatewayError::Validation(MISSING_IDENTIFIER.to_string()));
        }

        match (method, segments.as_slice()) {
            (&Method::GET, [app_name]) => Ok(Self::Retrieve {
                app_name: app_name.to_string(),
            }),
            (&Method::PUT, [app_name]) => Ok(Self::Replace {
                app_name: app_name.to_string(),
            }),
            (&Method::PATCH, [app_name, action]) => match CredentialAction::parse(action) {
                Some(CredentialAction::Reissue) => Ok(Self::Reissue {
                    app_name: app_name.to_string(),
                }),
                None => Err(GatewayError::Validation(format!("Unknown action: {action}"))),
            },
            (&Method::PATCH, [_]) => Err(GatewayError::Validation("Missing action".to_string())),
            _ => Err(GatewayError::Validation(format!(
                "Unexpected path: /api/credentials/{tail}"
            ))),
        }
    }
}

fn not_found() -> GatewayError {
    GatewayError::NotFound(keymaster_store::error::NOT_FOUND.to_string())
}

//! Request and response bodies of the HTTP interface.

use std::collections::HashSet;

use keymaster_store::{AppIdentifier, AppKey, Credential};
use serde::{Deserialize, Serialize};

use crate::error::GatewayError;
use crate::Result;

/// Body of a create or replace request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct CredentialsRequest {
    /// App names to bind. At least one is required.
    pub app_names: Vec<AppNameEntry>,

    /// Secrets to seal. Missing means none.
    #[serde(default)]
    pub keys: Vec<KeyEntry>,
}

/// One app name in a request body.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct AppNameEntry {
    pub app_name: String,
}

/// One named secret in a request body.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct KeyEntry {
    pub name: String,
    pub info: String,
}

/// Body of every error response.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct ErrorMessage {
    pub message: String,
}

impl CredentialsRequest {
    /// Decode and validate a request body.
    pub fn parse(body: &[u8]) -> Result<Self> {
        let request: Self = serde_json::from_slice(body)
            .map_err(|e| GatewayError::Validation(format!("Invalid request body: {e}")))?;
        request.validate()?;
        Ok(request)
    }

    fn validate(&self) -> Result<()> {
        if self.app_names.is_empty() {
            return Err(GatewayError::Validation(
                "At least one app name is required".to_string(),
            ));
        }

        let mut seen = HashSet::new();
        for entry in &self.app_names {
            if entry.app_name.is_empty() {
                return Err(GatewayError::Validation(
                    "App names must not be empty".to_string(),
                ));
            }
            if !addressable(&entry.app_name) {
                return Err(GatewayError::Validation(format!(
                    "App name cannot be used in a URL path: {}",
                    entry.app_name
                )));
            }
            if !seen.insert(entry.app_name.as_str()) {
                return Err(GatewayError::Validation(format!(
                    "Duplicate app name in request: {}",
                    entry.app_name
                )));
            }
        }
        Ok(())
    }

    /// The requested app names, in body order.
    pub fn app_name_list(&self) -> Vec<String> {
        self.app_names.iter().map(|e| e.app_name.clone()).collect()
    }

    /// Build an unsaved credential under `cipher_key`.
    pub fn into_credential(self, cipher_key: impl Into<String>) -> Credential {
        let app_names = self
            .app_names
            .into_iter()
            .map(|e| AppIdentifier::new(e.app_name))
            .collect();
        let keys = self
            .keys
            .into_iter()
            .map(|k| AppKey::new(k.name, k.info))
            .collect();
        Credential::new(cipher_key, app_names, keys)
    }
}

/// Whether `app_name` survives as a single `/api/credentials/{appName}` segment.
fn addressable(app_name: &str) -> bool {
    !app_name.contains('/') && app_name != "." && app_name != ".."
}

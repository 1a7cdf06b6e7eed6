//! Configuration loading and persistence.

use super::Config;
use crate::env;
use crate::error::ConfigError;
use crate::paths;
use std::fs;
use std::path::Path;

impl Config {
    /// Load configuration from the default path.
    pub fn load_default() -> Result<Self, ConfigError> {
        let path = paths::config_file()?;
        Self::load(&path)
    }

    /// Load configuration from a file path.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        if !path.exists() {
            return Err(ConfigError::NotFound(path.to_path_buf()));
        }

        let content = fs::read_to_string(path)?;
        Self::parse(&content)
    }

    /// Parse configuration from a string.
    pub fn parse(content: &str) -> Result<Self, ConfigError> {
        json5::from_str(content).map_err(|e| ConfigError::Json5(e.to_string()))
    }

    /// Save configuration to a file path.
    pub fn save(&self, path: &Path) -> Result<(), ConfigError> {
        let content = self.to_json5()?;

        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }

        let temp_path = path.with_extension("tmp");
        fs::write(&temp_path, &content)?;
        fs::rename(&temp_path, path)?;

        Ok(())
    }

    /// Render the config for writing to disk. Plain JSON is valid JSON5.
    pub fn to_json5(&self) -> Result<String, ConfigError> {
        serde_json::to_string_pretty(self).map_err(|e| ConfigError::Parse(e.to_string()))
    }

    /// Validate the configuration, collecting all errors before returning.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let mut errors = Vec::new();

        if self.server.port == 0 {
            errors.push("Server port cannot be 0".to_string());
        }

        if self.server.bind.trim().is_empty() {
            errors.push("Server bind address must not be empty".to_string());
        }

        if self.store.path.as_os_str().is_empty() {
            errors.push("Store path must not be empty".to_string());
        }

        if self.store.max_connections == 0 {
            errors.push("Store max_connections must be at least 1".to_string());
        }

        if errors.is_empty() {
            Ok(())
        } else {
            Err(ConfigError::Validation(errors.join("; ")))
        }
    }

    /// Resolve the configuration for the server.
    ///
    /// An explicit path must exist. Without one, `KEYMASTER_CONFIG` and then the
    /// default path are tried, and a missing file falls back to defaults.
    /// `KEYMASTER_PORT` overrides the port in every case.
    pub fn resolve(explicit: Option<&Path>) -> Result<Self, ConfigError> {
        let mut config = match explicit {
            Some(path) => Self::load(path)?,
            None => match env::get_var(env::vars::KEYMASTER_CONFIG) {
                Some(path) => Self::load(Path::new(&path))?,
                None => match Self::load_default() {
                    Ok(config) => config,
                    Err(ConfigError::NotFound(path)) => {
                        tracing::debug!(path = %path.display(), "no config file, using defaults");
                        Self::default()
                    }
                    Err(e) => return Err(e),
                },
            },
        };

        if let Some(port) = env::get_u16(env::vars::KEYMASTER_PORT) {
            config.server.port = port;
        }

        Ok(config)
    }
}

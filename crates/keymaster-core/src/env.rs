//! Environment variable handling.

use std::env;

/// Environment variable names recognized by Keymaster.
pub mod vars {
    /// Base URL of the Keymaster server, used by the client commands.
    pub const KEYMASTER_SERVER_URL: &str = "KEYMASTER_SERVER_URL";

    /// Path of the server config file.
    pub const KEYMASTER_CONFIG: &str = "KEYMASTER_CONFIG";

    /// Port override for the server.
    pub const KEYMASTER_PORT: &str = "KEYMASTER_PORT";
}

/// Get an environment variable, returning None if not set or empty.
pub fn get_var(name: &str) -> Option<String> {
    env::var(name).ok().filter(|v| !v.is_empty())
}

/// Get an environment variable as a u16 (e.g., for ports).
pub fn get_u16(name: &str) -> Option<u16> {
    get_var(name).and_then(|v| v.parse().ok())
}

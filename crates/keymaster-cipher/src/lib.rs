//! Credential envelope encryption for Keymaster.
//!
//! Generates per-credential key material and seals a credential's secrets
//! into the `{cypherKey, cypherText}` wire envelope with AES-128-CFB.

pub mod crypto;
pub mod error;
pub mod types;

pub use crypto::{generate_key, open, open_secrets, seal};
pub use error::{CipherError, Result};
pub use types::{CipherKey, Envelope};

//! Key material and wire envelope types.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

use crate::error::{CipherError, Result};

/// Size of the key material in bytes. Also the AES block size.
pub const KEY_SIZE: usize = 16;

/// 128 bits of key material, carried in its UUID text form.
///
/// The hyphenated UUID string is what gets persisted as a credential's
/// cipher key and returned in the envelope.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CipherKey(Uuid);

impl CipherKey {
    /// Parse key material from its UUID text form.
    pub fn parse(text: &str) -> Result<Self> {
        Uuid::parse_str(text)
            .map(Self)
            .map_err(|e| CipherError::Decode(format!("invalid cipher key: {e}")))
    }

    /// The raw key bytes.
    pub fn as_bytes(&self) -> &[u8; KEY_SIZE] {
        self.0.as_bytes()
    }

    pub(crate) fn from_uuid(uuid: Uuid) -> Self {
        Self(uuid)
    }
}

impl fmt::Display for CipherKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0.hyphenated())
    }
}

impl FromStr for CipherKey {
    type Err = CipherError;

    fn from_str(s: &str) -> Result<Self> {
        Self::parse(s)
    }
}

/// The encrypted wire representation of a credential's secrets.
///
/// The key travels next to its own ciphertext, so any holder of an
/// envelope can decrypt it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Envelope {
    /// Key material in UUID text form.
    pub cypher_key: String,

    /// Base64 (standard alphabet) AES-128-CFB ciphertext of the secrets JSON.
    pub cypher_text: String,
}

//! AES-128-CFB envelope construction.
//!
//! The 16 bytes of a credential's cipher key serve as both the AES key and
//! the IV. This is a weak construction kept for wire compatibility with
//! existing clients; changing either half breaks every issued envelope.
//!
//! Compatibility is at the level of the decoded mapping, not the plaintext
//! bytes. Go's `json.Marshal` writes `<`, `>` and `&` as `\u003c`, `\u003e`
//! and `\u0026`, while `serde_json` writes them literally, so a value holding
//! those characters seals to different ciphertext than a Go server would
//! produce. Both forms decode to the same object.

use std::collections::BTreeMap;

use aes::cipher::generic_array::GenericArray;
use aes::cipher::{AsyncStreamCipher, KeyIvInit};
use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use uuid::Uuid;

use crate::error::{CipherError, Result};
use crate::types::{CipherKey, Envelope};

type Aes128CfbEnc = cfb_mode::Encryptor<aes::Aes128>;
type Aes128CfbDec = cfb_mode::Decryptor<aes::Aes128>;

/// Generate fresh key material for a credential.
pub fn generate_key() -> CipherKey {
    CipherKey::from_uuid(Uuid::new_v4())
}

/// Seal `secrets` (name, value pairs) into an envelope under `cipher_key`.
///
/// The plaintext is the JSON object mapping each name to its value, with
/// names in sorted order. A repeated name keeps its last value.
pub fn seal<'a, I>(cipher_key: &str, secrets: I) -> Result<Envelope>
where
    I: IntoIterator<Item = (&'a str, &'a str)>,
{
    let key = CipherKey::parse(cipher_key)?;
    let plaintext_map: BTreeMap<&str, &str> = secrets.into_iter().collect();
    let mut buf = serde_json::to_vec(&plaintext_map)?;

    let key_bytes = GenericArray::from(*key.as_bytes());
    Aes128CfbEnc::new(&key_bytes, &key_bytes).encrypt(&mut buf);

    Ok(Envelope {
        cypher_key: key.to_string(),
        cypher_text: STANDARD.encode(&buf),
    })
}

/// Decrypt an envelope back to its plaintext JSON bytes.
pub fn open(envelope: &Envelope) -> Result<Vec<u8>> {
    let key = CipherKey::parse(&envelope.cypher_key)?;
    let mut buf = STANDARD
        .decode(&envelope.cypher_text)
        .map_err(|e| CipherError::Decode(format!("base64 decode failed: {e}")))?;

    let key_bytes = GenericArray::from(*key.as_bytes());
    Aes128CfbDec::new(&key_bytes, &key_bytes).decrypt(&mut buf);

    Ok(buf)
}

/// Decrypt an envelope and decode the name to value mapping it carries.
pub fn open_secrets(envelope: &Envelope) -> Result<BTreeMap<String, String>> {
    let plaintext = open(envelope)?;
    Ok(serde_json::from_slice(&plaintext)?)
}

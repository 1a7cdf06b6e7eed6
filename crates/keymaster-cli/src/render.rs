//! Terminal rendering of server responses.

use std::fmt::Write;

use keymaster_cipher::Envelope;

/// Render an envelope as pretty JSON.
pub fn envelope_json(envelope: &Envelope) -> anyhow::Result<String> {
    Ok(serde_json::to_string_pretty(envelope)?)
}

/// Decrypt an envelope and return the secrets JSON it carries.
pub fn decrypted_json(envelope: &Envelope) -> anyhow::Result<String> {
    let plaintext = keymaster_cipher::open(envelope)?;
    let value: serde_json::Value = serde_json::from_slice(&plaintext)?;
    Ok(serde_json::to_string_pretty(&value)?)
}

/// Render the grouped app id listing, one block per credential set.
pub fn app_list(groups: &[Vec<String>], server: &str) -> String {
    if groups.is_empty() {
        return format!("There were no credential sets found at the specified address: {server}\n");
    }

    let mut out = String::new();
    for (set_index, names) in groups.iter().enumerate() {
        let _ = writeln!(out, "--= App Identifiers In Credentials Set {set_index} =--");
        for (id_index, name) in names.iter().enumerate() {
            let _ = writeln!(out, "\t{id_index}  {name}");
        }
        out.push('\n');
    }
    out
}

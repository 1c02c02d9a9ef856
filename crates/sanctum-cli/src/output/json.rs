//! JSON output formatting.
//!
//! Listings never carry password ciphertext, and locked note content is
//! withheld.

use secrecy::{ExposeSecret, SecretString};

use sanctum_core::storage::{Credential, Link, Note};

/// Convert a credential to JSON, without its password.
pub fn credential_json(credential: &Credential) -> serde_json::Value {
    serde_json::json!({
        "id": credential.id,
        "name": credential.name,
        "username": credential.username,
        "created_at": credential.created_at,
        "updated_at": credential.updated_at,
    })
}

pub fn credentials_json(credentials: &[Credential]) -> Vec<serde_json::Value> {
    credentials.iter().map(credential_json).collect()
}

/// A credential plus its decrypted password, for `cred show --json`.
pub fn revealed_json(credential: &Credential, password: &SecretString) -> serde_json::Value {
    let mut value = credential_json(credential);
    value["password"] = serde_json::Value::String(password.expose_secret().to_string());
    value
}

fn note_json(note: &Note) -> serde_json::Value {
    let content = if note.is_locked {
        serde_json::Value::Null
    } else {
        serde_json::Value::String(note.content.clone())
    };
    serde_json::json!({
        "id": note.id,
        "content": content,
        "is_locked": note.is_locked,
        "is_pinned": note.is_pinned,
        "created_at": note.created_at,
        "updated_at": note.updated_at,
    })
}

pub fn notes_json(notes: &[Note]) -> Vec<serde_json::Value> {
    notes.iter().map(note_json).collect()
}

pub fn links_json(links: &[Link]) -> Vec<serde_json::Value> {
    links
        .iter()
        .map(|link| serde_json::to_value(link).unwrap_or(serde_json::Value::Null))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_locked_note_content_is_null() {
        let mut note = Note::new("secret plans");
        note.is_locked = true;
        let values = notes_json(&[note]);
        assert!(values[0]["content"].is_null());
        assert_eq!(values[0]["is_locked"], serde_json::Value::Bool(true));
    }

    #[test]
    fn test_link_json_uses_field_names() {
        let link = Link::new("https://example.org", None);
        let values = links_json(&[link]);
        assert_eq!(values[0]["url"], "https://example.org");
        assert_eq!(values[0]["is_hide"], false);
    }
}

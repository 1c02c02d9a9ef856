//! Text and table output formatting.

use chrono::{DateTime, Utc};
use comfy_table::{ContentArrangement, Table};
use secrecy::{ExposeSecret, SecretString};

use sanctum_core::storage::{Credential, Link, Note};

/// Shown in place of a locked note's content.
const LOCKED_PLACEHOLDER: &str = "[locked]";

fn table(headers: &[&str], rows: Vec<Vec<String>>) -> String {
    let mut table = Table::new();
    table.load_preset(comfy_table::presets::NOTHING);
    table.set_content_arrangement(ContentArrangement::Dynamic);
    table.set_header(headers.to_vec());
    for row in rows {
        table.add_row(row);
    }
    table.to_string()
}

fn timestamp(value: &DateTime<Utc>) -> String {
    value.format("%Y-%m-%d %H:%M").to_string()
}

fn flag(set: bool, label: &str) -> String {
    if set {
        label.to_string()
    } else {
        String::new()
    }
}

pub fn credential_table(credentials: &[Credential]) -> String {
    let rows = credentials
        .iter()
        .map(|credential| {
            vec![
                credential.id.to_string(),
                credential.name.clone(),
                credential.username.clone(),
                timestamp(&credential.updated_at),
            ]
        })
        .collect();
    table(&["ID", "NAME", "USERNAME", "UPDATED"], rows)
}

pub fn note_table(notes: &[Note]) -> String {
    let rows = notes
        .iter()
        .map(|note| {
            let content = if note.is_locked {
                LOCKED_PLACEHOLDER.to_string()
            } else {
                note.content.lines().next().unwrap_or_default().to_string()
            };
            vec![
                note.id.to_string(),
                flag(note.is_pinned, "pinned"),
                content,
                timestamp(&note.updated_at),
            ]
        })
        .collect();
    table(&["ID", "", "CONTENT", "UPDATED"], rows)
}

pub fn link_table(links: &[Link]) -> String {
    let rows = links
        .iter()
        .map(|link| {
            vec![
                link.id.to_string(),
                flag(link.is_hide, "hidden"),
                link.title.clone().unwrap_or_default(),
                link.url.clone(),
            ]
        })
        .collect();
    table(&["ID", "", "TITLE", "URL"], rows)
}

/// Print a credential together with its decrypted password.
pub fn print_revealed(credential: &Credential, password: &SecretString) {
    println!("Name:     {}", credential.name);
    println!("Username: {}", credential.username);
    println!("Password: {}", password.expose_secret());
    println!("Updated:  {}", timestamp(&credential.updated_at));
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_note_table_hides_locked_content() {
        let mut locked = Note::new("bank PIN hint");
        locked.is_locked = true;
        let open = Note::new("shopping list\nmilk");

        let rendered = note_table(&[locked, open]);
        assert!(!rendered.contains("bank PIN hint"));
        assert!(rendered.contains(LOCKED_PLACEHOLDER));
        assert!(rendered.contains("shopping list"));
        assert!(!rendered.contains("milk"));
    }

    #[test]
    fn test_link_table_marks_hidden() {
        let mut link = Link::new("https://example.org", Some("Example".to_string()));
        link.is_hide = true;
        let rendered = link_table(&[link]);
        assert!(rendered.contains("hidden"));
        assert!(rendered.contains("Example"));
    }
}

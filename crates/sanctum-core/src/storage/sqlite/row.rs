//! Row types for database queries.

use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::crypto::PinHash;
use crate::error::{Result, SanctumError};
use crate::storage::types::{Credential, Link, Note, PinRecord};

fn parse_uuid(value: &str, what: &str) -> Result<Uuid> {
    Uuid::parse_str(value).map_err(|e| SanctumError::Storage(format!("Invalid {} UUID: {}", what, e)))
}

fn parse_timestamp(value: &str) -> Result<DateTime<Utc>> {
    Ok(DateTime::parse_from_rfc3339(value)
        .map_err(|e| SanctumError::Storage(format!("Invalid timestamp: {}", e)))?
        .with_timezone(&Utc))
}

/// Raw row from the pin_records table.
#[derive(Debug)]
pub struct PinRow {
    pub user_id: String,
    pub pin_hash: String,
    pub created_at: String,
    pub updated_at: String,
}

impl TryFrom<PinRow> for PinRecord {
    type Error = SanctumError;

    fn try_from(row: PinRow) -> Result<Self> {
        Ok(PinRecord {
            user_id: parse_uuid(&row.user_id, "user")?,
            pin_hash: PinHash::from_hex(&row.pin_hash)
                .map_err(|e| SanctumError::Storage(format!("Invalid PIN hash: {}", e)))?,
            created_at: parse_timestamp(&row.created_at)?,
            updated_at: parse_timestamp(&row.updated_at)?,
        })
    }
}

/// Raw row from the credentials table.
#[derive(Debug)]
pub struct CredentialRow {
    pub id: String,
    pub name: String,
    pub username: String,
    pub password: String,
    pub created_at: String,
    pub updated_at: String,
}

impl TryFrom<CredentialRow> for Credential {
    type Error = SanctumError;

    fn try_from(row: CredentialRow) -> Result<Self> {
        Ok(Credential {
            id: parse_uuid(&row.id, "credential")?,
            name: row.name,
            username: row.username,
            password: row.password,
            created_at: parse_timestamp(&row.created_at)?,
            updated_at: parse_timestamp(&row.updated_at)?,
        })
    }
}

/// Raw row from the notes table.
#[derive(Debug)]
pub struct NoteRow {
    pub id: String,
    pub content: String,
    pub is_locked: bool,
    pub is_pinned: bool,
    pub created_at: String,
    pub updated_at: String,
}

impl TryFrom<NoteRow> for Note {
    type Error = SanctumError;

    fn try_from(row: NoteRow) -> Result<Self> {
        Ok(Note {
            id: parse_uuid(&row.id, "note")?,
            content: row.content,
            is_locked: row.is_locked,
            is_pinned: row.is_pinned,
            created_at: parse_timestamp(&row.created_at)?,
            updated_at: parse_timestamp(&row.updated_at)?,
        })
    }
}

/// Raw row from the links table.
#[derive(Debug)]
pub struct LinkRow {
    pub id: String,
    pub url: String,
    pub title: Option<String>,
    pub is_hide: bool,
    pub created_at: String,
}

impl TryFrom<LinkRow> for Link {
    type Error = SanctumError;

    fn try_from(row: LinkRow) -> Result<Self> {
        Ok(Link {
            id: parse_uuid(&row.id, "link")?,
            url: row.url,
            title: row.title,
            is_hide: row.is_hide,
            created_at: parse_timestamp(&row.created_at)?,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_note_row_rejects_bad_uuid() {
        let row = NoteRow {
            id: "not-a-uuid".to_string(),
            content: "x".to_string(),
            is_locked: false,
            is_pinned: false,
            created_at: Utc::now().to_rfc3339(),
            updated_at: Utc::now().to_rfc3339(),
        };
        assert!(Note::try_from(row).is_err());
    }

    #[test]
    fn test_pin_row_rejects_bad_hash() {
        let now = Utc::now().to_rfc3339();
        let row = PinRow {
            user_id: Uuid::new_v4().to_string(),
            pin_hash: "1234".to_string(),
            created_at: now.clone(),
            updated_at: now,
        };
        let err = PinRecord::try_from(row).unwrap_err();
        assert!(err.to_string().contains("Invalid PIN hash"));
    }
}

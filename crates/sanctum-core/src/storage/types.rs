//! Core data types held by the remote stores.

use chrono::{DateTime, Utc};
use secrecy::SecretString;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::crypto::PinHash;

/// The persisted digest of a user's PIN. Zero or one per user.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PinRecord {
    pub user_id: Uuid,
    pub pin_hash: PinHash,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl PinRecord {
    pub fn new(user_id: Uuid, pin_hash: PinHash) -> Self {
        let now = Utc::now();
        Self {
            user_id,
            pin_hash,
            created_at: now,
            updated_at: now,
        }
    }
}

/// A stored credential. `password` is always ciphertext.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Credential {
    pub id: Uuid,
    pub name: String,
    /// Plaintext username; doubles as the password's encryption key
    pub username: String,
    /// Ciphertext produced by [`crate::crypto::encrypt`]
    pub password: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Builder for creating new credentials. The password is still plaintext here.
#[derive(Debug)]
pub struct NewCredential {
    pub name: String,
    pub username: String,
    pub password: SecretString,
}

impl NewCredential {
    pub fn new(
        name: impl Into<String>,
        username: impl Into<String>,
        password: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            username: username.into(),
            password: SecretString::from(password.into()),
        }
    }
}

/// Partial edit of a credential. Unset fields keep their current value.
#[derive(Debug, Default)]
pub struct CredentialUpdate {
    pub name: Option<String>,
    pub username: Option<String>,
    pub password: Option<SecretString>,
}

impl CredentialUpdate {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    pub fn username(mut self, username: impl Into<String>) -> Self {
        self.username = Some(username.into());
        self
    }

    pub fn password(mut self, password: impl Into<String>) -> Self {
        self.password = Some(SecretString::from(password.into()));
        self
    }

    pub fn is_empty(&self) -> bool {
        self.name.is_none() && self.username.is_none() && self.password.is_none()
    }
}

/// A note. Content is plaintext; the flags are access-control metadata.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Note {
    pub id: Uuid,
    pub content: String,
    pub is_locked: bool,
    pub is_pinned: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Note {
    pub fn new(content: impl Into<String>) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            content: content.into(),
            is_locked: false,
            is_pinned: false,
            created_at: now,
            updated_at: now,
        }
    }

    pub fn touch(&mut self) {
        self.updated_at = Utc::now();
    }
}

/// A saved link. `is_hide` only controls listing visibility.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Link {
    pub id: Uuid,
    pub url: String,
    pub title: Option<String>,
    pub is_hide: bool,
    pub created_at: DateTime<Utc>,
}

impl Link {
    pub fn new(url: impl Into<String>, title: Option<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            url: url.into(),
            title,
            is_hide: false,
            created_at: Utc::now(),
        }
    }
}

//! Remote store traits.
//!
//! The stores are external collaborators: a managed backend in production,
//! [`super::MemoryStore`] in tests, [`super::SqliteStore`] for the local CLI.
//! All calls are async; the gate wraps each one in a timeout.

use async_trait::async_trait;
use uuid::Uuid;

use super::types::{Credential, Link, Note, PinRecord};
use crate::crypto::PinHash;
use crate::error::Result;

/// Holder of credential ciphertext and the canonical PIN digest.
#[async_trait]
pub trait SecretStore: Send + Sync {
    /// Fetch the user's PIN record, `None` when no PIN is configured.
    async fn get_pin_record(&self, user_id: &Uuid) -> Result<Option<PinRecord>>;

    /// Insert the user's PIN digest, or replace it if one exists.
    async fn set_pin_hash(&self, user_id: &Uuid, hash: &PinHash) -> Result<()>;

    /// Remove the user's PIN record. Only used by a full data reset.
    async fn clear_pin_hash(&self, user_id: &Uuid) -> Result<()>;

    async fn get_credential(&self, id: &Uuid) -> Result<Option<Credential>>;

    /// Insert or replace a credential.
    async fn put_credential(&self, credential: &Credential) -> Result<()>;

    /// Delete a credential, returning whether it existed.
    async fn delete_credential(&self, id: &Uuid) -> Result<bool>;

    /// List credentials ordered by name.
    async fn list_credentials(&self) -> Result<Vec<Credential>>;

    /// Delete every credential. Only used by a full data reset.
    async fn clear_credentials(&self) -> Result<()>;

    /// Fetch just the digest.
    async fn get_pin_hash(&self, user_id: &Uuid) -> Result<Option<PinHash>> {
        Ok(self
            .get_pin_record(user_id)
            .await?
            .map(|record| record.pin_hash))
    }
}

/// Holder of notes and links (the protected records).
#[async_trait]
pub trait RecordStore: Send + Sync {
    async fn get_note(&self, id: &Uuid) -> Result<Option<Note>>;

    /// Insert or replace a note.
    async fn put_note(&self, note: &Note) -> Result<()>;

    async fn delete_note(&self, id: &Uuid) -> Result<bool>;

    /// List notes, pinned first, then newest first.
    async fn list_notes(&self) -> Result<Vec<Note>>;

    async fn get_link(&self, id: &Uuid) -> Result<Option<Link>>;

    /// Insert or replace a link.
    async fn put_link(&self, link: &Link) -> Result<()>;

    async fn delete_link(&self, id: &Uuid) -> Result<bool>;

    /// List all links, hidden ones included, newest first.
    async fn list_links(&self) -> Result<Vec<Link>>;

    /// Delete every note and link.
    async fn clear_records(&self) -> Result<()>;
}

/// A backend holding both secrets and records, as the gate needs.
#[async_trait]
pub trait VaultStore: SecretStore + RecordStore {
    /// Delete every credential, note and link, then the user's PIN record.
    ///
    /// The default runs the clears one after another, so a failure part way
    /// leaves some tables emptied and others intact. The PIN record goes last
    /// and survives any such failure. Backends that can clear everything
    /// atomically should override this.
    async fn wipe(&self, user_id: &Uuid) -> Result<()> {
        self.clear_credentials().await?;
        self.clear_records().await?;
        self.clear_pin_hash(user_id).await
    }
}

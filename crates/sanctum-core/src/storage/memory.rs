//! In-memory store.
//!
//! Stands in for the managed backend in tests and ephemeral sessions. Latency
//! and outages can be injected to exercise the gate's failure paths.

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Mutex, MutexGuard};
use std::time::Duration;

use async_trait::async_trait;
use chrono::Utc;
use uuid::Uuid;

use super::traits::{RecordStore, SecretStore, VaultStore};
use super::types::{Credential, Link, Note, PinRecord};
use crate::crypto::PinHash;
use crate::error::{Result, SanctumError};

#[derive(Default)]
struct Tables {
    pins: HashMap<Uuid, PinRecord>,
    credentials: HashMap<Uuid, Credential>,
    notes: HashMap<Uuid, Note>,
    links: HashMap<Uuid, Link>,
}

/// Store backed by process memory.
#[derive(Default)]
pub struct MemoryStore {
    tables: Mutex<Tables>,
    offline: AtomicBool,
    latency: Mutex<Option<Duration>>,
    pin_reads: AtomicUsize,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make every subsequent call fail with `RemoteUnavailable`.
    pub fn set_offline(&self, offline: bool) {
        self.offline.store(offline, Ordering::SeqCst);
    }

    /// Delay every subsequent call by `latency`.
    pub fn set_latency(&self, latency: Option<Duration>) {
        if let Ok(mut guard) = self.latency.lock() {
            *guard = latency;
        }
    }

    /// Number of PIN record reads served so far.
    pub fn pin_reads(&self) -> usize {
        self.pin_reads.load(Ordering::SeqCst)
    }

    fn lock_tables(&self) -> Result<MutexGuard<'_, Tables>> {
        self.tables
            .lock()
            .map_err(|_| SanctumError::Storage("Memory store poisoned".to_string()))
    }

    async fn simulate_remote(&self) -> Result<()> {
        let latency = self.latency.lock().ok().and_then(|guard| *guard);
        if let Some(latency) = latency {
            tokio::time::sleep(latency).await;
        }
        if self.offline.load(Ordering::SeqCst) {
            return Err(SanctumError::RemoteUnavailable(
                "memory store is offline".to_string(),
            ));
        }
        Ok(())
    }
}

#[async_trait]
impl SecretStore for MemoryStore {
    async fn get_pin_record(&self, user_id: &Uuid) -> Result<Option<PinRecord>> {
        self.simulate_remote().await?;
        self.pin_reads.fetch_add(1, Ordering::SeqCst);
        Ok(self.lock_tables()?.pins.get(user_id).cloned())
    }

    async fn set_pin_hash(&self, user_id: &Uuid, hash: &PinHash) -> Result<()> {
        self.simulate_remote().await?;
        let mut tables = self.lock_tables()?;
        match tables.pins.get_mut(user_id) {
            Some(record) => {
                record.pin_hash = hash.clone();
                record.updated_at = Utc::now();
            }
            None => {
                tables
                    .pins
                    .insert(*user_id, PinRecord::new(*user_id, hash.clone()));
            }
        }
        Ok(())
    }

    async fn clear_pin_hash(&self, user_id: &Uuid) -> Result<()> {
        self.simulate_remote().await?;
        self.lock_tables()?.pins.remove(user_id);
        Ok(())
    }

    async fn get_credential(&self, id: &Uuid) -> Result<Option<Credential>> {
        self.simulate_remote().await?;
        Ok(self.lock_tables()?.credentials.get(id).cloned())
    }

    async fn put_credential(&self, credential: &Credential) -> Result<()> {
        self.simulate_remote().await?;
        self.lock_tables()?
            .credentials
            .insert(credential.id, credential.clone());
        Ok(())
    }

    async fn delete_credential(&self, id: &Uuid) -> Result<bool> {
        self.simulate_remote().await?;
        Ok(self.lock_tables()?.credentials.remove(id).is_some())
    }

    async fn list_credentials(&self) -> Result<Vec<Credential>> {
        self.simulate_remote().await?;
        let mut credentials: Vec<Credential> =
            self.lock_tables()?.credentials.values().cloned().collect();
        credentials.sort_by(|a, b| a.name.cmp(&b.name).then(a.id.cmp(&b.id)));
        Ok(credentials)
    }

    async fn clear_credentials(&self) -> Result<()> {
        self.simulate_remote().await?;
        self.lock_tables()?.credentials.clear();
        Ok(())
    }
}

#[async_trait]
impl RecordStore for MemoryStore {
    async fn get_note(&self, id: &Uuid) -> Result<Option<Note>> {
        self.simulate_remote().await?;
        Ok(self.lock_tables()?.notes.get(id).cloned())
    }

    async fn put_note(&self, note: &Note) -> Result<()> {
        self.simulate_remote().await?;
        self.lock_tables()?.notes.insert(note.id, note.clone());
        Ok(())
    }

    async fn delete_note(&self, id: &Uuid) -> Result<bool> {
        self.simulate_remote().await?;
        Ok(self.lock_tables()?.notes.remove(id).is_some())
    }

    async fn list_notes(&self) -> Result<Vec<Note>> {
        self.simulate_remote().await?;
        let mut notes: Vec<Note> = self.lock_tables()?.notes.values().cloned().collect();
        notes.sort_by(|a, b| {
            b.is_pinned
                .cmp(&a.is_pinned)
                .then(b.created_at.cmp(&a.created_at))
        });
        Ok(notes)
    }

    async fn get_link(&self, id: &Uuid) -> Result<Option<Link>> {
        self.simulate_remote().await?;
        Ok(self.lock_tables()?.links.get(id).cloned())
    }

    async fn put_link(&self, link: &Link) -> Result<()> {
        self.simulate_remote().await?;
        self.lock_tables()?.links.insert(link.id, link.clone());
        Ok(())
    }

    async fn delete_link(&self, id: &Uuid) -> Result<bool> {
        self.simulate_remote().await?;
        Ok(self.lock_tables()?.links.remove(id).is_some())
    }

    async fn list_links(&self) -> Result<Vec<Link>> {
        self.simulate_remote().await?;
        let mut links: Vec<Link> = self.lock_tables()?.links.values().cloned().collect();
        links.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(links)
    }

    async fn clear_records(&self) -> Result<()> {
        self.simulate_remote().await?;
        let mut tables = self.lock_tables()?;
        tables.notes.clear();
        tables.links.clear();
        Ok(())
    }
}

#[async_trait]
impl VaultStore for MemoryStore {
    async fn wipe(&self, user_id: &Uuid) -> Result<()> {
        self.simulate_remote().await?;
        let mut tables = self.lock_tables()?;
        tables.credentials.clear();
        tables.notes.clear();
        tables.links.clear();
        tables.pins.remove(user_id);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::crypto::hash_pin;

    #[tokio::test]
    async fn test_pin_hash_insert_then_update() {
        let store = MemoryStore::new();
        let user = Uuid::new_v4();
        assert!(store.get_pin_hash(&user).await.unwrap().is_none());

        store.set_pin_hash(&user, &hash_pin("1111")).await.unwrap();
        let created = store.get_pin_record(&user).await.unwrap().unwrap();

        store.set_pin_hash(&user, &hash_pin("2222")).await.unwrap();
        let updated = store.get_pin_record(&user).await.unwrap().unwrap();

        assert_eq!(updated.pin_hash, hash_pin("2222"));
        assert_eq!(updated.created_at, created.created_at);
        assert_eq!(store.pin_reads(), 3);
    }

    #[tokio::test]
    async fn test_offline_store_fails_calls() {
        let store = MemoryStore::new();
        store.set_offline(true);
        let result = store.list_notes().await;
        assert!(matches!(result, Err(SanctumError::RemoteUnavailable(_))));

        store.set_offline(false);
        assert!(store.list_notes().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_notes_listed_pinned_first() {
        let store = MemoryStore::new();
        let plain = Note::new("plain");
        let mut pinned = Note::new("pinned");
        pinned.is_pinned = true;
        store.put_note(&plain).await.unwrap();
        store.put_note(&pinned).await.unwrap();

        let notes = store.list_notes().await.unwrap();
        assert_eq!(notes[0].id, pinned.id);
        assert_eq!(notes[1].id, plain.id);
    }

    #[tokio::test]
    async fn test_clear_records_keeps_pin() {
        let store = MemoryStore::new();
        let user = Uuid::new_v4();
        store.set_pin_hash(&user, &hash_pin("1234")).await.unwrap();
        store.put_note(&Note::new("a")).await.unwrap();
        store.put_link(&Link::new("https://example.com", None)).await.unwrap();

        store.clear_records().await.unwrap();

        assert!(store.list_notes().await.unwrap().is_empty());
        assert!(store.list_links().await.unwrap().is_empty());
        assert!(store.get_pin_hash(&user).await.unwrap().is_some());
    }
}

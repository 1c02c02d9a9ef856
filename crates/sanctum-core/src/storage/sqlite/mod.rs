//! SQLite store.
//!
//! Plays the managed backend for the local CLI: one database file holding
//! the PIN record, credential ciphertext, notes and links.

mod row;

use std::path::Path;
use std::sync::{Mutex, MutexGuard};

use async_trait::async_trait;
use chrono::Utc;
use rusqlite::{params, Connection, OptionalExtension};
use uuid::Uuid;

use super::traits::{RecordStore, SecretStore, VaultStore};
use super::types::{Credential, Link, Note, PinRecord};
use crate::crypto::PinHash;
use crate::error::{Result, SanctumError};

use row::{CredentialRow, LinkRow, NoteRow, PinRow};

const SCHEMA: &str = r#"
    CREATE TABLE IF NOT EXISTS pin_records (
        user_id TEXT PRIMARY KEY,
        pin_hash TEXT NOT NULL,
        created_at TEXT NOT NULL,
        updated_at TEXT NOT NULL
    );

    CREATE TABLE IF NOT EXISTS credentials (
        id TEXT PRIMARY KEY,
        name TEXT NOT NULL,
        username TEXT NOT NULL,
        password TEXT NOT NULL,
        created_at TEXT NOT NULL,
        updated_at TEXT NOT NULL
    );

    CREATE TABLE IF NOT EXISTS notes (
        id TEXT PRIMARY KEY,
        content TEXT NOT NULL,
        is_locked INTEGER NOT NULL DEFAULT 0,
        is_pinned INTEGER NOT NULL DEFAULT 0,
        created_at TEXT NOT NULL,
        updated_at TEXT NOT NULL
    );

    CREATE TABLE IF NOT EXISTS links (
        id TEXT PRIMARY KEY,
        url TEXT NOT NULL,
        title TEXT,
        is_hide INTEGER NOT NULL DEFAULT 0,
        created_at TEXT NOT NULL
    );
"#;

/// Store backed by a SQLite database.
pub struct SqliteStore {
    conn: Mutex<Connection>,
}

impl SqliteStore {
    /// Open (or create) the database at `path` and ensure the schema exists.
    pub fn open(path: &Path) -> Result<Self> {
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }
        Self::init(Connection::open(path)?)
    }

    /// Open a private in-memory database.
    pub fn open_in_memory() -> Result<Self> {
        Self::init(Connection::open_in_memory()?)
    }

    fn init(conn: Connection) -> Result<Self> {
        conn.execute_batch(SCHEMA)?;
        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    /// Lock the database connection, returning an error if the mutex is poisoned.
    fn lock_conn(&self) -> Result<MutexGuard<'_, Connection>> {
        self.conn
            .lock()
            .map_err(|_| SanctumError::Storage("SQLite connection poisoned".to_string()))
    }

    fn delete_by_id(&self, table: &str, id: &Uuid) -> Result<bool> {
        let conn = self.lock_conn()?;
        let removed = conn.execute(
            &format!("DELETE FROM {} WHERE id = ?1", table),
            params![id.to_string()],
        )?;
        Ok(removed > 0)
    }
}

fn note_from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<NoteRow> {
    Ok(NoteRow {
        id: row.get(0)?,
        content: row.get(1)?,
        is_locked: row.get(2)?,
        is_pinned: row.get(3)?,
        created_at: row.get(4)?,
        updated_at: row.get(5)?,
    })
}

fn credential_from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<CredentialRow> {
    Ok(CredentialRow {
        id: row.get(0)?,
        name: row.get(1)?,
        username: row.get(2)?,
        password: row.get(3)?,
        created_at: row.get(4)?,
        updated_at: row.get(5)?,
    })
}

fn link_from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<LinkRow> {
    Ok(LinkRow {
        id: row.get(0)?,
        url: row.get(1)?,
        title: row.get(2)?,
        is_hide: row.get(3)?,
        created_at: row.get(4)?,
    })
}

#[async_trait]
impl SecretStore for SqliteStore {
    async fn get_pin_record(&self, user_id: &Uuid) -> Result<Option<PinRecord>> {
        let conn = self.lock_conn()?;
        let row = conn
            .query_row(
                "SELECT user_id, pin_hash, created_at, updated_at FROM pin_records WHERE user_id = ?1",
                params![user_id.to_string()],
                |row| {
                    Ok(PinRow {
                        user_id: row.get(0)?,
                        pin_hash: row.get(1)?,
                        created_at: row.get(2)?,
                        updated_at: row.get(3)?,
                    })
                },
            )
            .optional()?;
        row.map(PinRecord::try_from).transpose()
    }

    async fn set_pin_hash(&self, user_id: &Uuid, hash: &PinHash) -> Result<()> {
        let now = Utc::now().to_rfc3339();
        let conn = self.lock_conn()?;
        conn.execute(
            "INSERT INTO pin_records (user_id, pin_hash, created_at, updated_at)
             VALUES (?1, ?2, ?3, ?3)
             ON CONFLICT(user_id) DO UPDATE SET pin_hash = excluded.pin_hash, updated_at = excluded.updated_at",
            params![user_id.to_string(), hash.as_str(), now],
        )?;
        Ok(())
    }

    async fn clear_pin_hash(&self, user_id: &Uuid) -> Result<()> {
        let conn = self.lock_conn()?;
        conn.execute(
            "DELETE FROM pin_records WHERE user_id = ?1",
            params![user_id.to_string()],
        )?;
        Ok(())
    }

    async fn get_credential(&self, id: &Uuid) -> Result<Option<Credential>> {
        let conn = self.lock_conn()?;
        let row = conn
            .query_row(
                "SELECT id, name, username, password, created_at, updated_at FROM credentials WHERE id = ?1",
                params![id.to_string()],
                credential_from_row,
            )
            .optional()?;
        row.map(Credential::try_from).transpose()
    }

    async fn put_credential(&self, credential: &Credential) -> Result<()> {
        let conn = self.lock_conn()?;
        conn.execute(
            "INSERT OR REPLACE INTO credentials (id, name, username, password, created_at, updated_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
            params![
                credential.id.to_string(),
                credential.name,
                credential.username,
                credential.password,
                credential.created_at.to_rfc3339(),
                credential.updated_at.to_rfc3339(),
            ],
        )?;
        Ok(())
    }

    async fn delete_credential(&self, id: &Uuid) -> Result<bool> {
        self.delete_by_id("credentials", id)
    }

    async fn list_credentials(&self) -> Result<Vec<Credential>> {
        let conn = self.lock_conn()?;
        let mut stmt = conn.prepare(
            "SELECT id, name, username, password, created_at, updated_at FROM credentials
             ORDER BY name COLLATE NOCASE, id",
        )?;
        let rows = stmt
            .query_map([], credential_from_row)?
            .collect::<rusqlite::Result<Vec<_>>>()?;
        rows.into_iter().map(Credential::try_from).collect()
    }

    async fn clear_credentials(&self) -> Result<()> {
        let conn = self.lock_conn()?;
        conn.execute("DELETE FROM credentials", [])?;
        Ok(())
    }
}

#[async_trait]
impl RecordStore for SqliteStore {
    async fn get_note(&self, id: &Uuid) -> Result<Option<Note>> {
        let conn = self.lock_conn()?;
        let row = conn
            .query_row(
                "SELECT id, content, is_locked, is_pinned, created_at, updated_at FROM notes WHERE id = ?1",
                params![id.to_string()],
                note_from_row,
            )
            .optional()?;
        row.map(Note::try_from).transpose()
    }

    async fn put_note(&self, note: &Note) -> Result<()> {
        let conn = self.lock_conn()?;
        conn.execute(
            "INSERT OR REPLACE INTO notes (id, content, is_locked, is_pinned, created_at, updated_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
            params![
                note.id.to_string(),
                note.content,
                note.is_locked,
                note.is_pinned,
                note.created_at.to_rfc3339(),
                note.updated_at.to_rfc3339(),
            ],
        )?;
        Ok(())
    }

    async fn delete_note(&self, id: &Uuid) -> Result<bool> {
        self.delete_by_id("notes", id)
    }

    async fn list_notes(&self) -> Result<Vec<Note>> {
        let conn = self.lock_conn()?;
        let mut stmt = conn.prepare(
            "SELECT id, content, is_locked, is_pinned, created_at, updated_at FROM notes
             ORDER BY is_pinned DESC, created_at DESC",
        )?;
        let rows = stmt
            .query_map([], note_from_row)?
            .collect::<rusqlite::Result<Vec<_>>>()?;
        rows.into_iter().map(Note::try_from).collect()
    }

    async fn get_link(&self, id: &Uuid) -> Result<Option<Link>> {
        let conn = self.lock_conn()?;
        let row = conn
            .query_row(
                "SELECT id, url, title, is_hide, created_at FROM links WHERE id = ?1",
                params![id.to_string()],
                link_from_row,
            )
            .optional()?;
        row.map(Link::try_from).transpose()
    }

    async fn put_link(&self, link: &Link) -> Result<()> {
        let conn = self.lock_conn()?;
        conn.execute(
            "INSERT OR REPLACE INTO links (id, url, title, is_hide, created_at)
             VALUES (?1, ?2, ?3, ?4, ?5)",
            params![
                link.id.to_string(),
                link.url,
                link.title,
                link.is_hide,
                link.created_at.to_rfc3339(),
            ],
        )?;
        Ok(())
    }

    async fn delete_link(&self, id: &Uuid) -> Result<bool> {
        self.delete_by_id("links", id)
    }

    async fn list_links(&self) -> Result<Vec<Link>> {
        let conn = self.lock_conn()?;
        let mut stmt = conn.prepare(
            "SELECT id, url, title, is_hide, created_at FROM links ORDER BY created_at DESC",
        )?;
        let rows = stmt
            .query_map([], link_from_row)?
            .collect::<rusqlite::Result<Vec<_>>>()?;
        rows.into_iter().map(Link::try_from).collect()
    }

    async fn clear_records(&self) -> Result<()> {
        let conn = self.lock_conn()?;
        conn.execute_batch("DELETE FROM notes; DELETE FROM links;")?;
        Ok(())
    }
}

#[async_trait]
impl VaultStore for SqliteStore {
    async fn wipe(&self, user_id: &Uuid) -> Result<()> {
        let mut conn = self.lock_conn()?;
        let tx = conn.transaction()?;
        tx.execute_batch("DELETE FROM credentials; DELETE FROM notes; DELETE FROM links;")?;
        tx.execute(
            "DELETE FROM pin_records WHERE user_id = ?1",
            params![user_id.to_string()],
        )?;
        tx.commit()?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::crypto::hash_pin;

    #[tokio::test]
    async fn test_pin_upsert_keeps_created_at() {
        let store = SqliteStore::open_in_memory().unwrap();
        let user = Uuid::new_v4();

        store.set_pin_hash(&user, &hash_pin("1111")).await.unwrap();
        let first = store.get_pin_record(&user).await.unwrap().unwrap();
        store.set_pin_hash(&user, &hash_pin("2222")).await.unwrap();
        let second = store.get_pin_record(&user).await.unwrap().unwrap();

        assert_eq!(second.pin_hash, hash_pin("2222"));
        assert_eq!(first.created_at, second.created_at);

        store.clear_pin_hash(&user).await.unwrap();
        assert!(store.get_pin_hash(&user).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_note_flags_round_trip() {
        let store = SqliteStore::open_in_memory().unwrap();
        let mut note = Note::new("diary");
        note.is_locked = true;
        store.put_note(&note).await.unwrap();

        let loaded = store.get_note(&note.id).await.unwrap().unwrap();
        assert!(loaded.is_locked);
        assert!(!loaded.is_pinned);
        assert_eq!(loaded.content, "diary");

        assert!(store.delete_note(&note.id).await.unwrap());
        assert!(!store.delete_note(&note.id).await.unwrap());
    }

    #[tokio::test]
    async fn test_links_keep_hidden_flag() {
        let store = SqliteStore::open_in_memory().unwrap();
        let mut link = Link::new("https://example.com", Some("Example".to_string()));
        link.is_hide = true;
        store.put_link(&link).await.unwrap();

        let links = store.list_links().await.unwrap();
        assert_eq!(links.len(), 1);
        assert!(links[0].is_hide);
        assert_eq!(links[0].title.as_deref(), Some("Example"));
    }

    #[tokio::test]
    async fn test_wipe_clears_tables_and_only_that_users_pin() {
        let store = SqliteStore::open_in_memory().unwrap();
        let user = Uuid::new_v4();
        let other = Uuid::new_v4();
        store.set_pin_hash(&user, &hash_pin("1234")).await.unwrap();
        store.set_pin_hash(&other, &hash_pin("9876")).await.unwrap();
        store.put_note(&Note::new("diary")).await.unwrap();
        store
            .put_link(&Link::new("https://example.com", None))
            .await
            .unwrap();

        store.wipe(&user).await.unwrap();

        assert!(store.get_pin_hash(&user).await.unwrap().is_none());
        assert!(store.get_pin_hash(&other).await.unwrap().is_some());
        assert!(store.list_notes().await.unwrap().is_empty());
        assert!(store.list_links().await.unwrap().is_empty());
        assert!(store.list_credentials().await.unwrap().is_empty());
    }
}

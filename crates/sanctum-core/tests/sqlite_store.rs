use std::fs;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::{Duration, SystemTime, UNIX_EPOCH};

use secrecy::{ExposeSecret, SecretString};
use uuid::Uuid;

use sanctum_core::cache::{FileCache, LocalCache};
use sanctum_core::crypto::hash_pin;
use sanctum_core::storage::{Link, NewCredential, Note, SqliteStore};
use sanctum_core::{
    AccessGate, ActionOutcome, GateConfig, GateStep, GuardedAction, PinCache, RecordStore,
    SanctumError, SecretStore,
};

const TIMEOUT: Duration = Duration::from_secs(5);

struct TempDir {
    path: PathBuf,
}

impl TempDir {
    fn new(prefix: &str) -> Self {
        let nanos = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .expect("system time should be available")
            .as_nanos();
        let dirname = format!("{}_{}_{}", prefix, std::process::id(), nanos);
        let path = std::env::temp_dir().join(dirname);
        fs::create_dir_all(&path).expect("temp dir should be created");
        Self { path }
    }

    fn store_path(&self) -> PathBuf {
        self.path.join("sanctum.db")
    }

    fn cache_path(&self) -> PathBuf {
        self.path.join("cache.json")
    }
}

impl Drop for TempDir {
    fn drop(&mut self) {
        let _ = fs::remove_dir_all(&self.path);
    }
}

async fn open_gate(temp: &TempDir, user: Uuid) -> AccessGate<SqliteStore, FileCache> {
    let store = Arc::new(SqliteStore::open(&temp.store_path()).expect("open should succeed"));
    let pins = PinCache::bootstrap(FileCache::open(&temp.cache_path()), store.as_ref(), user, TIMEOUT)
        .await
        .expect("bootstrap should succeed");
    AccessGate::new(store, pins, GateConfig::new().max_attempts(3))
}

#[tokio::test]
async fn test_records_survive_reopen() {
    let temp = TempDir::new("sanctum_sqlite_reopen");
    let user = Uuid::new_v4();
    let note = Note::new("meeting notes");
    let link = Link::new("https://example.org", Some("Example".to_string()));

    {
        let store = SqliteStore::open(&temp.store_path()).expect("open should succeed");
        store
            .set_pin_hash(&user, &hash_pin("2468"))
            .await
            .expect("set_pin_hash should succeed");
        store.put_note(&note).await.expect("put_note should succeed");
        store.put_link(&link).await.expect("put_link should succeed");
    }

    let store = SqliteStore::open(&temp.store_path()).expect("reopen should succeed");
    assert_eq!(
        store.get_pin_hash(&user).await.expect("get should succeed"),
        Some(hash_pin("2468"))
    );
    let notes = store.list_notes().await.expect("list_notes should succeed");
    assert_eq!(notes.len(), 1);
    assert_eq!(notes[0].content, "meeting notes");
    let links = store.list_links().await.expect("list_links should succeed");
    assert_eq!(links[0].title.as_deref(), Some("Example"));
}

#[tokio::test]
async fn test_gate_session_persists_pin_and_credentials() {
    let temp = TempDir::new("sanctum_sqlite_gate");
    let user = Uuid::new_v4();

    let credential_id = {
        let mut gate = open_gate(&temp, user).await;
        gate.request(GuardedAction::SetupPin)
            .await
            .expect("request should succeed");
        gate.submit("1357").await.expect("setup should succeed");

        match gate
            .request(GuardedAction::AddCredential(NewCredential::new(
                "forum", "carol", "s3cret",
            )))
            .await
            .expect("add should succeed")
        {
            GateStep::Completed(ActionOutcome::CredentialAdded(credential)) => credential.id,
            other => panic!("unexpected step: {:?}", other),
        }
    };

    // The next session loads the digest from the local cache file
    let cache = FileCache::open(&temp.cache_path());
    assert!(cache.get(&format!("pin_hash:{}", user)).is_some());

    let mut gate = open_gate(&temp, user).await;
    assert!(gate.is_pin_configured());
    gate.request(GuardedAction::ViewCredential { id: credential_id })
        .await
        .expect("request should succeed");
    match gate.submit("1357").await.expect("view should succeed") {
        ActionOutcome::CredentialRevealed { password, .. } => {
            assert_eq!(password.expose_secret(), "s3cret")
        }
        other => panic!("unexpected outcome: {:?}", other),
    }
}

#[tokio::test]
async fn test_change_pin_persists() {
    let temp = TempDir::new("sanctum_sqlite_change_pin");
    let user = Uuid::new_v4();

    {
        let mut gate = open_gate(&temp, user).await;
        gate.request(GuardedAction::SetupPin)
            .await
            .expect("request should succeed");
        gate.submit("1111").await.expect("setup should succeed");

        gate.request(GuardedAction::ChangePin {
            new_pin: SecretString::from("2222".to_string()),
        })
        .await
        .expect("request should succeed");
        gate.submit("1111").await.expect("change should succeed");
    }

    let store = SqliteStore::open(&temp.store_path()).expect("reopen should succeed");
    let record = store
        .get_pin_record(&user)
        .await
        .expect("get should succeed")
        .expect("record should exist");
    assert_eq!(record.pin_hash, hash_pin("2222"));
}

#[tokio::test]
async fn test_lockout_carries_over_to_next_session() {
    let temp = TempDir::new("sanctum_sqlite_lockout");
    let user = Uuid::new_v4();
    let mut note = Note::new("locked away");
    note.is_locked = true;
    {
        let store = SqliteStore::open(&temp.store_path()).expect("open should succeed");
        store
            .set_pin_hash(&user, &hash_pin("7391"))
            .await
            .expect("set_pin_hash should succeed");
        store.put_note(&note).await.expect("put_note should succeed");
    }

    // One wrong PIN per session, the way separate CLI runs would try
    for guess in ["0000", "1111"] {
        let mut gate = open_gate(&temp, user).await;
        gate.request(GuardedAction::UnlockNote { id: note.id })
            .await
            .expect("request should succeed");
        assert!(matches!(
            gate.submit(guess).await,
            Err(SanctumError::PinMismatch { .. })
        ));
    }

    let mut gate = open_gate(&temp, user).await;
    assert_eq!(gate.failed_attempts(), 2);
    gate.request(GuardedAction::UnlockNote { id: note.id })
        .await
        .expect("request should succeed");
    assert!(matches!(
        gate.submit("2222").await,
        Err(SanctumError::TooManyAttempts)
    ));

    let mut gate = open_gate(&temp, user).await;
    assert!(gate.locked_until().is_some());
    let result = gate.request(GuardedAction::UnlockNote { id: note.id }).await;
    assert!(matches!(result, Err(SanctumError::TooManyAttempts)));

    let store = SqliteStore::open(&temp.store_path()).expect("reopen should succeed");
    let stored = store
        .get_note(&note.id)
        .await
        .expect("get_note should succeed")
        .expect("note should exist");
    assert!(stored.is_locked);
}

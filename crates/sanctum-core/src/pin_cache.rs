//! Session mirror of the canonical PIN hash.
//!
//! The remote store is authoritative; the local copy only saves a round trip
//! and covers a store outage. A `PinCache` can only be obtained through
//! [`PinCache::bootstrap`], so any gate holding one has settled whether a PIN
//! exists before it verifies.
//!
//! The cache also keeps the count of consecutive wrong PINs and the lockout
//! deadline, persisted locally so they outlive a single gate.

use std::time::Duration;

use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::cache::LocalCache;
use crate::crypto::PinHash;
use crate::error::Result;
use crate::storage::{within, SecretStore};

fn cache_key(user_id: &Uuid) -> String {
    format!("pin_hash:{}", user_id)
}

fn failures_key(user_id: &Uuid) -> String {
    format!("pin_failures:{}", user_id)
}

fn locked_until_key(user_id: &Uuid) -> String {
    format!("pin_locked_until:{}", user_id)
}

/// Local mirror of a user's PIN digest and attempt counter.
pub struct PinCache<L: LocalCache> {
    local: L,
    user_id: Uuid,
    hash: Option<PinHash>,
    failures: u32,
    locked_until: Option<DateTime<Utc>>,
}

impl<L: LocalCache> PinCache<L> {
    /// Settle the PIN state for `user_id`.
    ///
    /// Reads the local cache first. When it holds nothing usable, fetches from
    /// the store and writes a found hash through to the local cache.
    ///
    /// # Errors
    ///
    /// Returns `SanctumError::RemoteUnavailable` when the local cache is empty
    /// and the store cannot be reached in time.
    pub async fn bootstrap<S>(local: L, store: &S, user_id: Uuid, timeout: Duration) -> Result<Self>
    where
        S: SecretStore + ?Sized,
    {
        let mut cache = Self {
            local,
            user_id,
            hash: None,
            failures: 0,
            locked_until: None,
        };
        cache.load_attempts();

        let key = cache_key(&user_id);
        if let Some(raw) = cache.local.get(&key) {
            match PinHash::from_hex(&raw) {
                Ok(hash) => {
                    tracing::debug!(%user_id, "PIN hash loaded from local cache");
                    cache.hash = Some(hash);
                    return Ok(cache);
                }
                Err(_) => {
                    tracing::warn!(%user_id, "discarding malformed cached PIN hash");
                    cache.remove_local(&key);
                }
            }
        }

        cache.refresh(store, timeout).await?;
        Ok(cache)
    }

    pub fn user_id(&self) -> &Uuid {
        &self.user_id
    }

    pub fn is_configured(&self) -> bool {
        self.hash.is_some()
    }

    pub fn current_hash(&self) -> Option<&PinHash> {
        self.hash.as_ref()
    }

    /// Re-fetch the authoritative hash and reconcile the local copy.
    ///
    /// A failed fetch leaves the cached hash untouched.
    pub async fn refresh<S>(&mut self, store: &S, timeout: Duration) -> Result<Option<&PinHash>>
    where
        S: SecretStore + ?Sized,
    {
        let remote = within(timeout, "get_pin_hash", store.get_pin_hash(&self.user_id)).await?;
        let key = cache_key(&self.user_id);
        match remote {
            Some(hash) => {
                if self.hash.as_ref() != Some(&hash) {
                    tracing::debug!(user_id = %self.user_id, "PIN hash refreshed from store");
                    self.write_local(&key, hash.as_str());
                }
                self.hash = Some(hash);
            }
            None => {
                if self.hash.is_some() {
                    tracing::warn!(user_id = %self.user_id, "PIN record no longer exists in store");
                }
                self.remove_local(&key);
                self.hash = None;
            }
        }
        Ok(self.hash.as_ref())
    }

    /// Record a hash that was just written to the store.
    pub fn remember(&mut self, hash: PinHash) {
        let key = cache_key(&self.user_id);
        self.write_local(&key, hash.as_str());
        self.hash = Some(hash);
        self.clear_failures();
    }

    /// Drop the hash and attempt state locally, after a full data reset.
    pub fn forget(&mut self) {
        let key = cache_key(&self.user_id);
        self.remove_local(&key);
        self.hash = None;
        self.clear_failures();
    }

    /// Consecutive wrong PINs since the last success or lockout.
    pub fn failed_attempts(&self) -> u32 {
        self.failures
    }

    pub fn locked_until(&self) -> Option<DateTime<Utc>> {
        self.locked_until
    }

    pub fn is_locked_out(&self, now: DateTime<Utc>) -> bool {
        self.locked_until.is_some_and(|until| now < until)
    }

    /// Count one more wrong PIN and return the new total.
    pub fn record_failure(&mut self) -> u32 {
        self.failures = self.failures.saturating_add(1);
        let key = failures_key(&self.user_id);
        self.write_local(&key, &self.failures.to_string());
        self.failures
    }

    /// Refuse verification until `until`. The failure count starts over.
    pub fn lock_out(&mut self, until: DateTime<Utc>) {
        self.failures = 0;
        self.locked_until = Some(until);
        let key = failures_key(&self.user_id);
        self.remove_local(&key);
        let key = locked_until_key(&self.user_id);
        self.write_local(&key, &until.to_rfc3339());
    }

    /// Reset the counter after a correct PIN.
    pub fn clear_failures(&mut self) {
        if self.failures == 0 && self.locked_until.is_none() {
            return;
        }
        self.failures = 0;
        self.locked_until = None;
        let key = failures_key(&self.user_id);
        self.remove_local(&key);
        let key = locked_until_key(&self.user_id);
        self.remove_local(&key);
    }

    fn load_attempts(&mut self) {
        if let Some(raw) = self.local.get(&failures_key(&self.user_id)) {
            match raw.parse::<u32>() {
                Ok(failures) => self.failures = failures,
                Err(_) => tracing::warn!(user_id = %self.user_id, "ignoring malformed PIN failure count"),
            }
        }
        if let Some(raw) = self.local.get(&locked_until_key(&self.user_id)) {
            match DateTime::parse_from_rfc3339(&raw) {
                Ok(until) => self.locked_until = Some(until.with_timezone(&Utc)),
                Err(_) => tracing::warn!(user_id = %self.user_id, "ignoring malformed PIN lockout"),
            }
        }
    }

    // A failed local write leaves the store authoritative; log and carry on.
    fn write_local(&mut self, key: &str, value: &str) {
        if let Err(err) = self.local.set(key, value) {
            tracing::warn!(key, error = %err, "failed to write local PIN cache");
        }
    }

    fn remove_local(&mut self, key: &str) {
        if let Err(err) = self.local.remove(key) {
            tracing::warn!(key, error = %err, "failed to remove local PIN cache entry");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cache::MemoryCache;
    use crate::crypto::hash_pin;
    use crate::error::SanctumError;
    use crate::storage::MemoryStore;

    const TIMEOUT: Duration = Duration::from_secs(5);

    #[tokio::test]
    async fn test_bootstrap_without_pin() {
        let store = MemoryStore::new();
        let cache = PinCache::bootstrap(MemoryCache::new(), &store, Uuid::new_v4(), TIMEOUT)
            .await
            .unwrap();
        assert!(!cache.is_configured());
        assert!(cache.current_hash().is_none());
    }

    #[tokio::test]
    async fn test_bootstrap_writes_remote_hash_through() {
        let store = MemoryStore::new();
        let user = Uuid::new_v4();
        store.set_pin_hash(&user, &hash_pin("1234")).await.unwrap();

        let cache = PinCache::bootstrap(MemoryCache::new(), &store, user, TIMEOUT)
            .await
            .unwrap();

        assert_eq!(cache.current_hash(), Some(&hash_pin("1234")));
        assert_eq!(
            cache.local.get(&cache_key(&user)).as_deref(),
            Some(hash_pin("1234").as_str())
        );
    }

    #[tokio::test]
    async fn test_bootstrap_prefers_local_copy() {
        let store = MemoryStore::new();
        let user = Uuid::new_v4();
        let mut local = MemoryCache::new();
        local
            .set(&cache_key(&user), hash_pin("5555").as_str())
            .unwrap();

        let cache = PinCache::bootstrap(local, &store, user, TIMEOUT).await.unwrap();

        assert_eq!(cache.current_hash(), Some(&hash_pin("5555")));
        assert_eq!(store.pin_reads(), 0);
    }

    #[tokio::test]
    async fn test_bootstrap_replaces_malformed_local_copy() {
        let store = MemoryStore::new();
        let user = Uuid::new_v4();
        store.set_pin_hash(&user, &hash_pin("1234")).await.unwrap();
        let mut local = MemoryCache::new();
        local.set(&cache_key(&user), "garbage").unwrap();

        let cache = PinCache::bootstrap(local, &store, user, TIMEOUT).await.unwrap();

        assert_eq!(cache.current_hash(), Some(&hash_pin("1234")));
    }

    #[tokio::test]
    async fn test_bootstrap_fails_when_store_unreachable() {
        let store = MemoryStore::new();
        store.set_offline(true);
        let result = PinCache::bootstrap(MemoryCache::new(), &store, Uuid::new_v4(), TIMEOUT).await;
        assert!(matches!(result, Err(SanctumError::RemoteUnavailable(_))));
    }

    #[tokio::test]
    async fn test_refresh_clears_removed_record() {
        let store = MemoryStore::new();
        let user = Uuid::new_v4();
        store.set_pin_hash(&user, &hash_pin("1234")).await.unwrap();
        let mut cache = PinCache::bootstrap(MemoryCache::new(), &store, user, TIMEOUT)
            .await
            .unwrap();

        store.clear_pin_hash(&user).await.unwrap();
        assert!(cache.refresh(&store, TIMEOUT).await.unwrap().is_none());
        assert!(!cache.is_configured());
        assert!(cache.local.get(&cache_key(&user)).is_none());
    }

    #[tokio::test]
    async fn test_remember_and_forget() {
        let store = MemoryStore::new();
        let user = Uuid::new_v4();
        let mut cache = PinCache::bootstrap(MemoryCache::new(), &store, user, TIMEOUT)
            .await
            .unwrap();

        cache.remember(hash_pin("0000"));
        assert!(cache.is_configured());

        cache.forget();
        assert!(!cache.is_configured());
        assert!(cache.local.get(&cache_key(&user)).is_none());
    }

    #[tokio::test]
    async fn test_failures_survive_a_new_bootstrap() {
        let store = MemoryStore::new();
        let user = Uuid::new_v4();
        store.set_pin_hash(&user, &hash_pin("1234")).await.unwrap();
        let mut cache = PinCache::bootstrap(MemoryCache::new(), &store, user, TIMEOUT)
            .await
            .unwrap();

        assert_eq!(cache.record_failure(), 1);
        assert_eq!(cache.record_failure(), 2);

        let reopened = PinCache::bootstrap(cache.local, &store, user, TIMEOUT)
            .await
            .unwrap();
        assert_eq!(reopened.failed_attempts(), 2);
    }

    #[tokio::test]
    async fn test_lockout_expires_and_clears() {
        let store = MemoryStore::new();
        let user = Uuid::new_v4();
        let mut cache = PinCache::bootstrap(MemoryCache::new(), &store, user, TIMEOUT)
            .await
            .unwrap();
        let now = Utc::now();

        cache.record_failure();
        cache.lock_out(now + chrono::Duration::seconds(30));
        assert_eq!(cache.failed_attempts(), 0);
        assert!(cache.is_locked_out(now));
        assert!(!cache.is_locked_out(now + chrono::Duration::seconds(31)));

        let mut reopened = PinCache::bootstrap(cache.local, &store, user, TIMEOUT)
            .await
            .unwrap();
        assert!(reopened.is_locked_out(now));

        reopened.clear_failures();
        assert!(reopened.locked_until().is_none());
        assert!(reopened.local.get(&locked_until_key(&user)).is_none());
    }

    #[tokio::test]
    async fn test_malformed_attempt_state_is_ignored() {
        let store = MemoryStore::new();
        let user = Uuid::new_v4();
        let mut local = MemoryCache::new();
        local.set(&failures_key(&user), "many").unwrap();
        local.set(&locked_until_key(&user), "tomorrow").unwrap();

        let cache = PinCache::bootstrap(local, &store, user, TIMEOUT).await.unwrap();
        assert_eq!(cache.failed_attempts(), 0);
        assert!(cache.locked_until().is_none());
    }

    /// Local cache that reads but refuses every write.
    struct ReadOnlyCache(MemoryCache);

    impl LocalCache for ReadOnlyCache {
        fn get(&self, key: &str) -> Option<String> {
            self.0.get(key)
        }

        fn set(&mut self, _key: &str, _value: &str) -> Result<()> {
            Err(SanctumError::Storage("read-only".to_string()))
        }

        fn remove(&mut self, _key: &str) -> Result<()> {
            Err(SanctumError::Storage("read-only".to_string()))
        }
    }

    #[tokio::test]
    async fn test_failed_local_removal_still_forgets() {
        let store = MemoryStore::new();
        let user = Uuid::new_v4();
        let mut seeded = MemoryCache::new();
        seeded.set(&cache_key(&user), hash_pin("1234").as_str()).unwrap();
        seeded.set(&failures_key(&user), "2").unwrap();

        let mut cache = PinCache::bootstrap(ReadOnlyCache(seeded), &store, user, TIMEOUT)
            .await
            .unwrap();
        assert_eq!(cache.failed_attempts(), 2);

        cache.forget();
        assert!(!cache.is_configured());
        assert_eq!(cache.failed_attempts(), 0);

        cache.remember(hash_pin("5678"));
        assert_eq!(cache.current_hash(), Some(&hash_pin("5678")));
        assert_eq!(cache.refresh(&store, TIMEOUT).await.unwrap(), None);
        assert!(!cache.is_configured());
    }
}

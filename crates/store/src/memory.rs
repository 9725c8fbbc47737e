//! In-memory store for dev/test.
//!
//! Mirrors the redis adapter's observable semantics, including the TTL
//! behavior: lock claims self-expire, item retention is armed by the first
//! write, and expired entries read as `NotFound`. Expiry is lazy: entries
//! are judged against their deadline on access, not reaped in the
//! background.

use std::collections::HashMap;
use std::sync::RwLock;
use std::time::{Duration, Instant};

use async_trait::async_trait;
use chrono::Utc;

use scanrelay_core::{ResultItem, ResultKey};

use crate::error::StoreError;
use crate::provider::{ResultStore, TargetLock};
use crate::redis_store::{DEFAULT_ITEM_TTL, DEFAULT_LOCK_TTL};

#[derive(Debug, Clone)]
struct StoredItem {
    item: ResultItem,
    expires_at: Instant,
}

/// In-memory implementation of both store capabilities.
#[derive(Debug)]
pub struct InMemoryStore {
    locks: RwLock<HashMap<String, Instant>>,
    items: RwLock<HashMap<String, StoredItem>>,
    item_ttl: Duration,
    lock_ttl: Duration,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::with_ttls(DEFAULT_ITEM_TTL, DEFAULT_LOCK_TTL)
    }

    pub fn with_ttls(item_ttl: Duration, lock_ttl: Duration) -> Self {
        Self {
            locks: RwLock::new(HashMap::new()),
            items: RwLock::new(HashMap::new()),
            item_ttl,
            lock_ttl,
        }
    }
}

impl Default for InMemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl TargetLock for InMemoryStore {
    async fn acquire(&self, key: &str) -> Result<(), StoreError> {
        let mut locks = self.locks.write().unwrap();
        let now = Instant::now();

        if let Some(deadline) = locks.get(key) {
            if *deadline > now {
                return Err(StoreError::AlreadyClaimed {
                    key: key.to_string(),
                });
            }
        }

        locks.insert(key.to_string(), now + self.lock_ttl);
        Ok(())
    }

    async fn release(&self, key: &str) -> Result<(), StoreError> {
        self.locks.write().unwrap().remove(key);
        Ok(())
    }
}

#[async_trait]
impl ResultStore for InMemoryStore {
    async fn save(&self, key: &ResultKey, item: &ResultItem) -> Result<(), StoreError> {
        key.validate()?;
        item.validate()?;

        let k = key.render();
        let mut items = self.items.write().unwrap();
        let now = Instant::now();

        // Retention is armed by the first write only.
        let expires_at = match items.get(&k) {
            Some(existing) if existing.expires_at > now => existing.expires_at,
            _ => now + self.item_ttl,
        };

        items.insert(
            k,
            StoredItem {
                item: ResultItem {
                    timestamp: Utc::now().timestamp(),
                    ..item.clone()
                },
                expires_at,
            },
        );

        Ok(())
    }

    async fn get(&self, key: &ResultKey) -> Result<ResultItem, StoreError> {
        key.validate()?;

        let items = self.items.read().unwrap();
        match items.get(&key.render()) {
            Some(stored) if stored.expires_at > Instant::now() => Ok(stored.item.clone()),
            _ => Err(StoreError::NotFound),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use scanrelay_core::ScanStatus;

    fn test_key(request_id: &str) -> ResultKey {
        ResultKey::new("cis", request_id, "application/vnd.security.report")
            .with_namespace("scanrelay")
    }

    #[tokio::test]
    async fn save_then_get_round_trips() {
        let store = InMemoryStore::new();
        let key = test_key("req-1");
        let before = Utc::now().timestamp();

        store
            .save(&key, &ResultItem::success("{\"findings\":[]}"))
            .await
            .unwrap();

        let item = store.get(&key).await.unwrap();
        assert_eq!(item.status, ScanStatus::Success);
        assert_eq!(item.payload, "{\"findings\":[]}");
        assert_eq!(item.error, "");
        assert!(item.timestamp >= before);
    }

    #[tokio::test]
    async fn get_of_never_written_key_is_not_found() {
        let store = InMemoryStore::new();
        assert!(matches!(
            store.get(&test_key("req-missing")).await,
            Err(StoreError::NotFound)
        ));
    }

    #[tokio::test]
    async fn invalid_item_fails_before_any_write() {
        let store = InMemoryStore::new();
        let key = test_key("req-2");

        let bad_success = ResultItem {
            payload: String::new(),
            ..ResultItem::success("x")
        };
        assert!(matches!(
            store.save(&key, &bad_success).await,
            Err(StoreError::InvalidItem(_))
        ));

        let bad_error = ResultItem {
            error: String::new(),
            ..ResultItem::error("x")
        };
        assert!(matches!(
            store.save(&key, &bad_error).await,
            Err(StoreError::InvalidItem(_))
        ));

        // Nothing was written.
        assert!(matches!(
            store.get(&key).await,
            Err(StoreError::NotFound)
        ));
    }

    #[tokio::test]
    async fn invalid_key_is_rejected() {
        let store = InMemoryStore::new();
        let key = ResultKey::new("", "req-3", "mime");
        assert!(matches!(
            store.save(&key, &ResultItem::pending()).await,
            Err(StoreError::InvalidKey(_))
        ));
        assert!(matches!(
            store.get(&key).await,
            Err(StoreError::InvalidKey(_))
        ));
    }

    #[tokio::test]
    async fn second_acquire_without_release_is_already_claimed() {
        let store = InMemoryStore::new();

        store.acquire("scanrelay:lock:cis:img-v1").await.unwrap();
        assert!(matches!(
            store.acquire("scanrelay:lock:cis:img-v1").await,
            Err(StoreError::AlreadyClaimed { .. })
        ));

        // An unrelated target is unaffected.
        store.acquire("scanrelay:lock:cis:img-v2").await.unwrap();
    }

    #[tokio::test]
    async fn release_is_idempotent() {
        let store = InMemoryStore::new();

        store.release("scanrelay:lock:cis:never-claimed").await.unwrap();

        store.acquire("scanrelay:lock:cis:img").await.unwrap();
        store.release("scanrelay:lock:cis:img").await.unwrap();
        store.release("scanrelay:lock:cis:img").await.unwrap();

        // Released means claimable again.
        store.acquire("scanrelay:lock:cis:img").await.unwrap();
    }

    #[tokio::test]
    async fn lock_claim_self_expires() {
        let store =
            InMemoryStore::with_ttls(DEFAULT_ITEM_TTL, Duration::from_millis(50));

        store.acquire("scanrelay:lock:cis:img").await.unwrap();
        tokio::time::sleep(Duration::from_millis(120)).await;

        // The crashed holder's claim lapsed; a fresh accept can proceed.
        store.acquire("scanrelay:lock:cis:img").await.unwrap();
    }

    #[tokio::test]
    async fn item_expires_after_retention_window() {
        let store =
            InMemoryStore::with_ttls(Duration::from_millis(50), DEFAULT_LOCK_TTL);
        let key = test_key("req-4");

        store.save(&key, &ResultItem::ongoing()).await.unwrap();
        assert!(store.get(&key).await.is_ok());

        tokio::time::sleep(Duration::from_millis(120)).await;
        assert!(matches!(
            store.get(&key).await,
            Err(StoreError::NotFound)
        ));
    }

    #[tokio::test]
    async fn abandoned_execution_recovers_once_both_ttls_elapse() {
        // A holder that wrote Ongoing and then crashed: the item stays
        // visible until retention lapses, the lock until its safety expiry,
        // after which a fresh accept for the same target can proceed.
        let store = InMemoryStore::with_ttls(
            Duration::from_millis(60),
            Duration::from_millis(60),
        );
        let key = test_key("req-abandoned");
        let lock_key = "scanrelay:lock:cis:img-v1";

        store.acquire(lock_key).await.unwrap();
        store.save(&key, &ResultItem::ongoing()).await.unwrap();

        let item = store.get(&key).await.unwrap();
        assert_eq!(item.status, ScanStatus::Ongoing);
        assert!(matches!(
            store.acquire(lock_key).await,
            Err(StoreError::AlreadyClaimed { .. })
        ));

        tokio::time::sleep(Duration::from_millis(140)).await;

        assert!(matches!(store.get(&key).await, Err(StoreError::NotFound)));
        store.acquire(lock_key).await.unwrap();
    }

    #[tokio::test]
    async fn later_writes_do_not_extend_retention() {
        let store =
            InMemoryStore::with_ttls(Duration::from_millis(150), DEFAULT_LOCK_TTL);
        let key = test_key("req-5");

        store.save(&key, &ResultItem::pending()).await.unwrap();
        tokio::time::sleep(Duration::from_millis(100)).await;

        // A status transition must not re-arm the window.
        store.save(&key, &ResultItem::ongoing()).await.unwrap();
        tokio::time::sleep(Duration::from_millis(100)).await;

        assert!(matches!(
            store.get(&key).await,
            Err(StoreError::NotFound)
        ));
    }
}

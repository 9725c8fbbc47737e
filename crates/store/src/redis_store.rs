//! Redis-backed store adapter.
//!
//! One result item is one hash with a fixed field set (`status`, `data`,
//! `error`, `timestamp`) so a save or a read is a single command and a
//! poller can never observe a half-written record. Locks are plain string
//! keys written with `SET ... NX EX`; the claim and its safety expiry land in
//! one conditional round trip.

use core::fmt;
use std::collections::HashMap;
use std::time::Duration;

use async_trait::async_trait;
use chrono::Utc;
use redis::aio::ConnectionManager;
use tracing::warn;

use scanrelay_core::{ResultItem, ResultKey, ScanStatus};

use crate::error::StoreError;
use crate::provider::{ResultStore, TargetLock};

const LOCK_SENTINEL: &str = "claimed";

const FIELD_STATUS: &str = "status";
const FIELD_DATA: &str = "data";
const FIELD_ERROR: &str = "error";
const FIELD_TIMESTAMP: &str = "timestamp";

/// Default retention window for result items.
pub const DEFAULT_ITEM_TTL: Duration = Duration::from_secs(300);
/// Default safety expiry for uniqueness locks.
pub const DEFAULT_LOCK_TTL: Duration = Duration::from_secs(300);

/// Redis store configuration.
#[derive(Debug, Clone)]
pub struct RedisStoreConfig {
    pub url: String,
    /// Retention window for result items, armed by the first write.
    pub item_ttl: Duration,
    /// Safety expiry for uniqueness locks.
    pub lock_ttl: Duration,
}

impl RedisStoreConfig {
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            item_ttl: DEFAULT_ITEM_TTL,
            lock_ttl: DEFAULT_LOCK_TTL,
        }
    }

    pub fn with_item_ttl(mut self, ttl: Duration) -> Self {
        self.item_ttl = ttl;
        self
    }

    pub fn with_lock_ttl(mut self, ttl: Duration) -> Self {
        self.lock_ttl = ttl;
        self
    }
}

/// Redis-backed implementation of both store capabilities.
///
/// Construct once at process start and hand clones to every request-handling
/// and worker context; the underlying connection manager multiplexes
/// concurrent callers and reconnects on connection loss.
#[derive(Clone)]
pub struct RedisStore {
    conn: ConnectionManager,
    item_ttl_secs: u64,
    lock_ttl_secs: u64,
}

impl fmt::Debug for RedisStore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RedisStore")
            .field("item_ttl_secs", &self.item_ttl_secs)
            .field("lock_ttl_secs", &self.lock_ttl_secs)
            .finish()
    }
}

impl RedisStore {
    /// Connect to the backing service.
    ///
    /// An invalid URL or an unreachable service fails construction; callers
    /// surface this at startup rather than serving requests against a store
    /// that cannot work.
    pub async fn connect(config: RedisStoreConfig) -> Result<Self, StoreError> {
        let client = redis::Client::open(config.url.as_str())
            .map_err(|e| StoreError::backend("connect", e))?;

        let conn = ConnectionManager::new(client)
            .await
            .map_err(|e| StoreError::backend("connect", e))?;

        Ok(Self {
            conn,
            item_ttl_secs: config.item_ttl.as_secs(),
            lock_ttl_secs: config.lock_ttl.as_secs(),
        })
    }
}

#[async_trait]
impl TargetLock for RedisStore {
    async fn acquire(&self, key: &str) -> Result<(), StoreError> {
        let mut conn = self.conn.clone();

        // Single conditional round trip. A separate exists-then-set pair
        // would let two concurrent callers both observe "unclaimed".
        let reply: Option<String> = redis::cmd("SET")
            .arg(key)
            .arg(LOCK_SENTINEL)
            .arg("NX")
            .arg("EX")
            .arg(self.lock_ttl_secs)
            .query_async(&mut conn)
            .await
            .map_err(|e| StoreError::backend("acquire", e))?;

        match reply {
            Some(_) => Ok(()),
            None => Err(StoreError::AlreadyClaimed {
                key: key.to_string(),
            }),
        }
    }

    async fn release(&self, key: &str) -> Result<(), StoreError> {
        let mut conn = self.conn.clone();

        let _: i64 = redis::cmd("DEL")
            .arg(key)
            .query_async(&mut conn)
            .await
            .map_err(|e| StoreError::backend("release", e))?;

        Ok(())
    }
}

#[async_trait]
impl ResultStore for RedisStore {
    async fn save(&self, key: &ResultKey, item: &ResultItem) -> Result<(), StoreError> {
        key.validate()?;
        item.validate()?;

        let k = key.render();
        let timestamp = Utc::now().timestamp();
        let mut conn = self.conn.clone();

        // All four fields in one command; unused fields are written empty so
        // the read path never has to reason about field presence.
        let _: i64 = redis::cmd("HSET")
            .arg(&k)
            .arg(FIELD_STATUS)
            .arg(item.status.as_str())
            .arg(FIELD_DATA)
            .arg(&item.payload)
            .arg(FIELD_ERROR)
            .arg(&item.error)
            .arg(FIELD_TIMESTAMP)
            .arg(timestamp)
            .query_async(&mut conn)
            .await
            .map_err(|e| StoreError::backend("save", e))?;

        // NX arms the retention window on the first write only; later status
        // transitions must not extend the record's lifetime. A failed expiry
        // degrades to "no automatic cleanup", not data loss, so the write
        // still counts as a success.
        let expiry: Result<i64, redis::RedisError> = redis::cmd("EXPIRE")
            .arg(&k)
            .arg(self.item_ttl_secs)
            .arg("NX")
            .query_async(&mut conn)
            .await;
        if let Err(e) = expiry {
            warn!(key = %k, error = %e, "failed to arm result retention expiry");
        }

        Ok(())
    }

    async fn get(&self, key: &ResultKey) -> Result<ResultItem, StoreError> {
        key.validate()?;

        let k = key.render();
        let mut conn = self.conn.clone();

        let fields: HashMap<String, String> = redis::cmd("HGETALL")
            .arg(&k)
            .query_async(&mut conn)
            .await
            .map_err(|e| StoreError::backend("get", e))?;

        // HGETALL on a missing key yields an empty reply, which is the
        // expected "never written or expired" outcome.
        if fields.is_empty() {
            return Err(StoreError::NotFound);
        }

        let status: ScanStatus = fields
            .get(FIELD_STATUS)
            .ok_or_else(|| StoreError::backend("get", "record is missing the status field"))?
            .parse()
            .map_err(|e| StoreError::backend("get", e))?;

        let timestamp = match fields.get(FIELD_TIMESTAMP) {
            Some(raw) => raw
                .parse::<i64>()
                .map_err(|e| StoreError::backend("get", format!("bad timestamp {raw:?}: {e}")))?,
            None => 0,
        };

        Ok(ResultItem {
            status,
            payload: fields.get(FIELD_DATA).cloned().unwrap_or_default(),
            error: fields.get(FIELD_ERROR).cloned().unwrap_or_default(),
            timestamp,
        })
    }
}

//! Store contract: mutual exclusion and result persistence.
//!
//! The two traits are deliberately independent: a backend may implement one
//! without the other, and they are tested separately. Production code shares
//! a single adapter instance behind `Arc<dyn ...>` handles constructed once at
//! startup.

use async_trait::async_trait;

use scanrelay_core::{ResultItem, ResultKey};

use crate::error::StoreError;

/// Mutual-exclusion primitive keyed by an opaque string.
///
/// Used to guarantee at most one in-flight scan per logical target. A claim
/// carries a safety expiry so a crashed holder cannot wedge the lock forever;
/// the execution path is responsible for releasing it on every exit path.
#[async_trait]
pub trait TargetLock: Send + Sync {
    /// Claim `key`.
    ///
    /// Succeeds iff the key was unclaimed; the claim must be a single atomic
    /// conditional round trip to the backend (no separate existence check).
    /// Fails with [`StoreError::AlreadyClaimed`] when another holder owns it.
    async fn acquire(&self, key: &str) -> Result<(), StoreError>;

    /// Unconditionally remove the claim on `key`.
    ///
    /// Idempotent: releasing an unclaimed or already-released key is not an
    /// error.
    async fn release(&self, key: &str) -> Result<(), StoreError>;
}

/// Get/set persistence for scan result items.
#[async_trait]
pub trait ResultStore: Send + Sync {
    /// Persist `item` under `key`.
    ///
    /// Validates both (failing fast with no partial write), then atomically
    /// writes all item fields plus a store-assigned timestamp. The retention
    /// expiry is armed only by the first write to a key; later status
    /// transitions must not extend the record's lifetime.
    async fn save(&self, key: &ResultKey, item: &ResultItem) -> Result<(), StoreError>;

    /// Read the item stored under `key`.
    ///
    /// [`StoreError::NotFound`] is an expected outcome: the entry was never
    /// written, or its retention window elapsed.
    async fn get(&self, key: &ResultKey) -> Result<ResultItem, StoreError>;
}

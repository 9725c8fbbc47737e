//! `scanrelay-store`: distributed idempotent result store.
//!
//! ## Design
//!
//! - Two independent capabilities behind traits: a mutual-exclusion primitive
//!   keyed by an opaque string ([`TargetLock`]) and get/set persistence for
//!   scan results keyed by [`scanrelay_core::ResultKey`] ([`ResultStore`]).
//! - `RedisStore` is the production adapter: one connection manager per
//!   store, atomic conditional claims, fixed-shape hash records with a
//!   retention expiry armed by the first write.
//! - `InMemoryStore` backs dev and tests with the same TTL semantics.
//!
//! The store never retries and never logs its own success paths; structured
//! errors go up and the caller decides escalation.

pub mod error;
pub mod memory;
pub mod provider;
pub mod redis_store;

pub use error::StoreError;
pub use memory::InMemoryStore;
pub use provider::{ResultStore, TargetLock};
pub use redis_store::{RedisStore, RedisStoreConfig};

//! Store error taxonomy.

use scanrelay_core::DomainError;
use thiserror::Error;

/// Errors surfaced by the result store.
///
/// `AlreadyClaimed` and `NotFound` are expected control-flow outcomes, not
/// faults; callers must branch on them by variant, never by message.
/// `Backend` is the only transport-level failure and is surfaced
/// immediately; the store performs no internal retries.
#[derive(Debug, Error)]
pub enum StoreError {
    /// The key failed validation; a bug in the caller, never retryable.
    #[error("invalid result key: {0}")]
    InvalidKey(String),

    /// The item failed validation; a bug in the caller, never retryable.
    #[error("invalid result item: {0}")]
    InvalidItem(String),

    /// Another holder currently owns the uniqueness lock.
    #[error("target already claimed: {key}")]
    AlreadyClaimed { key: String },

    /// No entry exists for the key (never written, or expired).
    #[error("result item not found")]
    NotFound,

    /// Transport or protocol fault talking to the backing service, tagged
    /// with the operation that failed.
    #[error("backend {op} error: {detail}")]
    Backend { op: &'static str, detail: String },
}

impl StoreError {
    pub fn backend(op: &'static str, err: impl std::fmt::Display) -> Self {
        Self::Backend {
            op,
            detail: err.to_string(),
        }
    }

    /// True for the outcomes a caller is expected to handle as normal
    /// control flow rather than escalate.
    pub fn is_expected(&self) -> bool {
        matches!(self, Self::AlreadyClaimed { .. } | Self::NotFound)
    }
}

impl From<DomainError> for StoreError {
    fn from(err: DomainError) -> Self {
        match err {
            DomainError::InvalidKey(msg) => Self::InvalidKey(msg),
            DomainError::InvalidItem(msg) => Self::InvalidItem(msg),
            DomainError::InvalidId(msg) => Self::InvalidKey(msg),
        }
    }
}

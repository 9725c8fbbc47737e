//! Result item: the stored record for one scan request.

use serde::{Deserialize, Serialize};

use crate::error::{DomainError, DomainResult};
use crate::status::ScanStatus;

/// One stored scan result.
///
/// The record has a fixed shape: `payload` and `error` are always present and
/// written, empty when the status does not use them. `timestamp` (seconds
/// since epoch) is assigned by the store adapter at write time; the value a
/// caller puts here is ignored.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResultItem {
    pub status: ScanStatus,
    /// Raw report (JSON text). Required iff `status` is `Success`.
    pub payload: String,
    /// Failure description. Required iff `status` is `Error`.
    pub error: String,
    pub timestamp: i64,
}

impl ResultItem {
    pub fn pending() -> Self {
        Self::with_status(ScanStatus::Pending)
    }

    pub fn ongoing() -> Self {
        Self::with_status(ScanStatus::Ongoing)
    }

    pub fn success(payload: impl Into<String>) -> Self {
        Self {
            payload: payload.into(),
            ..Self::with_status(ScanStatus::Success)
        }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self {
            error: message.into(),
            ..Self::with_status(ScanStatus::Error)
        }
    }

    fn with_status(status: ScanStatus) -> Self {
        Self {
            status,
            payload: String::new(),
            error: String::new(),
            timestamp: 0,
        }
    }

    /// Check the per-status field-presence rules before persistence.
    pub fn validate(&self) -> DomainResult<()> {
        if self.status == ScanStatus::Success && self.payload.is_empty() {
            return Err(DomainError::invalid_item(
                "payload is required for a success result",
            ));
        }

        if self.status == ScanStatus::Error && self.error.is_empty() {
            return Err(DomainError::invalid_item(
                "error message is required for an error result",
            ));
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pending_and_ongoing_need_no_payload() {
        assert!(ResultItem::pending().validate().is_ok());
        assert!(ResultItem::ongoing().validate().is_ok());
    }

    #[test]
    fn success_requires_payload() {
        assert!(ResultItem::success("{\"findings\":[]}").validate().is_ok());

        let empty = ResultItem {
            payload: String::new(),
            ..ResultItem::success("x")
        };
        assert!(matches!(
            empty.validate(),
            Err(DomainError::InvalidItem(_))
        ));
    }

    #[test]
    fn error_requires_message() {
        assert!(ResultItem::error("engine exploded").validate().is_ok());

        let empty = ResultItem {
            error: String::new(),
            ..ResultItem::error("x")
        };
        assert!(matches!(
            empty.validate(),
            Err(DomainError::InvalidItem(_))
        ));
    }
}

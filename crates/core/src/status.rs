//! Scan result lifecycle status.

use core::fmt;
use core::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::DomainError;

/// Lifecycle status of a stored scan result.
///
/// A result is created as `Pending` by the accept path, moved to `Ongoing`
/// when execution starts, and ends in exactly one terminal state. `Success`
/// and `Error` are terminal: no further transition is expected once either
/// is reached.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ScanStatus {
    Pending,
    Ongoing,
    Success,
    Error,
}

impl ScanStatus {
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Success | Self::Error)
    }

    /// Storage-native rendering, used verbatim as the stored `status` field.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Pending => "Pending",
            Self::Ongoing => "Ongoing",
            Self::Success => "Success",
            Self::Error => "Error",
        }
    }
}

impl fmt::Display for ScanStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ScanStatus {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "Pending" => Ok(Self::Pending),
            "Ongoing" => Ok(Self::Ongoing),
            "Success" => Ok(Self::Success),
            "Error" => Ok(Self::Error),
            other => Err(DomainError::invalid_item(format!(
                "unknown status: {other}"
            ))),
        }
    }
}

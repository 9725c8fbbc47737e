//! Scan task: the unit of work handed from the accept path to the workers.

use scanrelay_core::RequestId;

/// Registry credentials forwarded to the scan engine.
///
/// Only anonymous and HTTP Basic access are supported; the engine receives
/// basic credentials as command-line options.
#[derive(Clone, PartialEq, Eq)]
pub enum RegistryAuth {
    Anonymous,
    Basic { username: String, password: String },
}

// Manual Debug so credentials never leak into logs.
impl core::fmt::Debug for RegistryAuth {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            Self::Anonymous => f.write_str("Anonymous"),
            Self::Basic { username, .. } => f
                .debug_struct("Basic")
                .field("username", username)
                .field("password", &"<redacted>")
                .finish(),
        }
    }
}

/// One accepted scan request.
#[derive(Debug, Clone)]
pub struct ScanTask {
    pub request_id: RequestId,
    /// Full image path, e.g. `registry.example.com/library/nginx:1.25`.
    /// Doubles as the logical target for the uniqueness lock.
    pub image: String,
    pub auth: RegistryAuth,
}

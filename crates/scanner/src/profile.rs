//! Scanner identity and key construction.

use scanrelay_core::{RequestId, ResultKey};

/// MIME types this adapter can consume (image manifests).
pub const CONSUMES_MIME_TYPES: [&str; 2] = [
    "application/vnd.oci.image.manifest.v1+json",
    "application/vnd.docker.distribution.manifest.v2+json",
];

/// MIME type of the produced benchmark report.
pub const REPORT_MIME_TYPE: &str = "application/vnd.security.cis.report; version=1.0";

/// Identity of the scan producer plus the key-construction rules.
///
/// The accept path, the poll path, and the execution path each construct
/// keys independently; routing them all through one profile instance is what
/// keeps the three renderings identical for the same request.
#[derive(Debug, Clone)]
pub struct ScannerProfile {
    /// Producer name, also the `producer` field of every result key.
    pub name: String,
    pub version: String,
    pub vendor: String,
    /// Deployment prefix shared by all keys this instance writes.
    pub namespace: String,
    pub report_mime_type: String,
}

impl Default for ScannerProfile {
    fn default() -> Self {
        Self {
            name: "cis-bench".to_string(),
            version: env!("CARGO_PKG_VERSION").to_string(),
            vendor: "Scanrelay Authors".to_string(),
            namespace: "scanrelay".to_string(),
            report_mime_type: REPORT_MIME_TYPE.to_string(),
        }
    }
}

impl ScannerProfile {
    /// Result key for `request_id`.
    pub fn result_key(&self, request_id: RequestId) -> ResultKey {
        ResultKey::new(&self.name, request_id.to_string(), &self.report_mime_type)
            .with_namespace(&self.namespace)
    }

    /// Uniqueness-lock key for a logical target.
    ///
    /// The literal `lock` segment keeps lock keys in a namespace result keys
    /// can never render into.
    pub fn lock_key(&self, image: &str) -> String {
        format!("{}:lock:{}:{}", self.namespace, self.name, image)
    }
}

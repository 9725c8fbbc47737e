//! Request/response DTOs for the scan API.

use serde::{Deserialize, Serialize};

use scanrelay_core::RequestId;
use scanrelay_scanner::{CONSUMES_MIME_TYPES, ScannerProfile};

/// Body of `POST /api/v1/scan`.
#[derive(Debug, Clone, Deserialize)]
pub struct ScanRequest {
    pub registry: Registry,
    pub artifact: Artifact,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Registry {
    /// Registry host, e.g. `registry.example.com`.
    pub url: String,
    /// Credential for pulling the artifact, HTTP `Authorization` syntax.
    #[serde(default)]
    pub authorization: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Artifact {
    pub repository: String,
    #[serde(default)]
    pub digest: Option<String>,
    #[serde(default)]
    pub tag: Option<String>,
}

impl ScanRequest {
    /// Full image path for the engine: `url/repository:tag`, or
    /// `url/repository@digest` when no tag is given.
    pub fn image_path(&self) -> Result<String, &'static str> {
        if self.registry.url.is_empty() {
            return Err("registry.url is required");
        }
        if self.artifact.repository.is_empty() {
            return Err("artifact.repository is required");
        }

        let base = format!("{}/{}", self.registry.url, self.artifact.repository);
        match (&self.artifact.tag, &self.artifact.digest) {
            (Some(tag), _) if !tag.is_empty() => Ok(format!("{base}:{tag}")),
            (_, Some(digest)) if !digest.is_empty() => Ok(format!("{base}@{digest}")),
            _ => Err("artifact.tag or artifact.digest is required"),
        }
    }
}

/// Body of the 202 reply to `POST /api/v1/scan`.
#[derive(Debug, Clone, Serialize)]
pub struct ScanResponse {
    pub id: RequestId,
}

/// Body of `GET /api/v1/metadata`.
#[derive(Debug, Clone, Serialize)]
pub struct ScannerMetadata {
    pub scanner: ScannerInfo,
    pub capabilities: Vec<Capability>,
}

#[derive(Debug, Clone, Serialize)]
pub struct ScannerInfo {
    pub name: String,
    pub version: String,
    pub vendor: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct Capability {
    pub consumes_mime_types: Vec<String>,
    pub produces_mime_types: Vec<String>,
}

impl ScannerMetadata {
    pub fn from_profile(profile: &ScannerProfile) -> Self {
        Self {
            scanner: ScannerInfo {
                name: profile.name.clone(),
                version: profile.version.clone(),
                vendor: profile.vendor.clone(),
            },
            capabilities: vec![Capability {
                consumes_mime_types: CONSUMES_MIME_TYPES
                    .iter()
                    .map(|m| m.to_string())
                    .collect(),
                produces_mime_types: vec![profile.report_mime_type.clone()],
            }],
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn request(tag: Option<&str>, digest: Option<&str>) -> ScanRequest {
        ScanRequest {
            registry: Registry {
                url: "registry.example.com".to_string(),
                authorization: None,
            },
            artifact: Artifact {
                repository: "library/nginx".to_string(),
                digest: digest.map(str::to_string),
                tag: tag.map(str::to_string),
            },
        }
    }

    #[test]
    fn tag_takes_precedence_over_digest() {
        let req = request(Some("1.25"), Some("sha256:abc"));
        assert_eq!(
            req.image_path().unwrap(),
            "registry.example.com/library/nginx:1.25"
        );
    }

    #[test]
    fn digest_is_used_without_a_tag() {
        let req = request(None, Some("sha256:abc"));
        assert_eq!(
            req.image_path().unwrap(),
            "registry.example.com/library/nginx@sha256:abc"
        );
    }

    #[test]
    fn missing_reference_is_rejected() {
        assert!(request(None, None).image_path().is_err());

        let mut req = request(Some("1.25"), None);
        req.artifact.repository.clear();
        assert!(req.image_path().is_err());

        let mut req = request(Some("1.25"), None);
        req.registry.url.clear();
        assert!(req.image_path().is_err());
    }
}

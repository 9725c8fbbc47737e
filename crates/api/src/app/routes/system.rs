//! Service metadata and liveness routes.

use axum::Json;
use axum::extract::Extension;
use axum::http::StatusCode;
use axum::response::IntoResponse;

use crate::app::AppServices;
use crate::app::dto::ScannerMetadata;

/// `GET /api/v1/metadata`: scanner capabilities for registry discovery.
pub async fn metadata(
    Extension(services): Extension<AppServices>,
) -> axum::response::Response {
    Json(ScannerMetadata::from_profile(&services.profile)).into_response()
}

/// `GET /healthz`
pub async fn health() -> axum::response::Response {
    (StatusCode::OK, Json(serde_json::json!({ "status": "ok" }))).into_response()
}

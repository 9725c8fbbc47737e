//! HTTP error mapping.

use axum::Json;
use axum::http::StatusCode;
use axum::response::IntoResponse;
use serde_json::json;

use scanrelay_store::StoreError;

pub fn json_error(
    status: StatusCode,
    code: &'static str,
    message: impl Into<String>,
) -> axum::response::Response {
    (
        status,
        Json(json!({
            "error": code,
            "message": message.into(),
        })),
    )
        .into_response()
}

/// Map a store failure that was not handled as expected control flow.
///
/// `AlreadyClaimed` and `NotFound` normally never reach this function (the
/// handlers branch on them first), but mapping them here keeps the fallback
/// honest if one slips through.
pub fn store_error_to_response(err: StoreError) -> axum::response::Response {
    match err {
        StoreError::NotFound => json_error(
            StatusCode::NOT_FOUND,
            "not_found",
            "no result stored for this request",
        ),
        StoreError::AlreadyClaimed { .. } => json_error(
            StatusCode::CONFLICT,
            "scan_in_progress",
            "a scan for this artifact is already in progress",
        ),
        StoreError::InvalidKey(msg) | StoreError::InvalidItem(msg) => {
            json_error(StatusCode::INTERNAL_SERVER_ERROR, "internal_error", msg)
        }
        StoreError::Backend { .. } => json_error(
            StatusCode::INTERNAL_SERVER_ERROR,
            "backend_error",
            err.to_string(),
        ),
    }
}

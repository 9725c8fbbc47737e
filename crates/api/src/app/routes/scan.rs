//! Scan accept and report routes.

use axum::Json;
use axum::extract::{Extension, Path};
use axum::http::{StatusCode, header};
use axum::response::IntoResponse;

use scanrelay_core::{RequestId, ResultItem, ScanStatus};
use scanrelay_scanner::ScanTask;
use scanrelay_store::StoreError;

use crate::app::AppServices;
use crate::app::{dto, errors};
use crate::auth;

/// Retry hint (seconds) returned while a result is not ready yet.
const RETRY_AFTER_SECS: &str = "5";

/// `POST /api/v1/scan`: accept a scan request.
pub async fn accept_scan(
    Extension(services): Extension<AppServices>,
    Json(body): Json<dto::ScanRequest>,
) -> axum::response::Response {
    let auth = match auth::parse(body.registry.authorization.as_deref()) {
        Ok(auth) => auth,
        Err(e) => {
            return errors::json_error(
                StatusCode::BAD_REQUEST,
                "invalid_authorization",
                e.to_string(),
            );
        }
    };

    let image = match body.image_path() {
        Ok(image) => image,
        Err(msg) => return errors::json_error(StatusCode::BAD_REQUEST, "invalid_artifact", msg),
    };

    let lock_key = services.profile.lock_key(&image);
    match services.lock.acquire(&lock_key).await {
        Ok(()) => {}
        Err(StoreError::AlreadyClaimed { .. }) => {
            return errors::json_error(
                StatusCode::CONFLICT,
                "scan_in_progress",
                "a scan for this artifact is already in progress",
            );
        }
        Err(e) => return errors::store_error_to_response(e),
    }

    let request_id = RequestId::new();
    let key = services.profile.result_key(request_id);

    // Best-effort: the request is already accepted conceptually, and the
    // execution path writes the same key again moments later.
    if let Err(e) = services.store.save(&key, &ResultItem::pending()).await {
        tracing::warn!(request_id = %request_id, error = %e, "failed to store pending placeholder");
    }

    let task = ScanTask {
        request_id,
        image: image.clone(),
        auth,
    };
    if let Err(e) = services.dispatcher.dispatch(task) {
        // Nothing will release the lock if the task never runs.
        if let Err(release_err) = services.lock.release(&lock_key).await {
            tracing::warn!(error = %release_err, "failed to release lock after dispatch failure");
        }
        return errors::json_error(
            StatusCode::SERVICE_UNAVAILABLE,
            "queue_unavailable",
            e.to_string(),
        );
    }

    tracing::info!(request_id = %request_id, image = %image, "scan request accepted");

    (
        StatusCode::ACCEPTED,
        Json(dto::ScanResponse { id: request_id }),
    )
        .into_response()
}

/// `GET /api/v1/scan/:request_id/report`: poll for the scan report.
pub async fn scan_report(
    Extension(services): Extension<AppServices>,
    Path(request_id): Path<String>,
) -> axum::response::Response {
    let request_id: RequestId = match request_id.parse() {
        Ok(id) => id,
        Err(_) => {
            return errors::json_error(
                StatusCode::BAD_REQUEST,
                "invalid_request_id",
                "request id must be a UUID",
            );
        }
    };

    let key = services.profile.result_key(request_id);
    let item = match services.store.get(&key).await {
        Ok(item) => item,
        Err(StoreError::NotFound) => {
            return errors::json_error(
                StatusCode::NOT_FOUND,
                "report_not_found",
                "no report for this scan request",
            );
        }
        // The true state is unknowable here; never guess on a backend fault.
        Err(e) => return errors::store_error_to_response(e),
    };

    match item.status {
        ScanStatus::Pending | ScanStatus::Ongoing => (
            StatusCode::ACCEPTED,
            [(header::RETRY_AFTER, RETRY_AFTER_SECS)],
            Json(serde_json::json!({
                "status": item.status,
                "message": "report is not ready yet",
            })),
        )
            .into_response(),
        ScanStatus::Error => {
            errors::json_error(StatusCode::INTERNAL_SERVER_ERROR, "scan_failed", item.error)
        }
        ScanStatus::Success => (
            StatusCode::OK,
            [(header::CONTENT_TYPE, services.profile.report_mime_type.clone())],
            item.payload,
        )
            .into_response(),
    }
}

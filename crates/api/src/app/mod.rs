//! Application wiring: service construction and the router.

use std::sync::Arc;

use anyhow::Context;
use axum::extract::Extension;
use axum::routing::{get, post};
use axum::Router;

use scanrelay_scanner::{
    CommandEngine, ScanDispatcher, ScanRunner, ScannerProfile, WorkerPoolConfig, WorkerPoolHandle,
};
use scanrelay_store::{
    InMemoryStore, RedisStore, RedisStoreConfig, ResultStore, TargetLock,
};

use crate::config::AppConfig;

pub mod dto;
pub mod errors;
pub mod routes;

/// Shared service handles injected into every request handler.
///
/// Constructed exactly once at process start; the store handles wrap a
/// single connection pool shared by the accept, poll, and worker contexts.
#[derive(Clone)]
pub struct AppServices {
    pub lock: Arc<dyn TargetLock>,
    pub store: Arc<dyn ResultStore>,
    pub dispatcher: ScanDispatcher,
    pub profile: Arc<ScannerProfile>,
}

/// Build the router over already-constructed services.
pub fn build_app(services: AppServices) -> Router {
    Router::new()
        .route("/healthz", get(routes::system::health))
        .nest(
            "/api/v1",
            Router::new()
                .route("/metadata", get(routes::system::metadata))
                .route("/scan", post(routes::scan::accept_scan))
                .route("/scan/:request_id/report", get(routes::scan::scan_report)),
        )
        .layer(Extension(services))
}

/// Wire stores, engine, and worker pool from configuration, returning the
/// ready-to-serve router and the worker pool handle.
pub async fn bootstrap(config: AppConfig) -> anyhow::Result<(Router, WorkerPoolHandle)> {
    let (lock, store): (Arc<dyn TargetLock>, Arc<dyn ResultStore>) = match &config.redis_url {
        Some(url) => {
            let store = RedisStore::connect(
                RedisStoreConfig::new(url.as_str())
                    .with_item_ttl(config.item_ttl)
                    .with_lock_ttl(config.lock_ttl),
            )
            .await
            .context("connect to redis result store")?;
            let store = Arc::new(store);
            (store.clone(), store)
        }
        None => {
            tracing::warn!("SCANRELAY_REDIS_URL not set; using in-memory result store");
            let store = Arc::new(InMemoryStore::with_ttls(config.item_ttl, config.lock_ttl));
            (store.clone(), store)
        }
    };

    let profile = Arc::new(ScannerProfile::default());
    let engine = Arc::new(CommandEngine::new(
        config.engine_command.clone(),
        config.engine_options(),
    ));
    let runner = Arc::new(ScanRunner::new(
        store.clone(),
        lock.clone(),
        engine,
        profile.clone(),
    ));

    let (dispatcher, pool) = scanrelay_scanner::worker::spawn(
        WorkerPoolConfig::default().with_workers(config.workers),
        runner,
    );

    let app = build_app(AppServices {
        lock,
        store,
        dispatcher,
        profile,
    });

    Ok((app, pool))
}

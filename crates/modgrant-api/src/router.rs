//! Router assembly and shared application state.

use std::sync::Arc;

use axum::{
    routing::{get, post},
    Router,
};
use sqlx::PgPool;

use crate::handlers::{access_requests, health, modules};
use crate::services::{AccessRequestService, ModuleService};

/// Shared state for all handlers.
#[derive(Clone)]
pub struct AppState {
    pub pool: PgPool,
    pub access_request_service: Arc<AccessRequestService>,
    pub module_service: Arc<ModuleService>,
}

impl AppState {
    /// Build application state around a connection pool.
    #[must_use]
    pub fn new(pool: PgPool) -> Self {
        Self {
            access_request_service: Arc::new(AccessRequestService::new(pool.clone())),
            module_service: Arc::new(ModuleService::new(pool.clone())),
            pool,
        }
    }
}

/// Build the API router.
///
/// Authentication is layered on by the caller so tests can exercise routes
/// without minting tokens.
pub fn api_router(state: AppState) -> Router {
    Router::new()
        .route(
            "/requests",
            post(access_requests::submit_request).get(access_requests::list_requests),
        )
        .route("/requests/:id", get(access_requests::get_request))
        .route("/requests/:id/renew", post(access_requests::renew_request))
        .route(
            "/requests/:id/cancel",
            post(access_requests::cancel_request),
        )
        .route("/modules", get(modules::list_modules))
        .route("/modules/available", get(modules::available_modules))
        .route("/health", get(health::health))
        .with_state(state)
}

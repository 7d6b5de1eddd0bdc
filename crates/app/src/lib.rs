//! Courier application composition root
//!
//! Composes the domain routers into a single application with an explicitly
//! constructed store handle: the pool is opened at process start, injected
//! into each component, and closed at shutdown. No global connection state.

use std::sync::Arc;

use axum::Router;
use courier_messaging::{MessagingService, MessagingState, PostgresStore};
use sqlx::PgPool;

/// Create the main application router with all routes and middleware
pub async fn create_app(pool: PgPool) -> Result<Router, anyhow::Error> {
    let store = PostgresStore::new(pool);
    let service = MessagingService::new(Arc::new(store));

    let messaging_state = MessagingState { service };

    let app = Router::new()
        .route("/health", axum::routing::get(health_check))
        .route("/", axum::routing::get(|| async { "Courier API v0.1.0" }))
        .merge(courier_messaging::routes().with_state(messaging_state));

    Ok(app)
}

/// Health check endpoint
async fn health_check() -> &'static str {
    "OK"
}

//! doormap-server library - REST service for building/door aggregates
//!
//! Owns the AggregateStore (buildings and their doors as one consistency
//! unit) and exposes it over a small CRUD surface.

use axum::Router;
use sqlx::SqlitePool;
use tower_http::cors::CorsLayer;

pub mod api;
pub mod store;

/// Application state shared across HTTP handlers
#[derive(Clone)]
pub struct AppState {
    /// Database connection pool
    pub db: SqlitePool,
}

impl AppState {
    /// Create new application state
    pub fn new(db: SqlitePool) -> Self {
        Self { db }
    }
}

/// Build application router
///
/// All endpoints accept any origin; the map front ends are served from
/// other hosts.
pub fn build_router(state: AppState) -> Router {
    use axum::routing::get;

    Router::new()
        .route(
            "/aggregates",
            get(api::list_aggregates).post(api::create_aggregate),
        )
        .route(
            "/aggregates/:id",
            get(api::get_aggregate)
                .put(api::update_aggregate)
                .delete(api::delete_aggregate),
        )
        .route("/health", get(api::health))
        .with_state(state)
        .layer(CorsLayer::permissive())
}

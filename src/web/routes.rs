//! # Route Definitions

use axum::routing::get;
use axum::Router;

use super::handlers;
use super::state::AppState;

/// Health routes
///
/// - `/health` - aggregated report (`?detailed=true` adds diagnostics)
/// - `/health/live` - process liveness, never runs probes
pub fn health_routes() -> Router<AppState> {
    Router::new()
        .route("/health", get(handlers::health::health_report))
        .route("/health/live", get(handlers::health::liveness_probe))
}

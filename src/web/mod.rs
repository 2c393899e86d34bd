//! # Web API Module
//!
//! Axum HTTP surface for the health engine.
//!
//! - [`routes`] - route table
//! - [`handlers`] - request handlers
//! - [`state`] - shared application state

pub mod handlers;
pub mod routes;
pub mod state;

use axum::Router;
use state::AppState;
use tower_http::trace::TraceLayer;

/// Create the Axum application with all routes and middleware
pub fn create_app(app_state: AppState) -> Router {
    Router::new()
        .merge(routes::health_routes())
        .layer(TraceLayer::new_for_http())
        .with_state(app_state)
}

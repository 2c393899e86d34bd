//! # Health Check Handlers
//!
//! Load-balancer facing endpoints. Only the top-level status decides the HTTP
//! code; the per-service entries are always returned for diagnosis.

use axum::extract::{Query, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::{Deserialize, Serialize};
use tracing::{debug, error};

use crate::error::HealthError;
use crate::health::HealthReporter;
use crate::web::state::AppState;

/// Query string for `GET /health`
#[derive(Debug, Clone, Copy, Default, Deserialize)]
pub struct HealthQuery {
    #[serde(default)]
    pub detailed: bool,
}

/// Body of `GET /health/live`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LivenessResponse {
    pub status: String,
    pub environment: String,
    pub timestamp: String,
}

/// Error body for programming errors surfaced by the engine
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: String,
}

impl IntoResponse for HealthError {
    fn into_response(self) -> Response {
        error!(error = %self, "Health report could not be produced");
        (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(ErrorResponse {
                error: self.to_string(),
            }),
        )
            .into_response()
    }
}

/// Aggregated health report: GET /health
///
/// 200 for healthy, warning and degraded; 503 for critical.
pub async fn health_report(
    State(state): State<AppState>,
    Query(query): Query<HealthQuery>,
) -> Result<Response, HealthError> {
    debug!(detailed = query.detailed, "Health report requested");

    let report = state.orchestrator.get_report(query.detailed).await?;
    let body = HealthReporter::format(&report, query.detailed);
    let code = StatusCode::from_u16(HealthReporter::http_status_code(report.overall_status))
        .unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);

    Ok((code, Json(body)).into_response())
}

/// Liveness probe: GET /health/live
pub async fn liveness_probe(State(state): State<AppState>) -> Json<LivenessResponse> {
    Json(LivenessResponse {
        status: "alive".to_string(),
        environment: state.config.environment.clone(),
        timestamp: chrono::Utc::now().to_rfc3339(),
    })
}

//! HTTP mapping through the Axum router

use axum::body::Body;
use axum::http::{Request, StatusCode};
use axum::response::IntoResponse;
use axum::Router;
use std::time::Duration;
use tower::ServiceExt;

use testsuite_health::config::HealthConfig;
use testsuite_health::error::{HealthError, ProbeError};
use testsuite_health::web::{create_app, state::AppState};

use crate::common::{mandatory, optional, orchestrator, StubProbe, TOTAL, TTL};

fn app(probes: &[(testsuite_health::health::ProbeSpec, &StubProbe)]) -> Router {
    let orch = orchestrator(probes, TTL, TOTAL);
    create_app(AppState::new(orch, HealthConfig::default()))
}

async fn get(app: Router, uri: &str) -> (StatusCode, serde_json::Value) {
    let response = app
        .oneshot(Request::builder().uri(uri).body(Body::empty()).unwrap())
        .await
        .unwrap();
    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    (status, serde_json::from_slice(&bytes).unwrap())
}

#[tokio::test]
async fn healthy_system_returns_200_without_diagnostics() {
    let db = StubProbe::healthy();
    let network = StubProbe::healthy();
    let app = app(&[
        (mandatory("db"), &db),
        (optional("network").detailed_only(true), &network),
    ]);

    let (status, body) = get(app, "/health").await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["overall_status"], "healthy");
    assert!(body.get("diagnostics").is_none());
    assert!(body["timestamp"].is_string());
    assert_eq!(network.calls(), 0);
}

#[tokio::test]
async fn detailed_query_includes_diagnostics() {
    let db = StubProbe::healthy();
    let network = StubProbe::healthy();
    let app = app(&[
        (mandatory("db"), &db),
        (optional("network").detailed_only(true), &network),
    ]);

    let (status, body) = get(app, "/health?detailed=true").await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["diagnostics"]["network"]["status"], "healthy");
    assert_eq!(body["services"]["db"]["status"], "healthy");
}

#[tokio::test]
async fn critical_system_returns_503_with_entries() {
    let db = StubProbe::failing(ProbeError::connection_failure("refused"));
    let grid = StubProbe::healthy();
    let app = app(&[(mandatory("db"), &db), (mandatory("grid"), &grid)]);

    let (status, body) = get(app, "/health").await;

    assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
    assert_eq!(body["overall_status"], "critical");
    assert_eq!(body["services"]["db"]["message"], "connection failure");
    assert_eq!(body["services"]["grid"]["status"], "healthy");
}

#[tokio::test(start_paused = true)]
async fn degraded_system_returns_200() {
    let db = StubProbe::healthy();
    let ai = StubProbe::healthy().delayed(Duration::from_secs(60));
    let app = app(&[
        (mandatory("db"), &db),
        (optional("ai").timeout(Duration::from_secs(10)), &ai),
    ]);

    let (status, body) = get(app, "/health").await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["overall_status"], "degraded");
    assert_eq!(body["services"]["ai"]["status"], "optional_unhealthy");
}

#[tokio::test]
async fn liveness_never_runs_probes() {
    let db = StubProbe::healthy();
    let app = app(&[(mandatory("db"), &db)]);

    let (status, body) = get(app, "/health/live").await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "alive");
    assert_eq!(body["environment"], "development");
    assert_eq!(db.calls(), 0);
}

#[tokio::test]
async fn liveness_reports_configured_environment() {
    let db = StubProbe::healthy();
    let config = HealthConfig {
        environment: "staging".to_string(),
        ..HealthConfig::default()
    };
    let app = create_app(AppState::new(
        orchestrator(&[(mandatory("db"), &db)], TTL, TOTAL),
        config,
    ));

    let (status, body) = get(app, "/health/live").await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["environment"], "staging");
}

#[tokio::test]
async fn engine_errors_map_to_500() {
    let response =
        HealthError::AggregationInvariantViolation("mandatory probe 'db' has no result".into())
            .into_response();
    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);

    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let body: serde_json::Value = serde_json::from_slice(&bytes).unwrap();
    assert!(body["error"].as_str().unwrap().contains("db"));
}

//! Report shape and status rollup through the full orchestration path

use std::time::Duration;

use testsuite_health::error::ProbeError;
use testsuite_health::health::{HealthReporter, Status};

use crate::common::{mandatory, optional, orchestrator, StubProbe, TOTAL, TTL};

#[tokio::test(start_paused = true)]
async fn every_scheduled_probe_yields_an_entry_even_when_all_fail() {
    let timeout = StubProbe::failing(ProbeError::timeout("slow"));
    let refused = StubProbe::failing(ProbeError::connection_failure("refused"));
    let internal = StubProbe::failing(ProbeError::internal("bad payload"));
    let hung = StubProbe::healthy().delayed(Duration::from_secs(600));
    let unknown = StubProbe::status(Status::Unknown);
    let optional_down = StubProbe::failing(ProbeError::connection_failure("refused"));

    let orch = orchestrator(
        &[
            (mandatory("database"), &timeout),
            (mandatory("browser_grid"), &refused),
            (mandatory("disk"), &internal),
            (mandatory("system_resources").timeout(Duration::from_secs(2)), &hung),
            (mandatory("permissions"), &unknown),
            (optional("ai_service"), &optional_down),
        ],
        TTL,
        TOTAL,
    );

    let report = orch.get_report(false).await.unwrap();

    assert_eq!(report.services.len(), 6);
    assert_eq!(report.overall_status, Status::Critical);
    assert_eq!(report.services["database"].message.as_deref(), Some("timeout"));
    assert_eq!(
        report.services["system_resources"].message.as_deref(),
        Some("timeout")
    );
    assert_eq!(report.services["disk"].message.as_deref(), Some("internal error"));
    assert_eq!(report.services["permissions"].status, Status::Unknown);
    assert_eq!(
        report.services["ai_service"].status,
        Status::OptionalUnhealthy
    );
}

#[tokio::test(start_paused = true)]
async fn all_probes_healthy() {
    let db = StubProbe::healthy();
    let grid = StubProbe::healthy();
    let orch = orchestrator(&[(mandatory("db"), &db), (mandatory("grid"), &grid)], TTL, TOTAL);

    let report = orch.get_report(false).await.unwrap();
    let json = serde_json::to_value(HealthReporter::format(&report, false)).unwrap();

    assert_eq!(json["overall_status"], "healthy");
    assert_eq!(json["services"]["db"]["status"], "healthy");
    assert_eq!(json["services"]["grid"]["status"], "healthy");
    assert!(json.get("diagnostics").is_none());
}

#[tokio::test(start_paused = true)]
async fn mandatory_connection_failure_is_critical() {
    let db = StubProbe::failing(ProbeError::connection_failure("connection refused"));
    let orch = orchestrator(&[(mandatory("db"), &db)], TTL, TOTAL);

    let report = orch.get_report(false).await.unwrap();
    let json = serde_json::to_value(HealthReporter::format(&report, false)).unwrap();

    assert_eq!(json["overall_status"], "critical");
    assert_eq!(json["services"]["db"]["status"], "critical");
    assert_eq!(json["services"]["db"]["message"], "connection failure");
    assert_eq!(
        HealthReporter::http_status_code(report.overall_status),
        503
    );
}

#[tokio::test(start_paused = true)]
async fn optional_timeout_degrades_but_never_criticals() {
    let db = StubProbe::healthy();
    let ai = StubProbe::healthy().delayed(Duration::from_secs(60));
    let orch = orchestrator(
        &[
            (mandatory("db"), &db),
            (optional("ai").timeout(Duration::from_secs(10)), &ai),
        ],
        TTL,
        TOTAL,
    );

    let report = orch.get_report(false).await.unwrap();
    let json = serde_json::to_value(HealthReporter::format(&report, false)).unwrap();

    assert_eq!(json["overall_status"], "degraded");
    assert_eq!(json["services"]["ai"]["status"], "optional_unhealthy");
    assert_eq!(json["services"]["ai"]["message"], "timeout");
    assert_eq!(HealthReporter::http_status_code(report.overall_status), 200);
}

#[tokio::test(start_paused = true)]
async fn mandatory_warning_outranks_optional_failure() {
    let grid = StubProbe::status(Status::Warning);
    let cache = StubProbe::failing(ProbeError::connection_failure("refused"));
    let orch = orchestrator(
        &[(mandatory("grid"), &grid), (optional("cache"), &cache)],
        TTL,
        TOTAL,
    );

    let report = orch.get_report(false).await.unwrap();
    assert_eq!(report.overall_status, Status::Warning);
}

#[tokio::test(start_paused = true)]
async fn optional_probe_reporting_critical_is_recorded_as_optional_unhealthy() {
    let db = StubProbe::healthy();
    let network = StubProbe::status(Status::Critical);
    let orch = orchestrator(
        &[(mandatory("db"), &db), (optional("network"), &network)],
        TTL,
        TOTAL,
    );

    let report = orch.get_report(false).await.unwrap();
    assert_eq!(report.services["network"].status, Status::OptionalUnhealthy);
    assert_eq!(report.overall_status, Status::OptionalUnhealthy);
}

#[tokio::test(start_paused = true)]
async fn empty_registry_reports_healthy() {
    let orch = orchestrator(&[], TTL, TOTAL);
    let report = orch.get_report(true).await.unwrap();

    assert!(report.services.is_empty());
    assert_eq!(report.overall_status, Status::Healthy);
    assert_eq!(report.diagnostics.as_ref().map(|d| d.len()), Some(0));
}

//! Per-probe timeouts and the overall pass deadline

use std::time::Duration;
use tokio::time::Instant;

use testsuite_health::health::Status;

use crate::common::{mandatory, optional, orchestrator, StubProbe, TTL};

#[tokio::test(start_paused = true)]
async fn probe_timeout_bounds_the_pass_not_the_total_deadline() {
    let grid = StubProbe::healthy().delayed(Duration::from_secs(120));
    let db = StubProbe::healthy();
    let orch = orchestrator(
        &[
            (mandatory("grid").timeout(Duration::from_secs(2)), &grid),
            (mandatory("db"), &db),
        ],
        TTL,
        Duration::from_secs(15),
    );

    let started = Instant::now();
    let report = orch.get_report(false).await.unwrap();
    let elapsed = started.elapsed();

    assert!(elapsed >= Duration::from_secs(2));
    assert!(elapsed < Duration::from_millis(2100));
    assert_eq!(report.services["grid"].status, Status::Critical);
    assert_eq!(report.services["grid"].message.as_deref(), Some("timeout"));
    assert_eq!(report.services["db"].status, Status::Healthy);
}

#[tokio::test(start_paused = true)]
async fn pass_deadline_caps_probes_with_long_timeouts() {
    let slow = StubProbe::healthy().delayed(Duration::from_secs(300));
    let fast = StubProbe::healthy();
    let orch = orchestrator(
        &[
            (optional("slow").timeout(Duration::from_secs(120)), &slow),
            (mandatory("fast"), &fast),
        ],
        TTL,
        Duration::from_secs(5),
    );

    let started = Instant::now();
    let report = orch.get_report(false).await.unwrap();

    assert!(started.elapsed() < Duration::from_millis(5100));
    assert_eq!(report.services.len(), 2);
    assert_eq!(report.services["slow"].status, Status::OptionalUnhealthy);
    assert_eq!(report.services["slow"].message.as_deref(), Some("timeout"));
    assert_eq!(report.overall_status, Status::OptionalUnhealthy);
}

#[tokio::test(start_paused = true)]
async fn late_results_never_reach_a_sealed_report() {
    let slow = StubProbe::healthy().delayed(Duration::from_secs(5));
    let orch = orchestrator(
        &[(mandatory("slow").timeout(Duration::from_secs(1)), &slow)],
        TTL,
        Duration::from_secs(15),
    );

    let report = orch.get_report(false).await.unwrap();
    assert_eq!(report.services["slow"].status, Status::Critical);

    tokio::time::sleep(Duration::from_secs(10)).await;

    assert_eq!(slow.calls(), 1);
    assert_eq!(slow.completions(), 0);
    let cached = orch.get_report(false).await.unwrap();
    assert_eq!(cached.services["slow"].status, Status::Critical);
}

#[tokio::test(start_paused = true)]
async fn probes_run_concurrently() {
    let a = StubProbe::healthy().delayed(Duration::from_secs(3));
    let b = StubProbe::healthy().delayed(Duration::from_secs(3));
    let c = StubProbe::healthy().delayed(Duration::from_secs(3));
    let orch = orchestrator(
        &[(mandatory("a"), &a), (mandatory("b"), &b), (optional("c"), &c)],
        TTL,
        Duration::from_secs(15),
    );

    let started = Instant::now();
    let report = orch.get_report(false).await.unwrap();

    assert!(started.elapsed() < Duration::from_secs(4));
    assert_eq!(report.overall_status, Status::Healthy);
}

//! TTL behaviour and per-detail-level cache keys

use std::sync::Arc;
use std::time::Duration;

use testsuite_health::health::{CacheState, DetailLevel};

use crate::common::{mandatory, optional, orchestrator, StubProbe, TOTAL, TTL};

#[tokio::test(start_paused = true)]
async fn reports_within_ttl_are_identical() {
    let db = StubProbe::healthy();
    let orch = orchestrator(&[(mandatory("db"), &db)], TTL, TOTAL);

    let first = orch.get_report(false).await.unwrap();
    tokio::time::advance(Duration::from_secs(29)).await;
    let second = orch.get_report(false).await.unwrap();

    assert!(Arc::ptr_eq(&first, &second));
    assert_eq!(first.timestamp, second.timestamp);
    assert_eq!(db.calls(), 1);
}

#[tokio::test(start_paused = true)]
async fn expired_report_triggers_a_new_pass() {
    let db = StubProbe::healthy();
    let orch = orchestrator(&[(mandatory("db"), &db)], TTL, TOTAL);

    let first = orch.get_report(false).await.unwrap();
    tokio::time::advance(Duration::from_secs(31)).await;
    assert_eq!(orch.cache().state(DetailLevel::Basic), CacheState::Stale);

    let second = orch.get_report(false).await.unwrap();
    assert!(!Arc::ptr_eq(&first, &second));
    assert_eq!(db.calls(), 2);
    assert_eq!(orch.cache().state(DetailLevel::Basic), CacheState::Ready);
}

#[tokio::test(start_paused = true)]
async fn detailed_request_after_basic_runs_a_fresh_pass() {
    let db = StubProbe::healthy();
    let network = StubProbe::healthy();
    let orch = orchestrator(
        &[
            (mandatory("db"), &db),
            (optional("network").detailed_only(true), &network),
        ],
        TTL,
        TOTAL,
    );

    let basic = orch.get_report(false).await.unwrap();
    assert!(basic.diagnostics.is_none());
    assert!(!basic.services.contains_key("network"));
    assert_eq!(network.calls(), 0);

    let detailed = orch.get_report(true).await.unwrap();
    assert_eq!(db.calls(), 2);
    assert_eq!(network.calls(), 1);
    assert!(detailed.services.contains_key("network"));
    assert!(detailed
        .diagnostics
        .as_ref()
        .is_some_and(|d| d.contains_key("network")));

    // basic entry is still served from cache
    let basic_again = orch.get_report(false).await.unwrap();
    assert!(Arc::ptr_eq(&basic, &basic_again));
    assert_eq!(db.calls(), 2);
}

#[tokio::test(start_paused = true)]
async fn degraded_reports_are_cached_like_healthy_ones() {
    let db = StubProbe::healthy();
    let ai = StubProbe::healthy().delayed(Duration::from_secs(60));
    let orch = orchestrator(
        &[
            (mandatory("db"), &db),
            (optional("ai").timeout(Duration::from_secs(1)), &ai),
        ],
        TTL,
        TOTAL,
    );

    orch.get_report(false).await.unwrap();
    orch.get_report(false).await.unwrap();
    assert_eq!(ai.calls(), 1);
}

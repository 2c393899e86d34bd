//! Concurrent callers share one pass per detail level

use futures::future::join_all;
use std::sync::Arc;
use std::time::Duration;

use crate::common::{mandatory, optional, orchestrator, StubProbe, TOTAL, TTL};

#[tokio::test(start_paused = true)]
async fn fifty_concurrent_callers_run_each_probe_once() {
    let db = StubProbe::healthy().delayed(Duration::from_millis(200));
    let grid = StubProbe::healthy().delayed(Duration::from_millis(50));
    let ai = StubProbe::healthy().delayed(Duration::from_millis(500));
    let orch = orchestrator(
        &[
            (mandatory("db"), &db),
            (mandatory("grid"), &grid),
            (optional("ai"), &ai),
        ],
        TTL,
        TOTAL,
    );

    let handles: Vec<_> = (0..50)
        .map(|_| {
            let orch = orch.clone();
            tokio::spawn(async move { orch.get_report(false).await })
        })
        .collect();

    let reports: Vec<_> = join_all(handles)
        .await
        .into_iter()
        .map(|joined| joined.unwrap().unwrap())
        .collect();

    assert_eq!(reports.len(), 50);
    assert_eq!(db.calls(), 1);
    assert_eq!(grid.calls(), 1);
    assert_eq!(ai.calls(), 1);
    assert!(reports.iter().all(|r| Arc::ptr_eq(r, &reports[0])));
}

#[tokio::test(start_paused = true)]
async fn detail_levels_do_not_share_a_pass() {
    let db = StubProbe::healthy().delayed(Duration::from_millis(100));
    let orch = orchestrator(&[(mandatory("db"), &db)], TTL, TOTAL);

    let calls = (0..10).map(|i| {
        let orch = orch.clone();
        async move { orch.get_report(i % 2 == 0).await.unwrap() }
    });
    let reports = join_all(calls).await;

    assert_eq!(db.calls(), 2);
    let basic: Vec<_> = reports.iter().filter(|r| r.diagnostics.is_none()).collect();
    assert_eq!(basic.len(), 5);
    assert!(basic.iter().all(|r| Arc::ptr_eq(*r, basic[0])));
}

#[tokio::test(start_paused = true)]
async fn callers_arriving_mid_pass_attach_to_it() {
    let db = StubProbe::healthy().delayed(Duration::from_secs(2));
    let orch = orchestrator(&[(mandatory("db"), &db)], TTL, TOTAL);

    let early = {
        let orch = orch.clone();
        tokio::spawn(async move { orch.get_report(false).await })
    };
    tokio::time::sleep(Duration::from_secs(1)).await;
    let late = orch.get_report(false).await.unwrap();
    let early = early.await.unwrap().unwrap();

    assert!(Arc::ptr_eq(&early, &late));
    assert_eq!(db.calls(), 1);
}

#[tokio::test(start_paused = true)]
async fn abandoned_callers_do_not_cancel_the_pass() {
    let db = StubProbe::healthy().delayed(Duration::from_secs(1));
    let orch = orchestrator(&[(mandatory("db"), &db)], TTL, TOTAL);

    let caller = {
        let orch = orch.clone();
        tokio::spawn(async move { orch.get_report(false).await })
    };
    tokio::time::sleep(Duration::from_millis(100)).await;
    caller.abort();

    tokio::time::sleep(Duration::from_secs(2)).await;
    assert_eq!(db.completions(), 1);

    let report = orch.get_report(false).await.unwrap();
    assert_eq!(report.services.len(), 1);
    assert_eq!(db.calls(), 1);
}

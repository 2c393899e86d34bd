//! Shared probe stubs and builders for integration tests

use async_trait::async_trait;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use testsuite_health::error::{ProbeError, ProbeOutcome};
use testsuite_health::health::{
    HealthOrchestrator, Probe, ProbeRegistry, ProbeResult, ProbeSpec, ResultCache, Status,
};

/// Probe stub with a call counter, an optional delay and a fixed outcome
#[derive(Clone)]
pub struct StubProbe {
    calls: Arc<AtomicUsize>,
    completions: Arc<AtomicUsize>,
    delay: Duration,
    outcome: ProbeOutcome,
}

impl StubProbe {
    pub fn new(outcome: ProbeOutcome) -> Self {
        Self {
            calls: Arc::new(AtomicUsize::new(0)),
            completions: Arc::new(AtomicUsize::new(0)),
            delay: Duration::ZERO,
            outcome,
        }
    }

    pub fn healthy() -> Self {
        Self::new(Ok(ProbeResult::healthy()))
    }

    pub fn status(status: Status) -> Self {
        Self::new(Ok(ProbeResult::new(status)))
    }

    pub fn failing(error: ProbeError) -> Self {
        Self::new(Err(error))
    }

    pub fn delayed(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }

    /// Number of times `execute` was entered
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    /// Number of times `execute` ran to completion
    pub fn completions(&self) -> usize {
        self.completions.load(Ordering::SeqCst)
    }

    pub fn shared(&self) -> Arc<dyn Probe> {
        Arc::new(self.clone())
    }
}

#[async_trait]
impl Probe for StubProbe {
    async fn execute(&self) -> ProbeOutcome {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if !self.delay.is_zero() {
            tokio::time::sleep(self.delay).await;
        }
        self.completions.fetch_add(1, Ordering::SeqCst);
        self.outcome.clone()
    }
}

pub fn mandatory(name: &str) -> ProbeSpec {
    ProbeSpec::new(name).mandatory(true)
}

pub fn optional(name: &str) -> ProbeSpec {
    ProbeSpec::new(name)
}

/// Build an orchestrator over the given probes
pub fn orchestrator(
    probes: &[(ProbeSpec, &StubProbe)],
    ttl: Duration,
    total_timeout: Duration,
) -> HealthOrchestrator {
    let mut registry = ProbeRegistry::new();
    for (spec, probe) in probes {
        registry
            .register(spec.clone(), probe.shared())
            .expect("probe names in tests are unique");
    }
    HealthOrchestrator::new(Arc::new(registry), ResultCache::new(ttl), total_timeout)
}

pub const TTL: Duration = Duration::from_secs(30);
pub const TOTAL: Duration = Duration::from_secs(15);

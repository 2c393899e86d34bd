//! # Probe Interface
//!
//! A probe is a named, independently executable check against one dependency.
//! Collaborators implement [`Probe`] (or wrap a closure in [`FnProbe`]) and
//! register it together with a [`ProbeSpec`] describing how the orchestrator
//! should schedule it.
//!
//! Probes must be safe to invoke concurrently and must not share mutable state
//! with other probes.

use async_trait::async_trait;
use std::fmt;
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use crate::error::ProbeOutcome;

/// Default per-probe timeout
pub const DEFAULT_PROBE_TIMEOUT: Duration = Duration::from_secs(10);

/// A health check against one dependency
#[async_trait]
pub trait Probe: Send + Sync {
    /// Run the check once
    async fn execute(&self) -> ProbeOutcome;
}

/// Scheduling metadata for a registered probe
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProbeSpec {
    pub name: String,
    /// A critical mandatory probe forces the overall status to critical
    pub mandatory: bool,
    pub timeout: Duration,
    /// Only scheduled on detailed passes
    pub detailed_only: bool,
}

impl ProbeSpec {
    /// Optional, baseline probe with the default timeout
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            mandatory: false,
            timeout: DEFAULT_PROBE_TIMEOUT,
            detailed_only: false,
        }
    }

    #[must_use]
    pub fn mandatory(mut self, mandatory: bool) -> Self {
        self.mandatory = mandatory;
        self
    }

    #[must_use]
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    #[must_use]
    pub fn detailed_only(mut self, detailed_only: bool) -> Self {
        self.detailed_only = detailed_only;
        self
    }
}

/// A probe together with its scheduling metadata
#[derive(Clone)]
pub struct RegisteredProbe {
    pub spec: ProbeSpec,
    pub probe: Arc<dyn Probe>,
}

impl RegisteredProbe {
    pub fn new(spec: ProbeSpec, probe: Arc<dyn Probe>) -> Self {
        Self { spec, probe }
    }

    pub fn name(&self) -> &str {
        &self.spec.name
    }
}

impl fmt::Debug for RegisteredProbe {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RegisteredProbe")
            .field("spec", &self.spec)
            .field("probe", &"dyn Probe")
            .finish()
    }
}

/// Adapter turning a no-argument async closure into a [`Probe`]
///
/// ```rust
/// use std::sync::Arc;
/// use testsuite_health::health::{FnProbe, Probe, ProbeRegistry, ProbeResult, ProbeSpec};
///
/// # tokio_test::block_on(async {
/// let probe = FnProbe::new(|| async { Ok(ProbeResult::healthy()) });
/// assert!(probe.execute().await.is_ok());
///
/// let mut registry = ProbeRegistry::new();
/// registry.register(ProbeSpec::new("noop"), Arc::new(probe)).unwrap();
/// assert!(registry.contains("noop"));
/// # });
/// ```
pub struct FnProbe<F> {
    check: F,
}

impl<F, Fut> FnProbe<F>
where
    F: Fn() -> Fut + Send + Sync,
    Fut: Future<Output = ProbeOutcome> + Send,
{
    pub fn new(check: F) -> Self {
        Self { check }
    }
}

#[async_trait]
impl<F, Fut> Probe for FnProbe<F>
where
    F: Fn() -> Fut + Send + Sync,
    Fut: Future<Output = ProbeOutcome> + Send,
{
    async fn execute(&self) -> ProbeOutcome {
        (self.check)().await
    }
}

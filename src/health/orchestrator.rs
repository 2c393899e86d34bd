//! # Health Orchestrator
//!
//! Fan-out/fan-in over the registered probes.
//!
//! One pass:
//!
//! 1. ask the [`ResultCache`] for a fresh report at the requested detail level
//! 2. otherwise become (or attach to) the single in-flight executor
//! 3. spawn one task per probe, each bounded by its own timeout
//! 4. collect every task, bounded by the overall pass deadline
//! 5. aggregate and seal an immutable [`HealthReport`]
//!
//! Probe failures of any kind are converted into degraded results here and
//! never propagate to the caller. A probe that misses its deadline is aborted;
//! a late result is dropped with the task and cannot touch a sealed report.

use chrono::Utc;
use std::collections::BTreeMap;
use std::sync::Arc;
use std::time::Duration;
use tokio::time::Instant;
use tracing::{debug, error, info, warn};

use super::aggregator::StatusAggregator;
use super::cache::ResultCache;
use super::probe::{ProbeSpec, RegisteredProbe};
use super::registry::ProbeRegistry;
use super::types::{DetailLevel, HealthReport, ProbeResult, Status};
use crate::config::HealthConfig;
use crate::error::{HealthResult, ProbeError};

/// Default overall pass deadline
pub const DEFAULT_TOTAL_TIMEOUT: Duration = Duration::from_secs(15);

/// Runs health passes and serves cached reports
#[derive(Clone)]
pub struct HealthOrchestrator {
    registry: Arc<ProbeRegistry>,
    cache: ResultCache,
    aggregator: StatusAggregator,
    total_timeout: Duration,
}

impl std::fmt::Debug for HealthOrchestrator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HealthOrchestrator")
            .field("probe_count", &self.registry.len())
            .field("cache", &self.cache)
            .field("total_timeout_ms", &(self.total_timeout.as_millis() as u64))
            .finish()
    }
}

impl HealthOrchestrator {
    pub fn new(registry: Arc<ProbeRegistry>, cache: ResultCache, total_timeout: Duration) -> Self {
        Self {
            registry,
            cache,
            aggregator: StatusAggregator::new(),
            total_timeout,
        }
    }

    /// Build from configuration with a fresh cache
    pub fn from_config(registry: Arc<ProbeRegistry>, config: &HealthConfig) -> Self {
        Self::new(
            registry,
            ResultCache::new(config.cache_ttl()),
            config.total_timeout(),
        )
    }

    pub fn registry(&self) -> &Arc<ProbeRegistry> {
        &self.registry
    }

    pub fn cache(&self) -> &ResultCache {
        &self.cache
    }

    /// Get the current report for a detail level
    ///
    /// Downstream outages are reported inside the report, never as errors.
    /// An `Err` here means a programming error (broken aggregation invariant
    /// or an executor task that panicked).
    pub async fn get_report(&self, detailed: bool) -> HealthResult<Arc<HealthReport>> {
        let detail = DetailLevel::from(detailed);
        let this = self.clone();

        self.cache
            .get_or_compute(detail, move || async move { this.run_pass(detail).await })
            .await
    }

    /// Run one uncached pass
    pub async fn run_pass(&self, detail: DetailLevel) -> HealthResult<HealthReport> {
        let started = Instant::now();
        let deadline = started + self.total_timeout;
        let include_detailed = detail.is_detailed();
        let probes = self.registry.list(include_detailed);

        debug!(
            detail = %detail,
            probe_count = probes.len(),
            total_timeout_ms = self.total_timeout.as_millis() as u64,
            "Starting health pass"
        );

        let tasks: Vec<_> = probes
            .into_iter()
            .map(|registered| {
                let spec = registered.spec.clone();
                let handle = tokio::spawn(execute_probe(registered));
                (spec, handle)
            })
            .collect();

        let mut services = BTreeMap::new();
        let mut detailed_names = Vec::new();

        for (spec, mut handle) in tasks {
            let result = match tokio::time::timeout_at(deadline, &mut handle).await {
                Ok(Ok(result)) => result,
                Ok(Err(join_error)) => {
                    error!(probe = %spec.name, error = %join_error, "Probe task panicked");
                    degraded_result(&spec, &ProbeError::internal(join_error.to_string()))
                }
                Err(_elapsed) => {
                    handle.abort();
                    warn!(
                        probe = %spec.name,
                        total_timeout_ms = self.total_timeout.as_millis() as u64,
                        "Probe still pending at pass deadline"
                    );
                    degraded_result(
                        &spec,
                        &ProbeError::timeout(format!(
                            "pass deadline of {}ms elapsed",
                            self.total_timeout.as_millis()
                        )),
                    )
                }
            };

            if spec.detailed_only {
                detailed_names.push(spec.name.clone());
            }
            services.insert(spec.name, result);
        }

        let mandatory = self.registry.mandatory_names(include_detailed);
        let overall_status = self.aggregator.aggregate(&services, &mandatory)?;

        let diagnostics = include_detailed.then(|| {
            detailed_names
                .iter()
                .filter_map(|name| services.get(name).map(|r| (name.clone(), r.clone())))
                .collect::<BTreeMap<_, _>>()
        });

        let duration_ms = started.elapsed().as_millis() as u64;

        info!(
            detail = %detail,
            overall_status = %overall_status,
            probe_count = services.len(),
            duration_ms = duration_ms,
            "Health pass complete"
        );

        Ok(HealthReport {
            timestamp: Utc::now(),
            detail,
            overall_status,
            services,
            diagnostics,
            duration_ms,
        })
    }
}

/// Run one probe under its own timeout and convert any failure
async fn execute_probe(registered: RegisteredProbe) -> ProbeResult {
    let RegisteredProbe { spec, probe } = registered;

    match tokio::time::timeout(spec.timeout, probe.execute()).await {
        Ok(Ok(result)) => normalize_result(&spec, result),
        Ok(Err(probe_error)) => degraded_result(&spec, &probe_error),
        Err(_elapsed) => degraded_result(
            &spec,
            &ProbeError::timeout(format!(
                "no result within {}ms",
                spec.timeout.as_millis()
            )),
        ),
    }
}

/// Keep the mandatory/optional boundary in the recorded result
///
/// An optional probe cannot report `critical`; it is recorded as
/// `optional_unhealthy` with its message and metrics intact.
fn normalize_result(spec: &ProbeSpec, mut result: ProbeResult) -> ProbeResult {
    if !spec.mandatory && result.status == Status::Critical {
        result.status = Status::OptionalUnhealthy;
    }

    match result.status {
        Status::Critical => error!(
            probe = %spec.name,
            message = result.message.as_deref().unwrap_or(""),
            "Mandatory probe reported critical"
        ),
        Status::Warning | Status::OptionalUnhealthy => warn!(
            probe = %spec.name,
            status = %result.status,
            message = result.message.as_deref().unwrap_or(""),
            "Probe reported degraded status"
        ),
        Status::Healthy | Status::Unknown => {}
    }

    result
}

/// Result recorded for a probe that failed, panicked or timed out
fn degraded_result(spec: &ProbeSpec, probe_error: &ProbeError) -> ProbeResult {
    let status = if spec.mandatory {
        Status::Critical
    } else {
        Status::OptionalUnhealthy
    };

    if spec.mandatory {
        error!(probe = %spec.name, error = %probe_error, "Mandatory probe failed");
    } else {
        warn!(probe = %spec.name, error = %probe_error, "Optional probe failed");
    }

    ProbeResult::new(status)
        .with_message(probe_error.summary())
        .with_metric("error_kind", probe_error.kind())
        .with_metric("error_detail", probe_error.detail())
}

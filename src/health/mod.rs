//! # Health Aggregation
//!
//! Cached, single-flight health reporting over a registry of independent
//! probes.
//!
//! ## Architecture
//!
//! ```text
//! GET /health ──► HealthOrchestrator::get_report(detailed)
//!                   │
//!                   ├─ ResultCache (fresh report? return it)
//!                   │
//!                   └─ single in-flight pass per detail level
//!                        ├─ ProbeRegistry::list(detailed)
//!                        ├─ one task per probe, each with its own timeout
//!                        ├─ StatusAggregator::aggregate
//!                        └─ seal HealthReport, store with expiry
//!
//!                 HealthReporter::format ──► JSON response
//! ```
//!
//! ## Status Rollup
//!
//! - any mandatory probe `critical` → `critical` (HTTP 503)
//! - any mandatory probe `warning`/`unknown` → `warning`
//! - any optional probe unhealthy → `degraded`
//! - otherwise `healthy`

pub mod aggregator;
pub mod cache;
pub mod orchestrator;
pub mod probe;
pub mod probes;
pub mod registry;
pub mod reporter;
pub mod types;

pub use aggregator::StatusAggregator;
pub use cache::{CacheState, ResultCache, DEFAULT_CACHE_TTL};
pub use orchestrator::{HealthOrchestrator, DEFAULT_TOTAL_TIMEOUT};
pub use probe::{FnProbe, Probe, ProbeSpec, RegisteredProbe, DEFAULT_PROBE_TIMEOUT};
pub use probes::{build_default_registry, classify_usage};
pub use registry::ProbeRegistry;
pub use reporter::{HealthReporter, HealthResponse};
pub use types::{DetailLevel, HealthReport, MetricValue, ProbeResult, Status};

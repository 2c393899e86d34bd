//! # Health Types
//!
//! Shared value types for the health subsystem: probe statuses, probe results
//! and the sealed per-pass [`HealthReport`].

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

// =============================================================================
// Status
// =============================================================================

/// Health status of a single probe or of the whole system
///
/// ## Severity
///
/// Rollup uses a total order `Healthy < OptionalUnhealthy < Warning < Critical`.
/// `Unknown` has no rank of its own - it ranks as `Warning` and is always logged
/// as an anomaly when it reaches the aggregator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Status {
    Healthy,
    Warning,
    Critical,
    OptionalUnhealthy,
    Unknown,
}

impl Status {
    /// Rollup rank (higher is worse)
    #[must_use]
    pub const fn severity(&self) -> u8 {
        match self {
            Self::Healthy => 0,
            Self::OptionalUnhealthy => 1,
            Self::Warning | Self::Unknown => 2,
            Self::Critical => 3,
        }
    }

    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Healthy => "healthy",
            Self::Warning => "warning",
            Self::Critical => "critical",
            Self::OptionalUnhealthy => "optional_unhealthy",
            Self::Unknown => "unknown",
        }
    }

    /// Label shown to callers for an overall status.
    ///
    /// `OptionalUnhealthy` is rendered as `degraded`; every other status keeps
    /// its own name.
    #[must_use]
    pub const fn overall_label(&self) -> &'static str {
        match self {
            Self::OptionalUnhealthy => "degraded",
            other => other.as_str(),
        }
    }
}

impl fmt::Display for Status {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// =============================================================================
// Metrics
// =============================================================================

/// Scalar metric value reported by a probe
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum MetricValue {
    Bool(bool),
    Int(i64),
    Float(f64),
    Text(String),
}

impl From<bool> for MetricValue {
    fn from(value: bool) -> Self {
        Self::Bool(value)
    }
}

impl From<i64> for MetricValue {
    fn from(value: i64) -> Self {
        Self::Int(value)
    }
}

impl From<u16> for MetricValue {
    fn from(value: u16) -> Self {
        Self::Int(i64::from(value))
    }
}

impl From<u32> for MetricValue {
    fn from(value: u32) -> Self {
        Self::Int(i64::from(value))
    }
}

impl From<u64> for MetricValue {
    fn from(value: u64) -> Self {
        Self::Int(i64::try_from(value).unwrap_or(i64::MAX))
    }
}

impl From<usize> for MetricValue {
    fn from(value: usize) -> Self {
        Self::Int(i64::try_from(value).unwrap_or(i64::MAX))
    }
}

impl From<f64> for MetricValue {
    fn from(value: f64) -> Self {
        Self::Float(value)
    }
}

impl From<&str> for MetricValue {
    fn from(value: &str) -> Self {
        Self::Text(value.to_string())
    }
}

impl From<String> for MetricValue {
    fn from(value: String) -> Self {
        Self::Text(value)
    }
}

// =============================================================================
// Probe Result
// =============================================================================

/// Outcome of one probe execution
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProbeResult {
    pub status: Status,
    #[serde(default)]
    pub metrics: BTreeMap<String, MetricValue>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

impl ProbeResult {
    #[must_use]
    pub fn new(status: Status) -> Self {
        Self {
            status,
            metrics: BTreeMap::new(),
            message: None,
        }
    }

    #[must_use]
    pub fn healthy() -> Self {
        Self::new(Status::Healthy)
    }

    #[must_use]
    pub fn with_metric(mut self, key: impl Into<String>, value: impl Into<MetricValue>) -> Self {
        self.metrics.insert(key.into(), value.into());
        self
    }

    #[must_use]
    pub fn with_message(mut self, message: impl Into<String>) -> Self {
        self.message = Some(message.into());
        self
    }
}

// =============================================================================
// Detail Level
// =============================================================================

/// Detail level of a pass; also the cache and single-flight key
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DetailLevel {
    Basic,
    Detailed,
}

impl DetailLevel {
    #[must_use]
    pub const fn is_detailed(&self) -> bool {
        matches!(self, Self::Detailed)
    }
}

impl From<bool> for DetailLevel {
    fn from(detailed: bool) -> Self {
        if detailed {
            Self::Detailed
        } else {
            Self::Basic
        }
    }
}

impl fmt::Display for DetailLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Basic => f.write_str("basic"),
            Self::Detailed => f.write_str("detailed"),
        }
    }
}

// =============================================================================
// Health Report
// =============================================================================

/// Immutable result of one orchestration pass
///
/// `services` holds exactly one entry per probe scheduled for the pass. On a
/// detailed pass `diagnostics` additionally holds the results of the
/// detailed-only probes.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct HealthReport {
    pub timestamp: DateTime<Utc>,
    pub detail: DetailLevel,
    pub overall_status: Status,
    pub services: BTreeMap<String, ProbeResult>,
    pub diagnostics: Option<BTreeMap<String, ProbeResult>>,
    /// Wall-clock duration of the pass
    pub duration_ms: u64,
}

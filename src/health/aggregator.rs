//! # Status Aggregator
//!
//! Reduces per-probe results to one overall [`Status`]. The rule, in priority
//! order:
//!
//! 1. any mandatory probe `critical` → `critical`
//! 2. any mandatory probe `warning` or `unknown` → `warning`
//! 3. any probe `optional_unhealthy`, or any optional probe not healthy
//!    → `optional_unhealthy` (rendered as `degraded`)
//! 4. otherwise `healthy`
//!
//! An optional dependency can degrade the system but never make it critical.
//! The reduction is commutative: result order never changes the outcome.

use std::collections::{BTreeMap, HashSet};
use tracing::warn;

use super::types::{ProbeResult, Status};
use crate::error::{HealthError, HealthResult};

#[derive(Debug, Clone, Copy, Default)]
pub struct StatusAggregator;

impl StatusAggregator {
    #[must_use]
    pub const fn new() -> Self {
        Self
    }

    /// Compute the overall status
    ///
    /// Every mandatory name must have a result; a missing entry means the
    /// orchestrator dropped a probe and is reported as
    /// [`HealthError::AggregationInvariantViolation`].
    pub fn aggregate(
        &self,
        results: &BTreeMap<String, ProbeResult>,
        mandatory_names: &HashSet<String>,
    ) -> HealthResult<Status> {
        if let Some(missing) = mandatory_names
            .iter()
            .find(|name| !results.contains_key(name.as_str()))
        {
            return Err(HealthError::AggregationInvariantViolation(format!(
                "mandatory probe '{missing}' has no result"
            )));
        }

        let mut mandatory_critical = false;
        let mut mandatory_warning = false;
        let mut degraded = false;

        for (name, result) in results {
            let mandatory = mandatory_names.contains(name);

            if result.status == Status::Unknown {
                warn!(
                    probe = %name,
                    mandatory = mandatory,
                    message = result.message.as_deref().unwrap_or(""),
                    "Report anomaly: probe returned unknown status"
                );
            }

            match (mandatory, result.status) {
                (_, Status::Healthy) => {}
                (true, Status::Critical) => mandatory_critical = true,
                (true, Status::Warning | Status::Unknown) => mandatory_warning = true,
                (_, Status::OptionalUnhealthy) => degraded = true,
                (false, _) => degraded = true,
            }
        }

        let overall = if mandatory_critical {
            Status::Critical
        } else if mandatory_warning {
            Status::Warning
        } else if degraded {
            Status::OptionalUnhealthy
        } else {
            Status::Healthy
        };

        Ok(overall)
    }
}

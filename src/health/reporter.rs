//! # Health Reporter
//!
//! Read-only projection of a sealed [`HealthReport`] into the wire shape served
//! over HTTP. No probe is invoked here.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use super::types::{HealthReport, ProbeResult, Status};

/// HTTP status for a healthy, warning or degraded system
pub const HTTP_OK: u16 = 200;
/// HTTP status for a critical system (remove from rotation)
pub const HTTP_SERVICE_UNAVAILABLE: u16 = 503;

/// Wire representation of a health report
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HealthResponse {
    /// `healthy`, `warning`, `critical` or `degraded`
    pub overall_status: String,
    /// RFC 3339 timestamp of the pass
    pub timestamp: String,
    pub services: BTreeMap<String, ProbeResult>,
    /// Present only on detailed responses
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub diagnostics: Option<BTreeMap<String, ProbeResult>>,
}

#[derive(Debug, Clone, Copy, Default)]
pub struct HealthReporter;

impl HealthReporter {
    /// Project a report for the requested detail level
    ///
    /// Basic mode never carries `diagnostics`, even when the underlying report
    /// has them.
    #[must_use]
    pub fn format(report: &HealthReport, detailed: bool) -> HealthResponse {
        HealthResponse {
            overall_status: report.overall_status.overall_label().to_string(),
            timestamp: report.timestamp.to_rfc3339(),
            services: report.services.clone(),
            diagnostics: if detailed {
                Some(report.diagnostics.clone().unwrap_or_default())
            } else {
                None
            },
        }
    }

    /// Map the overall status to an HTTP status code
    #[must_use]
    pub const fn http_status_code(status: Status) -> u16 {
        match status {
            Status::Critical => HTTP_SERVICE_UNAVAILABLE,
            _ => HTTP_OK,
        }
    }
}

//! CPU and memory usage probe.

use async_trait::async_trait;
use sysinfo::System;

use super::{classify_usage, round1, worse};
use crate::config::Threshold;
use crate::error::{ProbeError, ProbeOutcome};
use crate::health::probe::Probe;
use crate::health::types::{ProbeResult, Status};

/// Point-in-time resource usage
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ResourceSnapshot {
    pub cpu_percent: f64,
    pub memory_percent: f64,
    pub cpu_count: usize,
    pub total_memory_bytes: u64,
}

impl ResourceSnapshot {
    /// Measure the host
    ///
    /// Blocks for [`sysinfo::MINIMUM_CPU_UPDATE_INTERVAL`] between the two CPU
    /// refreshes that usage is computed from.
    pub fn capture() -> Self {
        let mut sys = System::new();
        sys.refresh_memory();
        sys.refresh_cpu_usage();
        std::thread::sleep(sysinfo::MINIMUM_CPU_UPDATE_INTERVAL);
        sys.refresh_cpu_usage();

        let total = sys.total_memory();
        let memory_percent = if total == 0 {
            f64::NAN
        } else {
            sys.used_memory() as f64 / total as f64 * 100.0
        };

        Self {
            cpu_percent: f64::from(sys.global_cpu_usage()),
            memory_percent,
            cpu_count: sys.cpus().len(),
            total_memory_bytes: total,
        }
    }
}

#[derive(Debug, Clone)]
pub struct SystemResourcesProbe {
    cpu: Threshold,
    memory: Threshold,
}

impl SystemResourcesProbe {
    pub fn new(cpu: Threshold, memory: Threshold) -> Self {
        Self { cpu, memory }
    }

    /// Classify a snapshot; the worse of CPU and memory wins
    pub fn evaluate(&self, snapshot: &ResourceSnapshot) -> ProbeResult {
        let cpu_status = classify_usage(snapshot.cpu_percent, self.cpu.warning, self.cpu.critical);
        let memory_status = classify_usage(
            snapshot.memory_percent,
            self.memory.warning,
            self.memory.critical,
        );

        let mut result = ProbeResult::new(worse(cpu_status, memory_status))
            .with_metric("cpu_count", snapshot.cpu_count)
            .with_metric("total_memory_bytes", snapshot.total_memory_bytes);

        if snapshot.cpu_percent.is_finite() {
            result = result.with_metric("cpu_percent", round1(snapshot.cpu_percent));
        }
        if snapshot.memory_percent.is_finite() {
            result = result.with_metric("memory_percent", round1(snapshot.memory_percent));
        }

        let mut notes = Vec::new();
        if cpu_status != Status::Healthy {
            notes.push(format!("cpu {cpu_status}"));
        }
        if memory_status != Status::Healthy {
            notes.push(format!("memory {memory_status}"));
        }
        if !notes.is_empty() {
            result = result.with_message(notes.join(", "));
        }

        result
    }
}

#[async_trait]
impl Probe for SystemResourcesProbe {
    async fn execute(&self) -> ProbeOutcome {
        let snapshot = tokio::task::spawn_blocking(ResourceSnapshot::capture)
            .await
            .map_err(|e| ProbeError::internal(format!("resource sampling failed: {e}")))?;
        Ok(self.evaluate(&snapshot))
    }
}

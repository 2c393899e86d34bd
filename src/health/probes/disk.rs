//! Filesystem usage probe.

use async_trait::async_trait;
use std::path::{Path, PathBuf};
use sysinfo::Disks;

use super::{classify_usage, round1};
use crate::config::Threshold;
use crate::error::{ProbeError, ProbeOutcome};
use crate::health::probe::Probe;
use crate::health::types::{ProbeResult, Status};

/// Space figures for the filesystem holding the probed path
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DiskUsage {
    pub mount_point: PathBuf,
    pub total_bytes: u64,
    pub available_bytes: u64,
}

impl DiskUsage {
    pub fn used_percent(&self) -> f64 {
        if self.total_bytes == 0 {
            return f64::NAN;
        }
        let used = self.total_bytes.saturating_sub(self.available_bytes);
        used as f64 / self.total_bytes as f64 * 100.0
    }
}

/// Find the disk whose mount point is the longest prefix of `path`
pub fn usage_for_path(path: &Path) -> Option<DiskUsage> {
    let path = std::fs::canonicalize(path).unwrap_or_else(|_| path.to_path_buf());
    let disks = Disks::new_with_refreshed_list();

    disks
        .list()
        .iter()
        .filter(|disk| path.starts_with(disk.mount_point()))
        .max_by_key(|disk| disk.mount_point().as_os_str().len())
        .map(|disk| DiskUsage {
            mount_point: disk.mount_point().to_path_buf(),
            total_bytes: disk.total_space(),
            available_bytes: disk.available_space(),
        })
}

#[derive(Debug, Clone)]
pub struct DiskProbe {
    path: PathBuf,
    threshold: Threshold,
}

impl DiskProbe {
    pub fn new(path: PathBuf, threshold: Threshold) -> Self {
        Self { path, threshold }
    }

    pub fn evaluate(&self, usage: &DiskUsage) -> ProbeResult {
        let percent = usage.used_percent();
        let status = classify_usage(percent, self.threshold.warning, self.threshold.critical);

        let mut result = ProbeResult::new(status)
            .with_metric("path", self.path.display().to_string())
            .with_metric("mount_point", usage.mount_point.display().to_string())
            .with_metric("total_bytes", usage.total_bytes)
            .with_metric("available_bytes", usage.available_bytes);

        if percent.is_finite() {
            result = result.with_metric("used_percent", round1(percent));
        }

        match status {
            Status::Healthy => result,
            Status::Unknown => result.with_message("filesystem reports zero capacity"),
            _ => result.with_message(format!("disk usage {:.1}%", percent)),
        }
    }
}

#[async_trait]
impl Probe for DiskProbe {
    async fn execute(&self) -> ProbeOutcome {
        let path = self.path.clone();
        let usage = tokio::task::spawn_blocking(move || usage_for_path(&path))
            .await
            .map_err(|e| ProbeError::internal(format!("disk sampling failed: {e}")))?
            .ok_or_else(|| {
                ProbeError::internal(format!(
                    "no mounted filesystem contains {}",
                    self.path.display()
                ))
            })?;

        Ok(self.evaluate(&usage))
    }
}

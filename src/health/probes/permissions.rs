//! Writable-directory probe.
//!
//! For every configured directory: create it if missing, write a uniquely
//! named marker file, then remove it.

use async_trait::async_trait;
use std::path::{Path, PathBuf};
use tracing::debug;

use crate::error::ProbeOutcome;
use crate::health::probe::Probe;
use crate::health::types::{ProbeResult, Status};

#[derive(Debug, Clone)]
pub struct PermissionsProbe {
    paths: Vec<PathBuf>,
}

impl PermissionsProbe {
    pub fn new(paths: Vec<PathBuf>) -> Self {
        Self { paths }
    }
}

async fn check_writable(dir: &Path) -> std::io::Result<()> {
    tokio::fs::create_dir_all(dir).await?;
    let marker = dir.join(format!(".health-probe-{}", uuid::Uuid::new_v4()));
    tokio::fs::write(&marker, b"ok").await?;
    tokio::fs::remove_file(&marker).await
}

#[async_trait]
impl Probe for PermissionsProbe {
    async fn execute(&self) -> ProbeOutcome {
        let mut failures = Vec::new();

        for path in &self.paths {
            if let Err(e) = check_writable(path).await {
                debug!(path = %path.display(), error = %e, "Directory not writable");
                failures.push(format!("{} ({})", path.display(), e.kind()));
            }
        }

        let status = if failures.is_empty() {
            Status::Healthy
        } else {
            Status::Critical
        };

        let result = ProbeResult::new(status)
            .with_metric("checked_paths", self.paths.len())
            .with_metric("unwritable_paths", failures.len());

        Ok(if failures.is_empty() {
            result
        } else {
            result.with_message(format!("not writable: {}", failures.join(", ")))
        })
    }
}

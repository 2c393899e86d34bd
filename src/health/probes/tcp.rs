//! TCP reachability probes.
//!
//! [`TcpConnectProbe`] checks one service endpoint (the cache server).
//! [`NetworkReachabilityProbe`] checks a list of outbound targets and reports
//! partial reachability as a warning.

use async_trait::async_trait;
use futures::future::join_all;
use std::time::{Duration, Instant};
use tokio::net::TcpStream;

use crate::error::{ProbeError, ProbeOutcome};
use crate::health::probe::Probe;
use crate::health::types::{ProbeResult, Status};

/// Connect once and measure latency
async fn connect(address: &str) -> Result<Duration, ProbeError> {
    let start = Instant::now();
    TcpStream::connect(address).await?;
    Ok(start.elapsed())
}

#[derive(Debug, Clone)]
pub struct TcpConnectProbe {
    address: String,
}

impl TcpConnectProbe {
    pub fn new(address: impl Into<String>) -> Self {
        Self {
            address: address.into(),
        }
    }
}

#[async_trait]
impl Probe for TcpConnectProbe {
    async fn execute(&self) -> ProbeOutcome {
        let latency = connect(&self.address).await?;
        Ok(ProbeResult::healthy()
            .with_metric("address", self.address.as_str())
            .with_metric("latency_ms", latency.as_millis() as u64))
    }
}

#[derive(Debug, Clone)]
pub struct NetworkReachabilityProbe {
    targets: Vec<String>,
    connect_timeout: Duration,
}

impl NetworkReachabilityProbe {
    pub fn new(targets: Vec<String>, connect_timeout: Duration) -> Self {
        Self {
            targets,
            connect_timeout,
        }
    }

    async fn check(&self, target: &str) -> bool {
        matches!(
            tokio::time::timeout(self.connect_timeout, connect(target)).await,
            Ok(Ok(_))
        )
    }
}

#[async_trait]
impl Probe for NetworkReachabilityProbe {
    async fn execute(&self) -> ProbeOutcome {
        if self.targets.is_empty() {
            return Ok(ProbeResult::healthy()
                .with_metric("targets", 0_usize)
                .with_message("no targets configured"));
        }

        let outcomes = join_all(self.targets.iter().map(|t| self.check(t))).await;
        let unreachable: Vec<&str> = self
            .targets
            .iter()
            .zip(&outcomes)
            .filter(|(_, ok)| !**ok)
            .map(|(t, _)| t.as_str())
            .collect();

        let status = match unreachable.len() {
            0 => Status::Healthy,
            n if n == self.targets.len() => Status::Critical,
            _ => Status::Warning,
        };

        let result = ProbeResult::new(status)
            .with_metric("targets", self.targets.len())
            .with_metric("reachable", self.targets.len() - unreachable.len());

        Ok(if unreachable.is_empty() {
            result
        } else {
            result.with_message(format!("unreachable: {}", unreachable.join(", ")))
        })
    }
}

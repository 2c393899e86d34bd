//! # Database Probe
//!
//! Runs `SELECT 1` over the shared PostgreSQL pool and reports pool
//! utilisation. Connection saturation is classified against
//! `thresholds.database_connections` (percent of the pool maximum).

use async_trait::async_trait;
use sqlx::postgres::PgPoolOptions;
use sqlx::PgPool;
use std::time::{Duration, Instant};
use tracing::debug;

use super::{classify_usage, round1};
use crate::config::Threshold;
use crate::error::{HealthError, HealthResult, ProbeOutcome};
use crate::health::probe::Probe;
use crate::health::types::{ProbeResult, Status};

/// Pool size used when the probe owns its pool
pub const DEFAULT_MAX_CONNECTIONS: u32 = 5;

/// Pool figures sampled after the check query
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PoolSnapshot {
    pub size: u32,
    pub idle: usize,
    pub max_connections: u32,
}

impl PoolSnapshot {
    pub fn active(&self) -> u32 {
        let idle = u32::try_from(self.idle).unwrap_or(u32::MAX);
        self.size.saturating_sub(idle)
    }

    pub fn utilization_percent(&self) -> f64 {
        if self.max_connections == 0 {
            return f64::NAN;
        }
        f64::from(self.active()) / f64::from(self.max_connections) * 100.0
    }
}

#[derive(Debug, Clone)]
pub struct DatabaseProbe {
    pool: PgPool,
    max_connections: u32,
    threshold: Threshold,
}

impl DatabaseProbe {
    /// Wrap an existing pool
    pub fn new(pool: PgPool, max_connections: u32, threshold: Threshold) -> Self {
        Self {
            pool,
            max_connections,
            threshold,
        }
    }

    /// Create a dedicated lazy pool; no connection is made until first use
    pub fn connect_lazy(
        database_url: &str,
        acquire_timeout: Duration,
        threshold: Threshold,
    ) -> HealthResult<Self> {
        let pool = PgPoolOptions::new()
            .max_connections(DEFAULT_MAX_CONNECTIONS)
            .acquire_timeout(acquire_timeout)
            .connect_lazy(database_url)
            .map_err(|e| HealthError::Configuration(format!("invalid database_url: {e}")))?;

        Ok(Self::new(pool, DEFAULT_MAX_CONNECTIONS, threshold))
    }

    pub fn evaluate(&self, snapshot: &PoolSnapshot, latency: Duration) -> ProbeResult {
        let utilization = snapshot.utilization_percent();
        let status = classify_usage(utilization, self.threshold.warning, self.threshold.critical);

        let mut result = ProbeResult::new(status)
            .with_metric("pool_size", snapshot.size)
            .with_metric("idle_connections", snapshot.idle)
            .with_metric("active_connections", snapshot.active())
            .with_metric("max_connections", snapshot.max_connections)
            .with_metric("latency_ms", latency.as_millis() as u64);

        if utilization.is_finite() {
            result = result.with_metric("utilization_percent", round1(utilization));
        }

        match status {
            Status::Healthy => result,
            Status::Unknown => result.with_message("pool maximum is zero"),
            _ => result.with_message(format!(
                "connection pool {:.0}% utilised",
                utilization
            )),
        }
    }
}

#[async_trait]
impl Probe for DatabaseProbe {
    async fn execute(&self) -> ProbeOutcome {
        let start = Instant::now();
        sqlx::query("SELECT 1").execute(&self.pool).await?;
        let latency = start.elapsed();

        let snapshot = PoolSnapshot {
            size: self.pool.size(),
            idle: self.pool.num_idle(),
            max_connections: self.max_connections,
        };

        debug!(
            latency_ms = latency.as_millis() as u64,
            pool_size = snapshot.size,
            idle = snapshot.idle,
            "Database health check successful"
        );

        Ok(self.evaluate(&snapshot, latency))
    }
}

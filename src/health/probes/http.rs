//! # HTTP Probes
//!
//! - [`BrowserGridProbe`]: `GET {grid_url}/status`, reading the grid's
//!   `value.ready` flag and node count
//! - [`AiServiceProbe`]: authenticated `GET` against the AI provider's models
//!   endpoint; reports `disabled` when no API key is configured
//! - [`EnvironmentHealthProbe`]: `GET` against each deployed test environment's
//!   health URL, recording status code and latency per environment

use async_trait::async_trait;
use futures::future::join_all;
use reqwest::{Client, StatusCode};
use std::collections::BTreeMap;
use std::time::{Duration, Instant};

use crate::error::{HealthError, HealthResult, ProbeError, ProbeOutcome};
use crate::health::probe::Probe;
use crate::health::types::{ProbeResult, Status};

fn build_client(timeout: Duration) -> HealthResult<Client> {
    Client::builder()
        .timeout(timeout)
        .user_agent(concat!("testsuite-health/", env!("CARGO_PKG_VERSION")))
        .build()
        .map_err(|e| HealthError::Configuration(format!("failed to build HTTP client: {e}")))
}

// =============================================================================
// Browser Grid
// =============================================================================

#[derive(Debug, Clone)]
pub struct BrowserGridProbe {
    client: Client,
    status_url: String,
}

impl BrowserGridProbe {
    pub fn new(grid_url: &str, timeout: Duration) -> HealthResult<Self> {
        Ok(Self {
            client: build_client(timeout)?,
            status_url: format!("{}/status", grid_url.trim_end_matches('/')),
        })
    }

    pub fn status_url(&self) -> &str {
        &self.status_url
    }
}

/// Classify a grid `/status` response
pub fn evaluate_grid_status(status: StatusCode, body: &serde_json::Value) -> ProbeResult {
    if !status.is_success() {
        return ProbeResult::new(Status::Critical)
            .with_metric("http_status", status.as_u16())
            .with_message(format!("grid returned HTTP {}", status.as_u16()));
    }

    let value = &body["value"];
    let nodes = value["nodes"].as_array().map_or(0, Vec::len);

    let result = ProbeResult::new(Status::Healthy)
        .with_metric("http_status", status.as_u16())
        .with_metric("nodes", nodes);

    match value["ready"].as_bool() {
        Some(true) => result.with_metric("ready", true),
        Some(false) => {
            let mut result = result.with_metric("ready", false);
            result.status = Status::Warning;
            let message = value["message"].as_str().unwrap_or("grid not ready");
            result.with_message(message)
        }
        None => {
            let mut result = result;
            result.status = Status::Unknown;
            result.with_message("unrecognised grid status payload")
        }
    }
}

#[async_trait]
impl Probe for BrowserGridProbe {
    async fn execute(&self) -> ProbeOutcome {
        let start = Instant::now();
        let response = self.client.get(&self.status_url).send().await?;
        let status = response.status();
        let body = if status.is_success() {
            response.json::<serde_json::Value>().await?
        } else {
            serde_json::Value::Null
        };

        Ok(evaluate_grid_status(status, &body)
            .with_metric("latency_ms", start.elapsed().as_millis() as u64))
    }
}

// =============================================================================
// AI Service
// =============================================================================

#[derive(Debug, Clone)]
pub struct AiServiceProbe {
    client: Client,
    url: String,
    api_key: Option<String>,
}

impl AiServiceProbe {
    pub fn new(url: &str, api_key: Option<String>, timeout: Duration) -> HealthResult<Self> {
        Ok(Self {
            client: build_client(timeout)?,
            url: url.to_string(),
            api_key: api_key.filter(|k| !k.trim().is_empty()),
        })
    }

    pub fn is_enabled(&self) -> bool {
        self.api_key.is_some()
    }
}

/// Classify the provider's response code
pub fn evaluate_ai_status(status: StatusCode) -> ProbeResult {
    let result = ProbeResult::new(Status::Healthy)
        .with_metric("enabled", true)
        .with_metric("http_status", status.as_u16());

    let (severity, message) = match status {
        s if s.is_success() => return result,
        StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => {
            (Status::Warning, "API key rejected".to_string())
        }
        StatusCode::TOO_MANY_REQUESTS => (Status::Warning, "rate limited".to_string()),
        s if s.is_server_error() => (
            Status::Critical,
            format!("AI service returned HTTP {}", s.as_u16()),
        ),
        s => (
            Status::Warning,
            format!("unexpected HTTP {}", s.as_u16()),
        ),
    };

    let mut result = result.with_message(message);
    result.status = severity;
    result
}

#[async_trait]
impl Probe for AiServiceProbe {
    async fn execute(&self) -> ProbeOutcome {
        let Some(api_key) = self.api_key.as_deref() else {
            return Ok(ProbeResult::healthy()
                .with_metric("enabled", false)
                .with_message("disabled"));
        };

        let start = Instant::now();
        let response = self
            .client
            .get(&self.url)
            .bearer_auth(api_key)
            .send()
            .await
            .map_err(ProbeError::from)?;

        Ok(evaluate_ai_status(response.status())
            .with_metric("latency_ms", start.elapsed().as_millis() as u64))
    }
}

// =============================================================================
// Test Environments
// =============================================================================

#[derive(Debug, Clone)]
pub struct EnvironmentHealthProbe {
    client: Client,
    environments: BTreeMap<String, String>,
}

impl EnvironmentHealthProbe {
    pub fn new(environments: BTreeMap<String, String>, timeout: Duration) -> HealthResult<Self> {
        Ok(Self {
            client: build_client(timeout)?,
            environments,
        })
    }

    async fn check(&self, url: &str) -> Result<(StatusCode, u64), ProbeError> {
        let start = Instant::now();
        let response = self.client.get(url).send().await?;
        Ok((response.status(), start.elapsed().as_millis() as u64))
    }
}

#[async_trait]
impl Probe for EnvironmentHealthProbe {
    async fn execute(&self) -> ProbeOutcome {
        if self.environments.is_empty() {
            return Ok(ProbeResult::healthy()
                .with_metric("environments", 0_usize)
                .with_message("no environments configured"));
        }

        let checks = join_all(
            self.environments
                .iter()
                .map(|(name, url)| async move { (name, self.check(url).await) }),
        )
        .await;

        let mut result = ProbeResult::healthy().with_metric("environments", checks.len());
        let mut failing = Vec::new();

        for (name, outcome) in checks {
            match outcome {
                Ok((status, latency_ms)) => {
                    result = result
                        .with_metric(format!("{name}_http_status"), status.as_u16())
                        .with_metric(format!("{name}_latency_ms"), latency_ms);
                    if !status.is_success() {
                        failing.push(name.as_str());
                    }
                }
                Err(e) => {
                    result = result.with_metric(format!("{name}_error"), e.kind());
                    failing.push(name.as_str());
                }
            }
        }

        result = result.with_metric(
            "healthy_environments",
            self.environments.len() - failing.len(),
        );
        if failing.is_empty() {
            return Ok(result);
        }

        result.status = if failing.len() == self.environments.len() {
            Status::Critical
        } else {
            Status::Warning
        };
        Ok(result.with_message(format!("unhealthy environments: {}", failing.join(", "))))
    }
}

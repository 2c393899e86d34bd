//! Configuration audit probe.
//!
//! Flags settings that are unsafe or incomplete for the running environment.
//! Only presence is captured from the configuration; secrets are never held.

use async_trait::async_trait;

use crate::config::{HealthConfig, DEVELOPMENT_SECRET_KEY};
use crate::error::ProbeOutcome;
use crate::health::probe::Probe;
use crate::health::types::{ProbeResult, Status};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConfigAuditProbe {
    environment: String,
    production: bool,
    secret_key_set: bool,
    secret_key_is_default: bool,
    ai_api_key_set: bool,
    database_url_set: bool,
}

/// A single audit finding
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Finding {
    pub status: Status,
    pub message: &'static str,
}

impl ConfigAuditProbe {
    pub fn from_config(config: &HealthConfig) -> Self {
        let secret = config.secret_key.as_deref().map(str::trim);
        Self {
            environment: config.environment.clone(),
            production: config.is_production(),
            secret_key_set: secret.is_some_and(|s| !s.is_empty()),
            secret_key_is_default: secret == Some(DEVELOPMENT_SECRET_KEY),
            ai_api_key_set: config
                .ai_api_key
                .as_deref()
                .is_some_and(|k| !k.trim().is_empty()),
            database_url_set: config.database_url.is_some(),
        }
    }

    pub fn findings(&self) -> Vec<Finding> {
        let mut findings = Vec::new();

        if self.production && !self.secret_key_set {
            findings.push(Finding {
                status: Status::Critical,
                message: "secret key not set in production",
            });
        }
        if self.production && self.secret_key_is_default {
            findings.push(Finding {
                status: Status::Critical,
                message: "development secret key used in production",
            });
        }
        if !self.ai_api_key_set {
            findings.push(Finding {
                status: Status::Warning,
                message: "AI API key not configured",
            });
        }
        if !self.database_url_set {
            findings.push(Finding {
                status: Status::Warning,
                message: "database URL not configured",
            });
        }

        findings
    }
}

#[async_trait]
impl Probe for ConfigAuditProbe {
    async fn execute(&self) -> ProbeOutcome {
        let findings = self.findings();
        let status = findings
            .iter()
            .map(|f| f.status)
            .max_by_key(Status::severity)
            .unwrap_or(Status::Healthy);

        let result = ProbeResult::new(status)
            .with_metric("environment", self.environment.as_str())
            .with_metric("findings", findings.len());

        Ok(if findings.is_empty() {
            result
        } else {
            let messages: Vec<_> = findings.iter().map(|f| f.message).collect();
            result.with_message(messages.join("; "))
        })
    }
}

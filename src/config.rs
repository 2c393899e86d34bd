//! # Health Configuration
//!
//! Layered configuration for the health engine:
//!
//! 1. built-in defaults ([`HealthConfig::default`])
//! 2. an optional TOML file named by `HEALTH_CONFIG_PATH`
//! 3. `HEALTH_*` environment variables (`HEALTH_CACHE_TTL_SECONDS`,
//!    `HEALTH_PROBE_TIMEOUT_SECONDS`, `HEALTH_TOTAL_TIMEOUT_SECONDS`,
//!    `HEALTH_DATABASE_URL`, ...)
//!
//! The mandatory/optional split of each probe is configuration as well, via
//! the `[probes.<name>]` tables.

use config::{Config, Environment, File};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::{debug, warn};

use crate::error::{HealthError, HealthResult};

/// Environment variable naming an optional TOML configuration file
pub const CONFIG_PATH_ENV: &str = "HEALTH_CONFIG_PATH";

/// Prefix for environment overrides
pub const ENV_PREFIX: &str = "HEALTH";

/// Keys that hold comma-separated lists when set through the environment
const LIST_KEYS: [&str; 2] = ["network_targets", "writable_paths"];

/// Secret shipped with the development configuration
pub const DEVELOPMENT_SECRET_KEY: &str = "dev-secret-key-change-in-production";

// =============================================================================
// Configuration Types
// =============================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct HealthConfig {
    /// Report time-to-live (seconds)
    pub cache_ttl_seconds: u64,
    /// Default per-probe timeout (seconds)
    pub probe_timeout_seconds: u64,
    /// Overall pass deadline (seconds)
    pub total_timeout_seconds: u64,
    /// Address for the HTTP listener
    pub bind_address: String,
    /// Deployment environment (development, test, production)
    pub environment: String,
    pub database_url: Option<String>,
    /// Cache server `host:port`
    pub cache_address: Option<String>,
    /// Browser-automation grid base URL
    pub grid_url: Option<String>,
    pub ai_api_url: String,
    pub ai_api_key: Option<String>,
    pub secret_key: Option<String>,
    /// `host:port` targets for the network reachability check
    pub network_targets: Vec<String>,
    /// Directories the service must be able to write to
    pub writable_paths: Vec<PathBuf>,
    /// Path whose filesystem is measured by the disk probe
    pub disk_path: PathBuf,
    /// Health URLs of the deployed test environments, keyed by environment name
    pub environment_urls: BTreeMap<String, String>,
    pub thresholds: ResourceThresholds,
    /// Per-probe overrides keyed by probe name
    pub probes: HashMap<String, ProbeOverride>,
}

impl Default for HealthConfig {
    fn default() -> Self {
        Self {
            cache_ttl_seconds: 30,
            probe_timeout_seconds: 10,
            total_timeout_seconds: 15,
            bind_address: "0.0.0.0:8081".to_string(),
            environment: "development".to_string(),
            database_url: None,
            cache_address: None,
            grid_url: None,
            ai_api_url: "https://api.openai.com/v1/models".to_string(),
            ai_api_key: None,
            secret_key: None,
            network_targets: vec!["1.1.1.1:443".to_string()],
            writable_paths: vec![PathBuf::from("artifacts"), PathBuf::from("screenshots")],
            disk_path: PathBuf::from("/"),
            environment_urls: BTreeMap::new(),
            thresholds: ResourceThresholds::default(),
            probes: HashMap::new(),
        }
    }
}

/// Warning/critical percentage pair
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Threshold {
    pub warning: f64,
    pub critical: f64,
}

impl Threshold {
    pub const fn new(warning: f64, critical: f64) -> Self {
        Self { warning, critical }
    }
}

/// Classification thresholds for raw resource metrics (percent)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ResourceThresholds {
    pub cpu: Threshold,
    pub memory: Threshold,
    pub disk: Threshold,
    /// Active connections as a share of the pool maximum
    pub database_connections: Threshold,
}

impl Default for ResourceThresholds {
    fn default() -> Self {
        Self {
            cpu: Threshold::new(80.0, 95.0),
            memory: Threshold::new(85.0, 95.0),
            disk: Threshold::new(85.0, 95.0),
            database_connections: Threshold::new(80.0, 95.0),
        }
    }
}

/// Per-probe scheduling override
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ProbeOverride {
    pub mandatory: Option<bool>,
    pub timeout_seconds: Option<u64>,
    pub enabled: Option<bool>,
}

/// Effective scheduling settings for one probe
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ProbeSettings {
    pub enabled: bool,
    pub mandatory: bool,
    pub timeout: Duration,
}

impl HealthConfig {
    pub fn cache_ttl(&self) -> Duration {
        Duration::from_secs(self.cache_ttl_seconds)
    }

    pub fn probe_timeout(&self) -> Duration {
        Duration::from_secs(self.probe_timeout_seconds)
    }

    pub fn total_timeout(&self) -> Duration {
        Duration::from_secs(self.total_timeout_seconds)
    }

    pub fn is_production(&self) -> bool {
        self.environment.eq_ignore_ascii_case("production")
    }

    /// Resolve the scheduling settings for a probe
    ///
    /// Probe timeouts longer than the pass deadline are clamped to it.
    pub fn probe_settings(&self, name: &str, default_mandatory: bool) -> ProbeSettings {
        let override_ = self.probes.get(name).cloned().unwrap_or_default();

        let requested = override_
            .timeout_seconds
            .map_or_else(|| self.probe_timeout(), Duration::from_secs);
        let timeout = if requested > self.total_timeout() {
            warn!(
                probe = name,
                timeout_secs = requested.as_secs(),
                total_timeout_secs = self.total_timeout_seconds,
                "Probe timeout exceeds the pass deadline; clamping"
            );
            self.total_timeout()
        } else {
            requested
        };

        ProbeSettings {
            enabled: override_.enabled.unwrap_or(true),
            mandatory: override_.mandatory.unwrap_or(default_mandatory),
            timeout,
        }
    }

    /// Reject configurations the engine cannot run with
    pub fn validate(&self) -> HealthResult<()> {
        for (field, value) in [
            ("cache_ttl_seconds", self.cache_ttl_seconds),
            ("probe_timeout_seconds", self.probe_timeout_seconds),
            ("total_timeout_seconds", self.total_timeout_seconds),
        ] {
            if value == 0 {
                return Err(HealthError::Configuration(format!(
                    "{field} must be greater than zero"
                )));
            }
        }

        for (name, threshold) in [
            ("cpu", self.thresholds.cpu),
            ("memory", self.thresholds.memory),
            ("disk", self.thresholds.disk),
            ("database_connections", self.thresholds.database_connections),
        ] {
            if !(threshold.warning < threshold.critical) {
                return Err(HealthError::Configuration(format!(
                    "thresholds.{name}: warning ({}) must be below critical ({})",
                    threshold.warning, threshold.critical
                )));
            }
        }

        if let Some((name, _)) = self
            .probes
            .iter()
            .find(|(_, o)| o.timeout_seconds == Some(0))
        {
            return Err(HealthError::Configuration(format!(
                "probes.{name}.timeout_seconds must be greater than zero"
            )));
        }

        Ok(())
    }

    /// JSON view with secrets masked, for logging
    pub fn sanitized(&self) -> serde_json::Value {
        let mut value = serde_json::to_value(self).unwrap_or(serde_json::Value::Null);
        sanitize_json(&mut value);
        value
    }
}

const SENSITIVE_PATTERNS: [&str; 4] = ["key", "secret", "password", "token"];

fn sanitize_json(value: &mut serde_json::Value) {
    match value {
        serde_json::Value::Object(map) => {
            for (key, val) in map.iter_mut() {
                let key_lower = key.to_lowercase();
                if SENSITIVE_PATTERNS.iter().any(|p| key_lower.contains(p)) {
                    if !val.is_null() {
                        *val = serde_json::Value::String("[MASKED]".to_string());
                    }
                } else if key_lower.ends_with("url") {
                    if let Some(url) = val.as_str() {
                        *val = serde_json::Value::String(mask_url_credentials(url));
                    }
                } else if key_lower.ends_with("urls") {
                    if let Some(urls) = val.as_object_mut() {
                        for url in urls.values_mut() {
                            if let Some(masked) = url.as_str().map(mask_url_credentials) {
                                *url = serde_json::Value::String(masked);
                            }
                        }
                    }
                } else {
                    sanitize_json(val);
                }
            }
        }
        serde_json::Value::Array(items) => items.iter_mut().for_each(sanitize_json),
        _ => {}
    }
}

/// Mask `user:password@` in a connection URL
fn mask_url_credentials(url: &str) -> String {
    let Some(scheme_end) = url.find("://") else {
        return url.to_string();
    };
    let rest = &url[scheme_end + 3..];
    match rest.rfind('@') {
        Some(at) => format!("{}://***@{}", &url[..scheme_end], &rest[at + 1..]),
        None => url.to_string(),
    }
}

// =============================================================================
// Loader
// =============================================================================

/// Stateless configuration loader
#[derive(Debug)]
pub struct ConfigLoader;

impl ConfigLoader {
    /// Load from `HEALTH_CONFIG_PATH` (if set) and the process environment
    pub fn load() -> HealthResult<HealthConfig> {
        let path = std::env::var(CONFIG_PATH_ENV).ok().map(PathBuf::from);
        Self::load_from(path.as_deref(), None)
    }

    /// Load with an explicit file and, optionally, an explicit environment map
    ///
    /// Passing `Some(env)` replaces the process environment, which keeps tests
    /// independent of the host.
    pub fn load_from(
        path: Option<&Path>,
        env: Option<HashMap<String, String>>,
    ) -> HealthResult<HealthConfig> {
        let defaults = Config::try_from(&HealthConfig::default())?;

        let mut environment = Environment::with_prefix(ENV_PREFIX)
            .try_parsing(true)
            .list_separator(",");
        for key in LIST_KEYS {
            environment = environment.with_list_parse_key(key);
        }
        if let Some(env) = env {
            environment = environment.source(Some(env.into_iter().collect()));
        }

        let mut builder = Config::builder().add_source(defaults);
        if let Some(path) = path {
            debug!(path = %path.display(), "Loading health configuration file");
            builder = builder.add_source(File::from(path).required(true));
        }

        let config: HealthConfig = builder
            .add_source(environment)
            .build()?
            .try_deserialize()?;

        config.validate()?;

        debug!(config = %config.sanitized(), "Health configuration loaded");

        Ok(config)
    }
}

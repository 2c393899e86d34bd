//! # Built-in Probes
//!
//! Adapters for the dependencies of the test-suite server. Each one satisfies
//! the [`Probe`] contract and is registered by [`build_default_registry`]
//! under a fixed name:
//!
//! | name               | default   | pass      | checks                          |
//! |--------------------|-----------|-----------|---------------------------------|
//! | `database`         | mandatory | basic     | `SELECT 1` + pool utilisation   |
//! | `cache`            | optional  | basic     | TCP connect to the cache server |
//! | `browser_grid`     | mandatory | basic     | grid `/status` readiness        |
//! | `ai_service`       | optional  | basic     | models endpoint with API key    |
//! | `system_resources` | mandatory | basic     | CPU and memory usage            |
//! | `disk`             | mandatory | basic     | filesystem usage                |
//! | `network`          | optional  | detailed  | TCP reachability of targets     |
//! | `environments`     | optional  | detailed  | test environment health URLs    |
//! | `permissions`      | mandatory | detailed  | writable working directories    |
//! | `config_audit`     | optional  | detailed  | insecure or missing settings    |
//!
//! The mandatory flag, timeout and enablement of each probe can be overridden
//! through `[probes.<name>]` in the configuration.

pub mod config_audit;
pub mod database;
pub mod disk;
pub mod http;
pub mod permissions;
pub mod system;
pub mod tcp;

use std::sync::Arc;
use std::time::Duration;
use tracing::{info, warn};

use super::probe::{Probe, ProbeSpec};
use super::registry::ProbeRegistry;
use super::types::Status;
use crate::config::{HealthConfig, ProbeSettings};
use crate::error::HealthResult;

pub use config_audit::ConfigAuditProbe;
pub use database::DatabaseProbe;
pub use disk::DiskProbe;
pub use http::{AiServiceProbe, BrowserGridProbe, EnvironmentHealthProbe};
pub use permissions::PermissionsProbe;
pub use system::SystemResourcesProbe;
pub use tcp::{NetworkReachabilityProbe, TcpConnectProbe};

pub const DATABASE: &str = "database";
pub const CACHE: &str = "cache";
pub const BROWSER_GRID: &str = "browser_grid";
pub const AI_SERVICE: &str = "ai_service";
pub const SYSTEM_RESOURCES: &str = "system_resources";
pub const DISK: &str = "disk";
pub const NETWORK: &str = "network";
pub const ENVIRONMENTS: &str = "environments";
pub const PERMISSIONS: &str = "permissions";
pub const CONFIG_AUDIT: &str = "config_audit";

/// Upper bound for a single TCP connect attempt inside the network probe
const MAX_CONNECT_TIMEOUT: Duration = Duration::from_secs(3);

/// Classify a usage percentage against a warning/critical pair
///
/// Non-finite input (a failed measurement) is `unknown`.
#[must_use]
pub fn classify_usage(percent: f64, warning: f64, critical: f64) -> Status {
    if !percent.is_finite() {
        Status::Unknown
    } else if percent < warning {
        Status::Healthy
    } else if percent < critical {
        Status::Warning
    } else {
        Status::Critical
    }
}

/// The worse of two statuses by rollup severity
#[must_use]
pub(crate) fn worse(a: Status, b: Status) -> Status {
    if b.severity() > a.severity() {
        b
    } else {
        a
    }
}

/// Round to one decimal place for reporting
pub(crate) fn round1(value: f64) -> f64 {
    (value * 10.0).round() / 10.0
}

/// Build the registry of built-in probes for a configuration
///
/// Probes whose backing configuration is absent are skipped with a warning.
/// Must be called inside a Tokio runtime: the database pool is created
/// lazily but owns background maintenance tasks.
pub fn build_default_registry(config: &HealthConfig) -> HealthResult<ProbeRegistry> {
    let mut builder = RegistryBuilder::new(config);

    match config.database_url.as_deref() {
        Some(url) => {
            if let Some(settings) = builder.settings(DATABASE, true) {
                let probe = DatabaseProbe::connect_lazy(
                    url,
                    settings.timeout,
                    config.thresholds.database_connections,
                )?;
                builder.add(DATABASE, settings, false, Arc::new(probe))?;
            }
        }
        None => builder.skip(DATABASE, "database_url"),
    }

    match config.cache_address.as_deref() {
        Some(address) => {
            if let Some(settings) = builder.settings(CACHE, false) {
                let probe = TcpConnectProbe::new(address);
                builder.add(CACHE, settings, false, Arc::new(probe))?;
            }
        }
        None => builder.skip(CACHE, "cache_address"),
    }

    match config.grid_url.as_deref() {
        Some(url) => {
            if let Some(settings) = builder.settings(BROWSER_GRID, true) {
                let probe = BrowserGridProbe::new(url, settings.timeout)?;
                builder.add(BROWSER_GRID, settings, false, Arc::new(probe))?;
            }
        }
        None => builder.skip(BROWSER_GRID, "grid_url"),
    }

    if let Some(settings) = builder.settings(AI_SERVICE, false) {
        let probe = AiServiceProbe::new(
            &config.ai_api_url,
            config.ai_api_key.clone(),
            settings.timeout,
        )?;
        builder.add(AI_SERVICE, settings, false, Arc::new(probe))?;
    }

    if let Some(settings) = builder.settings(SYSTEM_RESOURCES, true) {
        let probe = SystemResourcesProbe::new(config.thresholds.cpu, config.thresholds.memory);
        builder.add(SYSTEM_RESOURCES, settings, false, Arc::new(probe))?;
    }

    if let Some(settings) = builder.settings(DISK, true) {
        let probe = DiskProbe::new(config.disk_path.clone(), config.thresholds.disk);
        builder.add(DISK, settings, false, Arc::new(probe))?;
    }

    if let Some(settings) = builder.settings(NETWORK, false) {
        let probe = NetworkReachabilityProbe::new(
            config.network_targets.clone(),
            settings.timeout.min(MAX_CONNECT_TIMEOUT),
        );
        builder.add(NETWORK, settings, true, Arc::new(probe))?;
    }

    if config.environment_urls.is_empty() {
        builder.skip(ENVIRONMENTS, "environment_urls");
    } else if let Some(settings) = builder.settings(ENVIRONMENTS, false) {
        let probe = EnvironmentHealthProbe::new(config.environment_urls.clone(), settings.timeout)?;
        builder.add(ENVIRONMENTS, settings, true, Arc::new(probe))?;
    }

    if let Some(settings) = builder.settings(PERMISSIONS, true) {
        let probe = PermissionsProbe::new(config.writable_paths.clone());
        builder.add(PERMISSIONS, settings, true, Arc::new(probe))?;
    }

    if let Some(settings) = builder.settings(CONFIG_AUDIT, false) {
        let probe = ConfigAuditProbe::from_config(config);
        builder.add(CONFIG_AUDIT, settings, true, Arc::new(probe))?;
    }

    let registry = builder.finish();
    info!(
        probe_count = registry.len(),
        probes = ?registry.names(),
        "Built-in health probes registered"
    );
    Ok(registry)
}

/// Applies per-probe configuration overrides while registering
struct RegistryBuilder<'a> {
    config: &'a HealthConfig,
    registry: ProbeRegistry,
}

impl<'a> RegistryBuilder<'a> {
    fn new(config: &'a HealthConfig) -> Self {
        Self {
            config,
            registry: ProbeRegistry::new(),
        }
    }

    /// Effective settings for `name`, or `None` when it is disabled
    ///
    /// Resolved once per probe; the same settings size the probe's own
    /// client timeouts and its registered spec.
    fn settings(&self, name: &str, default_mandatory: bool) -> Option<ProbeSettings> {
        let settings = self.config.probe_settings(name, default_mandatory);
        if !settings.enabled {
            info!(probe = name, "Probe disabled by configuration");
            return None;
        }
        Some(settings)
    }

    fn add(
        &mut self,
        name: &str,
        settings: ProbeSettings,
        detailed_only: bool,
        probe: Arc<dyn Probe>,
    ) -> HealthResult<()> {
        let spec = ProbeSpec::new(name)
            .mandatory(settings.mandatory)
            .timeout(settings.timeout)
            .detailed_only(detailed_only);
        self.registry.register(spec, probe)
    }

    fn skip(&self, name: &str, missing: &str) {
        warn!(
            probe = name,
            missing_setting = missing,
            "Probe not registered: required setting is absent"
        );
    }

    fn finish(self) -> ProbeRegistry {
        self.registry
    }
}

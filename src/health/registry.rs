//! # Probe Registry
//!
//! Append-only set of registered probes. Registration happens once at startup
//! through `&mut self`; afterwards the registry is shared read-only behind an
//! `Arc`, which gives the single-writer / many-reader discipline for free.

use std::collections::HashSet;
use std::sync::Arc;
use tracing::debug;

use super::probe::{Probe, ProbeSpec, RegisteredProbe};
use crate::error::{HealthError, HealthResult};

#[derive(Debug, Default)]
pub struct ProbeRegistry {
    probes: Vec<RegisteredProbe>,
}

impl ProbeRegistry {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a probe
    ///
    /// Fails with [`HealthError::DuplicateProbeName`] if the name is taken.
    pub fn register(&mut self, spec: ProbeSpec, probe: Arc<dyn Probe>) -> HealthResult<()> {
        if self.contains(&spec.name) {
            return Err(HealthError::DuplicateProbeName(spec.name));
        }

        debug!(
            probe = %spec.name,
            mandatory = spec.mandatory,
            detailed_only = spec.detailed_only,
            timeout_ms = spec.timeout.as_millis() as u64,
            "Registered health probe"
        );

        self.probes.push(RegisteredProbe::new(spec, probe));
        Ok(())
    }

    /// Probes to run for one pass, in registration order
    ///
    /// Detailed passes include the `detailed_only` probes on top of the
    /// baseline set.
    pub fn list(&self, include_detailed: bool) -> Vec<RegisteredProbe> {
        self.probes
            .iter()
            .filter(|p| include_detailed || !p.spec.detailed_only)
            .cloned()
            .collect()
    }

    /// Names of mandatory probes for a pass
    pub fn mandatory_names(&self, include_detailed: bool) -> HashSet<String> {
        self.probes
            .iter()
            .filter(|p| p.spec.mandatory && (include_detailed || !p.spec.detailed_only))
            .map(|p| p.spec.name.clone())
            .collect()
    }

    pub fn contains(&self, name: &str) -> bool {
        self.probes.iter().any(|p| p.spec.name == name)
    }

    pub fn names(&self) -> Vec<&str> {
        self.probes.iter().map(|p| p.spec.name.as_str()).collect()
    }

    pub fn len(&self) -> usize {
        self.probes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.probes.is_empty()
    }
}

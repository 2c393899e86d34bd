//! # Web API Application State

use std::sync::Arc;

use crate::config::HealthConfig;
use crate::health::HealthOrchestrator;

/// Shared state handed to every handler
#[derive(Debug, Clone)]
pub struct AppState {
    pub orchestrator: HealthOrchestrator,
    pub config: Arc<HealthConfig>,
}

impl AppState {
    pub fn new(orchestrator: HealthOrchestrator, config: HealthConfig) -> Self {
        Self {
            orchestrator,
            config: Arc::new(config),
        }
    }
}

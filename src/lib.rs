#![allow(clippy::doc_markdown)] // Allow technical terms like PostgreSQL, SQLx in docs
#![allow(clippy::missing_errors_doc)] // Allow public functions without # Errors sections
#![allow(clippy::must_use_candidate)] // Allow methods without must_use when context is clear

//! # Test Suite Health
//!
//! Cached, concurrent health aggregation for the test-suite server and its
//! dependencies (database, browser grid, cache, AI provider, host resources).
//!
//! ## Overview
//!
//! Independent probes are registered once at startup, each flagged mandatory
//! or optional. A report request runs every applicable probe concurrently with
//! its own timeout, rolls the results up into one overall status and caches
//! the sealed report for a TTL. Concurrent requests during a stale window share
//! a single pass.
//!
//! ## Module Organization
//!
//! - [`health`] - probe interface, registry, orchestrator, cache, aggregation
//! - [`config`] - layered configuration (defaults, TOML file, `HEALTH_*` env)
//! - [`error`] - structured error handling
//! - [`logging`] - tracing subscriber setup
//! - [`web`] - Axum HTTP surface
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use testsuite_health::config::HealthConfig;
//! use testsuite_health::health::{build_default_registry, HealthOrchestrator};
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let config = HealthConfig::default();
//! let registry = build_default_registry(&config)?;
//! let orchestrator = HealthOrchestrator::from_config(Arc::new(registry), &config);
//!
//! let report = orchestrator.get_report(false).await?;
//! println!("overall: {}", report.overall_status.overall_label());
//! # Ok(())
//! # }
//! ```

pub mod config;
pub mod error;
pub mod health;
pub mod logging;
pub mod web;

pub use config::{ConfigLoader, HealthConfig};
pub use error::{HealthError, HealthResult, ProbeError};
pub use health::{
    DetailLevel, HealthOrchestrator, HealthReport, HealthReporter, Probe, ProbeRegistry,
    ProbeResult, ProbeSpec, ResultCache, Status,
};

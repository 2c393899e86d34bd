//! Error types for the health aggregation engine.
//!
//! Two families live here:
//!
//! - [`ProbeError`] - failures local to a single probe. These are always
//!   recovered at the orchestrator boundary and rendered as a degraded
//!   [`ProbeResult`](crate::health::ProbeResult); callers of
//!   `get_report` never see them.
//! - [`HealthError`] - configuration and programming errors (duplicate probe
//!   names, a broken aggregation invariant, an aborted pass). These are fatal
//!   at startup or under test and are not expected at runtime.

use thiserror::Error;

/// Failure of a single probe execution
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ProbeError {
    #[error("timeout: {0}")]
    Timeout(String),
    #[error("connection failure: {0}")]
    ConnectionFailure(String),
    #[error("internal error: {0}")]
    InternalError(String),
}

impl ProbeError {
    pub fn timeout(message: impl Into<String>) -> Self {
        Self::Timeout(message.into())
    }

    pub fn connection_failure(message: impl Into<String>) -> Self {
        Self::ConnectionFailure(message.into())
    }

    pub fn internal(message: impl Into<String>) -> Self {
        Self::InternalError(message.into())
    }

    /// Stable machine-readable tag for the failure class
    #[must_use]
    pub const fn kind(&self) -> &'static str {
        match self {
            Self::Timeout(_) => "timeout",
            Self::ConnectionFailure(_) => "connection_failure",
            Self::InternalError(_) => "internal_error",
        }
    }

    /// Short human-readable label used as the degraded result's message
    #[must_use]
    pub const fn summary(&self) -> &'static str {
        match self {
            Self::Timeout(_) => "timeout",
            Self::ConnectionFailure(_) => "connection failure",
            Self::InternalError(_) => "internal error",
        }
    }

    /// The detail text carried by the variant
    #[must_use]
    pub fn detail(&self) -> &str {
        match self {
            Self::Timeout(msg) | Self::ConnectionFailure(msg) | Self::InternalError(msg) => msg,
        }
    }
}

impl From<std::io::Error> for ProbeError {
    fn from(err: std::io::Error) -> Self {
        match err.kind() {
            std::io::ErrorKind::TimedOut => ProbeError::Timeout(err.to_string()),
            std::io::ErrorKind::PermissionDenied
            | std::io::ErrorKind::NotFound
            | std::io::ErrorKind::InvalidInput => ProbeError::InternalError(err.to_string()),
            _ => ProbeError::ConnectionFailure(err.to_string()),
        }
    }
}

impl From<sqlx::Error> for ProbeError {
    fn from(err: sqlx::Error) -> Self {
        match err {
            sqlx::Error::PoolTimedOut => ProbeError::Timeout(err.to_string()),
            sqlx::Error::Io(_)
            | sqlx::Error::Tls(_)
            | sqlx::Error::PoolClosed
            | sqlx::Error::Configuration(_) => ProbeError::ConnectionFailure(err.to_string()),
            _ => ProbeError::InternalError(err.to_string()),
        }
    }
}

impl From<reqwest::Error> for ProbeError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            ProbeError::Timeout(err.to_string())
        } else if err.is_decode() || err.is_builder() {
            ProbeError::InternalError(err.to_string())
        } else {
            ProbeError::ConnectionFailure(err.to_string())
        }
    }
}

/// Configuration and programming errors
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum HealthError {
    #[error("Probe '{0}' is already registered")]
    DuplicateProbeName(String),
    #[error("Aggregation invariant violated: {0}")]
    AggregationInvariantViolation(String),
    #[error("Configuration error: {0}")]
    Configuration(String),
    #[error("Health pass aborted: {0}")]
    PassAborted(String),
}

impl From<config::ConfigError> for HealthError {
    fn from(err: config::ConfigError) -> Self {
        HealthError::Configuration(err.to_string())
    }
}

pub type HealthResult<T> = std::result::Result<T, HealthError>;
pub type ProbeOutcome = std::result::Result<crate::health::ProbeResult, ProbeError>;

//! # Structured Logging Module
//!
//! Environment-aware console logging. `RUST_LOG` wins when set; otherwise the
//! level is derived from the deployment environment. `HEALTH_LOG_FORMAT=json`
//! switches to JSON lines for log shippers.

use std::sync::OnceLock;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter, Layer};

static LOGGER_INITIALIZED: OnceLock<()> = OnceLock::new();

/// Environment variable selecting the output format (`json` or `pretty`)
pub const LOG_FORMAT_ENV: &str = "HEALTH_LOG_FORMAT";

/// Initialize structured logging once per process
///
/// Safe to call repeatedly and safe to call when another subscriber has
/// already been installed (tests, embedding applications).
pub fn init_structured_logging(environment: &str) {
    LOGGER_INITIALIZED.get_or_init(|| {
        let filter = EnvFilter::try_from_default_env()
            .unwrap_or_else(|_| EnvFilter::new(log_level(environment)));
        let json = std::env::var(LOG_FORMAT_ENV)
            .map(|v| wants_json(&v))
            .unwrap_or(false);

        let layer = if json {
            fmt::layer()
                .with_target(true)
                .with_level(true)
                .with_ansi(false)
                .json()
                .with_filter(filter)
                .boxed()
        } else {
            fmt::layer()
                .with_target(true)
                .with_thread_ids(true)
                .with_level(true)
                .with_filter(filter)
                .boxed()
        };

        if tracing_subscriber::registry().with(layer).try_init().is_err() {
            tracing::debug!("Global tracing subscriber already initialized");
        }

        tracing::info!(
            environment = %environment,
            format = if json { "json" } else { "pretty" },
            "Structured logging initialized"
        );
    });
}

fn wants_json(value: &str) -> bool {
    value.trim().eq_ignore_ascii_case("json")
}

/// Default level directive per environment
fn log_level(environment: &str) -> &'static str {
    match environment {
        "production" => "info",
        _ => "debug",
    }
}

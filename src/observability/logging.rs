//! Structured logging.
//!
//! # Responsibilities
//! - Initialize the global tracing subscriber
//! - Pick the log level from `RUST_LOG` or configuration
//!
//! # Design Decisions
//! - `RUST_LOG` always wins over the configured level
//! - JSON format for machine parsing, single-line text for development

use thiserror::Error;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter, Layer};

use crate::config::{LogFormat, ObservabilityConfig};

/// Crate target used in the default filter.
const LOG_TARGET: &str = "graphql_diag";

#[derive(Debug, Error)]
pub enum LoggingError {
    #[error("invalid log filter: {0}")]
    Filter(#[from] tracing_subscriber::filter::ParseError),
    #[error("failed to install subscriber: {0}")]
    Init(#[from] tracing_subscriber::util::TryInitError),
}

/// Build the default filter directive for a level.
pub fn default_directive(level: &str) -> String {
    let level = level.to_ascii_lowercase();
    format!("{LOG_TARGET}={level},tower_http={level},async_graphql=warn,info")
}

/// Install the process-wide subscriber.
pub fn init_logging(config: &ObservabilityConfig) -> Result<(), LoggingError> {
    let filter = match EnvFilter::try_from_default_env() {
        Ok(filter) => filter,
        Err(_) => EnvFilter::try_new(default_directive(&config.log_level))?,
    };

    let fmt_layer = match config.log_format {
        LogFormat::Text => tracing_subscriber::fmt::layer().with_target(false).boxed(),
        LogFormat::Json => tracing_subscriber::fmt::layer().json().boxed(),
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt_layer)
        .try_init()?;

    Ok(())
}

//! Configuration validation.
//!
//! # Responsibilities
//! - Semantic validation (serde handles syntactic)
//! - Validate value ranges (timeouts > 0, addresses parse)
//!
//! # Design Decisions
//! - Returns all validation errors, not just first
//! - Validation is pure function: ServiceConfig → Result<(), Vec<ValidationError>>

use std::net::SocketAddr;

use thiserror::Error;

use crate::config::schema::ServiceConfig;

const LOG_LEVELS: &[&str] = &["trace", "debug", "info", "warn", "error"];

/// A single semantic problem in a configuration.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("listener.bind_address `{0}` is not a socket address")]
    BindAddress(String),
    #[error("timeouts.request_secs must be greater than zero")]
    ZeroRequestTimeout,
    #[error("limits.max_body_bytes must be greater than zero")]
    ZeroBodyLimit,
    #[error("graphql.path `{0}` must start with '/'")]
    GraphQlPath(String),
    #[error("observability.log_level `{0}` is not one of trace, debug, info, warn, error")]
    LogLevel(String),
    #[error("observability.metrics_address `{0}` is not a socket address")]
    MetricsAddress(String),
}

/// Check a parsed configuration, collecting every problem found.
pub fn validate_config(config: &ServiceConfig) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    if config.listener.bind_address.parse::<SocketAddr>().is_err() {
        errors.push(ValidationError::BindAddress(config.listener.bind_address.clone()));
    }

    if config.timeouts.request_secs == 0 {
        errors.push(ValidationError::ZeroRequestTimeout);
    }

    if config.limits.max_body_bytes == 0 {
        errors.push(ValidationError::ZeroBodyLimit);
    }

    if !config.graphql.path.starts_with('/') {
        errors.push(ValidationError::GraphQlPath(config.graphql.path.clone()));
    }

    let level = config.observability.log_level.to_ascii_lowercase();
    if !LOG_LEVELS.contains(&level.as_str()) {
        errors.push(ValidationError::LogLevel(config.observability.log_level.clone()));
    }

    if config.observability.metrics_enabled
        && config.observability.metrics_address.parse::<SocketAddr>().is_err()
    {
        errors.push(ValidationError::MetricsAddress(
            config.observability.metrics_address.clone(),
        ));
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

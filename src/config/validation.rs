//! Configuration validation.
//!
//! # Responsibilities
//! - Semantic validation (serde handles syntactic)
//! - Validate value ranges (timeouts > 0, address parses)
//! - Check that header-bound strings are valid header values
//!
//! # Design Decisions
//! - Returns all validation errors, not just first
//! - Validation is pure function: ProxyConfig → Result<(), Vec<ValidationError>>
//! - Runs before config is accepted into the system

use std::net::SocketAddr;

use axum::http::uri::Authority;
use axum::http::HeaderValue;
use thiserror::Error;

use crate::config::schema::ProxyConfig;

/// A single semantic problem found in a configuration.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{field}: {message}")]
pub struct ValidationError {
    /// Dotted path of the offending field, e.g. `upstream.host`.
    pub field: &'static str,
    pub message: String,
}

impl ValidationError {
    fn new(field: &'static str, message: impl Into<String>) -> Self {
        Self {
            field,
            message: message.into(),
        }
    }
}

/// Validate a configuration, collecting every problem found.
pub fn validate_config(config: &ProxyConfig) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    if config.listener.bind_address.parse::<SocketAddr>().is_err() {
        errors.push(ValidationError::new(
            "listener.bind_address",
            format!("'{}' is not a socket address", config.listener.bind_address),
        ));
    }

    let host = &config.upstream.host;
    if host.is_empty() {
        errors.push(ValidationError::new("upstream.host", "must not be empty"));
    } else if host.contains('@') || host.parse::<Authority>().is_err() {
        errors.push(ValidationError::new(
            "upstream.host",
            format!("'{}' is not a bare host name", host),
        ));
    }

    if HeaderValue::from_str(&config.upstream.user_agent).is_err() {
        errors.push(ValidationError::new(
            "upstream.user_agent",
            "is not a valid header value",
        ));
    }
    if HeaderValue::from_str(&config.upstream.proxied_by).is_err() {
        errors.push(ValidationError::new(
            "upstream.proxied_by",
            "is not a valid header value",
        ));
    }

    if config.routes.allowed_prefixes.is_empty() {
        errors.push(ValidationError::new(
            "routes.allowed_prefixes",
            "at least one prefix is required",
        ));
    }
    for prefix in &config.routes.allowed_prefixes {
        if !prefix.starts_with('/') {
            errors.push(ValidationError::new(
                "routes.allowed_prefixes",
                format!("'{}' must start with '/'", prefix),
            ));
        }
    }

    if config.timeouts.connect_secs == 0 {
        errors.push(ValidationError::new("timeouts.connect_secs", "must be > 0"));
    }
    if config.timeouts.response_secs == 0 {
        errors.push(ValidationError::new("timeouts.response_secs", "must be > 0"));
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

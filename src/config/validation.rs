//! Configuration validation.
//!
//! # Responsibilities
//! - Semantic validation (serde handles syntactic)
//! - Validate addresses, prefixes and URL templates
//! - Validate value ranges (timeouts > 0)
//!
//! # Design Decisions
//! - Returns all validation errors, not just first
//! - Validation is pure function: RelayConfig → Result<(), Vec<ValidationError>>
//! - Runs before config is accepted into the system

use std::net::SocketAddr;

use thiserror::Error;
use url::Url;

use crate::config::schema::RelayConfig;
use crate::transload::destination::ACCOUNT_PLACEHOLDER;

/// A single semantic problem in the configuration.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{field}: {reason}")]
pub struct ValidationError {
    pub field: &'static str,
    pub reason: String,
}

impl ValidationError {
    fn new(field: &'static str, reason: impl Into<String>) -> Self {
        Self {
            field,
            reason: reason.into(),
        }
    }
}

/// Check a parsed configuration for semantic problems.
pub fn validate_config(config: &RelayConfig) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    if config.listener.bind_address.parse::<SocketAddr>().is_err() {
        errors.push(ValidationError::new(
            "listener.bind_address",
            format!("'{}' is not a socket address", config.listener.bind_address),
        ));
    }

    for (field, prefix) in [
        ("routing.transload_prefix", &config.routing.transload_prefix),
        ("routing.version_prefix", &config.routing.version_prefix),
    ] {
        if !prefix.starts_with('/') || !prefix.ends_with('/') || prefix.len() < 2 {
            errors.push(ValidationError::new(
                field,
                format!("'{prefix}' must start and end with '/'"),
            ));
        }
    }

    if config.routing.transload_prefix == config.routing.version_prefix {
        errors.push(ValidationError::new(
            "routing.version_prefix",
            "must differ from routing.transload_prefix",
        ));
    }

    if Url::parse(&config.routing.redirect_location).is_err() {
        errors.push(ValidationError::new(
            "routing.redirect_location",
            "must be an absolute URL",
        ));
    }

    let endpoint = &config.destination.endpoint;
    if !endpoint.contains(ACCOUNT_PLACEHOLDER) {
        errors.push(ValidationError::new(
            "destination.endpoint",
            format!("must contain the {ACCOUNT_PLACEHOLDER} placeholder"),
        ));
    } else {
        match Url::parse(&endpoint.replace(ACCOUNT_PLACEHOLDER, "account")) {
            Ok(url) if matches!(url.scheme(), "http" | "https") => {}
            _ => errors.push(ValidationError::new(
                "destination.endpoint",
                "must expand to an absolute http(s) URL",
            )),
        }
    }

    if config.timeouts.request_secs == 0 {
        errors.push(ValidationError::new(
            "timeouts.request_secs",
            "must be greater than zero",
        ));
    }

    if !matches!(config.observability.log_format.as_str(), "pretty" | "json") {
        errors.push(ValidationError::new(
            "observability.log_format",
            format!("unknown format '{}'", config.observability.log_format),
        ));
    }

    if config.observability.metrics_enabled
        && config.observability.metrics_address.parse::<SocketAddr>().is_err()
    {
        errors.push(ValidationError::new(
            "observability.metrics_address",
            format!("'{}' is not a socket address", config.observability.metrics_address),
        ));
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

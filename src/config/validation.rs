//! Configuration validation.
//!
//! # Responsibilities
//! - Semantic validation (serde handles syntactic)
//! - Validate value ranges (timeout > 0, status codes, concurrency)
//! - Detect conflicting parameter and override key names
//!
//! # Design Decisions
//! - Returns all validation errors, not just first
//! - Validation is pure function: ServerConfig → Result<(), Vec<ValidationError>>
//! - Runs before config is accepted into the system

use std::net::SocketAddr;

use thiserror::Error;

use crate::config::schema::ServerConfig;

/// A single semantic problem found in a configuration.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("scoring.timeout_ms must be greater than zero")]
    ZeroTimeout,

    #[error("scoring.{0} must not be empty")]
    EmptyName(&'static str),

    #[error("scoring.request_param_name and scoring.request_headers_param_name are both '{0}'")]
    DuplicateParamName(String),

    #[error("scoring.response_headers_key and scoring.response_body_key are both '{0}'")]
    DuplicateOverrideKey(String),

    #[error("scoring.{field} = {value} is not a valid {expected} status code")]
    InvalidStatus {
        field: &'static str,
        value: u16,
        expected: &'static str,
    },

    #[error("scoring.max_concurrent_invocations must be greater than zero")]
    ZeroConcurrency,

    #[error("{field} '{value}' is not a valid socket address")]
    InvalidAddress { field: &'static str, value: String },
}

/// Validate a configuration, collecting every violation.
pub fn validate_config(config: &ServerConfig) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();
    let scoring = &config.scoring;

    if scoring.timeout_ms == 0 {
        errors.push(ValidationError::ZeroTimeout);
    }

    for (field, value) in [
        ("request_param_name", &scoring.request_param_name),
        ("request_headers_param_name", &scoring.request_headers_param_name),
        ("response_headers_key", &scoring.response_headers_key),
        ("response_body_key", &scoring.response_body_key),
    ] {
        if value.trim().is_empty() {
            errors.push(ValidationError::EmptyName(field));
        }
    }

    if scoring.support_request_headers
        && scoring.request_param_name == scoring.request_headers_param_name
    {
        errors.push(ValidationError::DuplicateParamName(scoring.request_param_name.clone()));
    }

    if scoring.response_headers_key == scoring.response_body_key {
        errors.push(ValidationError::DuplicateOverrideKey(scoring.response_body_key.clone()));
    }

    if !(200..300).contains(&scoring.success_status) {
        errors.push(ValidationError::InvalidStatus {
            field: "success_status",
            value: scoring.success_status,
            expected: "2xx",
        });
    }

    for (field, value) in [
        ("timeout_status", scoring.timeout_status),
        ("handler_failure_status", scoring.handler_failure_status),
    ] {
        if !(400..600).contains(&value) {
            errors.push(ValidationError::InvalidStatus {
                field,
                value,
                expected: "4xx/5xx",
            });
        }
    }

    if scoring.max_concurrent_invocations == 0 {
        errors.push(ValidationError::ZeroConcurrency);
    }

    if config.listener.bind_address.parse::<SocketAddr>().is_err() {
        errors.push(ValidationError::InvalidAddress {
            field: "listener.bind_address",
            value: config.listener.bind_address.clone(),
        });
    }

    if config.observability.metrics_enabled
        && config.observability.metrics_address.parse::<SocketAddr>().is_err()
    {
        errors.push(ValidationError::InvalidAddress {
            field: "observability.metrics_address",
            value: config.observability.metrics_address.clone(),
        });
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_is_valid() {
        assert!(validate_config(&ServerConfig::default()).is_ok());
    }

    #[test]
    fn test_zero_timeout_rejected() {
        let mut config = ServerConfig::default();
        config.scoring.timeout_ms = 0;

        let errors = validate_config(&config).unwrap_err();
        assert_eq!(errors, vec![ValidationError::ZeroTimeout]);
    }

    #[test]
    fn test_collects_all_errors() {
        let mut config = ServerConfig::default();
        config.scoring.timeout_ms = 0;
        config.scoring.success_status = 500;
        config.scoring.max_concurrent_invocations = 0;
        config.scoring.response_body_key = config.scoring.response_headers_key.clone();
        config.listener.bind_address = "not-an-address".into();

        let errors = validate_config(&config).unwrap_err();
        assert_eq!(errors.len(), 5);
        assert!(errors.contains(&ValidationError::ZeroConcurrency));
    }

    #[test]
    fn test_param_name_clash_only_matters_with_header_passthrough() {
        let mut config = ServerConfig::default();
        config.scoring.request_headers_param_name = "data".into();
        assert!(validate_config(&config).is_ok());

        config.scoring.support_request_headers = true;
        let errors = validate_config(&config).unwrap_err();
        assert_eq!(errors, vec![ValidationError::DuplicateParamName("data".into())]);
    }
}

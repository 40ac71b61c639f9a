//! Shape of `scoring.toml`.
//!
//! Every section and field is optional; missing values take the defaults below.

use serde::{Deserialize, Serialize};

/// Root configuration for the scoring server.
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
#[serde(default)]
pub struct ServerConfig {
    /// Listener configuration (bind address, body limit).
    pub listener: ListenerConfig,

    /// Invocation engine settings.
    pub scoring: ScoringConfig,

    /// Static UI page settings.
    pub ui: UiConfig,

    /// Observability settings.
    pub observability: ObservabilityConfig,
}

/// Where and how much the HTTP transport accepts.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ListenerConfig {
    /// Bind address (e.g., "0.0.0.0:5001").
    pub bind_address: String,

    /// Maximum accepted request body in bytes.
    pub max_body_size: usize,
}

impl Default for ListenerConfig {
    fn default() -> Self {
        Self {
            bind_address: "0.0.0.0:5001".to_string(),
            max_body_size: 100 * 1024 * 1024, // 100MB
        }
    }
}

/// Settings for the bounded-time invocation engine.
///
/// Built once at startup, validated, then shared read-only across every
/// concurrent invocation.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ScoringConfig {
    /// Wall-clock budget for a single handler call, in milliseconds.
    /// Zero is rejected and fails every invocation closed.
    pub timeout_ms: u64,

    /// Parameter name carrying the request body.
    pub request_param_name: String,

    /// Parameter name carrying the normalized request headers.
    pub request_headers_param_name: String,

    /// Pass normalized request headers to the handler.
    pub support_request_headers: bool,

    /// Status code for successful invocations.
    pub success_status: u16,

    /// Status code reported when the deadline fires.
    pub timeout_status: u16,

    /// Status code reported when the handler fails.
    pub handler_failure_status: u16,

    /// Key in a handler's returned object that overrides response headers.
    pub response_headers_key: String,

    /// Key in a handler's returned object that overrides the response body.
    pub response_body_key: String,

    /// Maximum handler executions in flight, including timed-out ones
    /// that have not yet returned.
    pub max_concurrent_invocations: usize,
}

impl Default for ScoringConfig {
    fn default() -> Self {
        Self {
            timeout_ms: 60_000,
            request_param_name: "data".to_string(),
            request_headers_param_name: "request_headers".to_string(),
            support_request_headers: false,
            success_status: 200,
            timeout_status: 500,
            handler_failure_status: 500,
            response_headers_key: "override_headers".to_string(),
            response_body_key: "override_body".to_string(),
            max_concurrent_invocations: 64,
        }
    }
}

/// Static UI page configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct UiConfig {
    /// Serve the page at `/ui`.
    pub enabled: bool,

    /// Path to the HTML file on disk.
    pub path: String,
}

impl Default for UiConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            path: "ui.html".to_string(),
        }
    }
}

/// Observability configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ObservabilityConfig {
    /// Level for this crate and `tower_http` when `RUST_LOG` is unset.
    pub log_level: String,

    /// Install the Prometheus exporter.
    pub metrics_enabled: bool,

    /// Where the exporter serves scrapes.
    pub metrics_address: String,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            metrics_enabled: false,
            metrics_address: "0.0.0.0:9090".to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = ServerConfig::default();
        assert_eq!(config.scoring.timeout_ms, 60_000);
        assert_eq!(config.scoring.request_param_name, "data");
        assert_eq!(config.scoring.success_status, 200);
        assert!(!config.scoring.support_request_headers);
        assert_eq!(config.listener.bind_address, "0.0.0.0:5001");
    }

    #[test]
    fn test_partial_toml_keeps_defaults() {
        let config: ServerConfig = toml::from_str(
            r#"
            [scoring]
            timeout_ms = 250
            support_request_headers = true
            "#,
        )
        .unwrap();

        assert_eq!(config.scoring.timeout_ms, 250);
        assert!(config.scoring.support_request_headers);
        assert_eq!(config.scoring.request_param_name, "data");
        assert_eq!(config.scoring.response_body_key, "override_body");
        assert_eq!(config.observability.log_level, "info");
    }
}

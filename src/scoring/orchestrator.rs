//! Top-level invocation flow.
//!
//! ```text
//! InvocationRequest
//!     → normalize headers, build params
//!     → hooks start            (HookGuard)
//!     → TimeoutSupervisor      (value | ScoringError)
//!     → telemetry on failure
//!     → hooks stop             (always, via guard)
//!     → ResponseShaper | ScoringError::into_contract
//! ```

use std::sync::Arc;

use axum::http::StatusCode;

use crate::config::ScoringConfig;
use crate::scoring::error::{ErrorKind, Outcome};
use crate::scoring::handler::ScoringHandler;
use crate::scoring::hooks::{HookLifecycle, LifecycleHooks, LoggingHooks};
use crate::scoring::request::{InvocationParams, InvocationRequest, RequestContext};
use crate::scoring::response::{ResponseContract, ResponseShaper};
use crate::scoring::supervisor::TimeoutSupervisor;
use crate::scoring::telemetry::{self, Telemetry, TracingTelemetry};

/// Drives one handler invocation from request to response contract.
///
/// Cheap to share: all state is read-only after construction.
pub struct Orchestrator {
    config: Arc<ScoringConfig>,
    handler: Arc<dyn ScoringHandler>,
    hooks: Arc<dyn LifecycleHooks>,
    telemetry: Arc<dyn Telemetry>,
    supervisor: TimeoutSupervisor,
    shaper: ResponseShaper,
}

impl Orchestrator {
    /// Orchestrator with logging hooks and tracing telemetry.
    pub fn new(config: ScoringConfig, handler: Arc<dyn ScoringHandler>) -> Self {
        let supervisor = TimeoutSupervisor::new(
            config.timeout_ms,
            status_or_500(config.timeout_status),
            status_or_500(config.handler_failure_status),
            config.max_concurrent_invocations.max(1),
        );
        let shaper = ResponseShaper::from_config(&config);

        Self {
            config: Arc::new(config),
            handler,
            hooks: Arc::new(LoggingHooks),
            telemetry: Arc::new(TracingTelemetry),
            supervisor,
            shaper,
        }
    }

    pub fn with_hooks(mut self, hooks: Arc<dyn LifecycleHooks>) -> Self {
        self.hooks = hooks;
        self
    }

    pub fn with_telemetry(mut self, telemetry: Arc<dyn Telemetry>) -> Self {
        self.telemetry = telemetry;
        self
    }

    pub fn config(&self) -> &ScoringConfig {
        &self.config
    }

    /// Run one invocation and produce its response contract. Never fails.
    pub async fn handle(&self, request: InvocationRequest, context: &RequestContext) -> ResponseContract {
        match self.invoke(request, context).await {
            Ok(value) => self.shaper.shape(value),
            Err(failure) => failure.into_contract(),
        }
    }

    /// Run one invocation and return its typed outcome.
    pub async fn invoke(&self, request: InvocationRequest, context: &RequestContext) -> Outcome {
        tracing::info!(
            request_id = %context.request_id,
            "Headers passed in (total {}):",
            request.headers().len()
        );
        for (name, value) in request.headers() {
            tracing::debug!(request_id = %context.request_id, "\t{}: {}", name, value);
        }

        let headers_name = self
            .config
            .support_request_headers
            .then_some(self.config.request_headers_param_name.as_str());
        let params = InvocationParams::build(&request, &self.config.request_param_name, headers_name);

        let hooks = HookLifecycle::begin(self.hooks.clone(), &context.request_id);

        let outcome = self.supervisor.invoke(self.handler.clone(), params).await;

        if let Err(failure) = &outcome {
            hooks.stop();
            tracing::debug!(
                request_id = %context.request_id,
                kind = failure.kind().as_str(),
                "Invocation failed"
            );
            if failure.kind() != ErrorKind::Unclassified {
                telemetry::report_quietly(self.telemetry.as_ref(), failure, context);
            }
        }

        // Guard drop stops the hooks on the success path; the failure branch already did.
        drop(hooks);
        outcome
    }
}

fn status_or_500(code: u16) -> StatusCode {
    StatusCode::from_u16(code).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR)
}

impl std::fmt::Debug for Orchestrator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Orchestrator")
            .field("config", &self.config)
            .field("supervisor", &self.supervisor)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scoring::error::{RunError, ScoringError};
    use crate::scoring::response::ResponseBody;
    use serde_json::{json, Value};

    fn orchestrator(handler: Arc<dyn ScoringHandler>) -> Orchestrator {
        let config = ScoringConfig {
            timeout_ms: 500,
            ..ScoringConfig::default()
        };
        Orchestrator::new(config, handler)
    }

    #[tokio::test]
    async fn test_success_round_trip() {
        let handler = Arc::new(|_: InvocationParams| -> Result<Value, RunError> { Ok(json!([1, "two"])) });
        let contract = orchestrator(handler)
            .handle(InvocationRequest::new("", [("a", "b")]), &RequestContext::default())
            .await;

        assert_eq!(contract.status, StatusCode::OK);
        assert!(contract.headers.is_empty());
        assert_eq!(contract.body, Some(ResponseBody::Value(json!([1, "two"]))));
    }

    #[tokio::test]
    async fn test_param_name_from_config() {
        let handler = Arc::new(|p: InvocationParams| -> Result<Value, RunError> {
            Ok(json!(p.names().collect::<Vec<_>>()))
        });
        let config = ScoringConfig {
            request_param_name: "input_data".into(),
            support_request_headers: true,
            ..ScoringConfig::default()
        };
        let outcome = Orchestrator::new(config, handler)
            .invoke(InvocationRequest::new("", [("a", "b")]), &RequestContext::default())
            .await;

        assert_eq!(outcome.unwrap(), json!(["input_data", "request_headers"]));
    }

    #[tokio::test]
    async fn test_unknown_error_is_handler_fault() {
        let handler = Arc::new(|_: InvocationParams| -> Result<Value, RunError> {
            Err(RunError::failed(std::io::Error::other("disk on fire")))
        });
        let outcome = orchestrator(handler)
            .invoke(InvocationRequest::new("", Vec::<(String, String)>::new()), &RequestContext::default())
            .await;

        assert_eq!(
            outcome.unwrap_err(),
            ScoringError::handler("disk on fire", StatusCode::INTERNAL_SERVER_ERROR)
        );
    }
}

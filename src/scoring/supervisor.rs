//! Wall-clock bound on a single handler call.
//!
//! # Responsibilities
//! - Fail closed on a zero budget before the handler runs
//! - Arm a call-scoped [`Deadline`] and install it on the worker thread
//! - Race the handler against the deadline timer
//! - Disarm and restore the worker's deadline slot on every exit path
//! - Classify panics and handler errors
//!
//! # Design Decisions
//! - The handler runs on the blocking pool; the caller never waits past the deadline
//! - A timed-out handler cannot be preempted. It keeps running detached, holding
//!   its invocation slot until it returns, and can observe the expiry through
//!   [`crate::scoring::deadline::current`]
//! - Waiting for an invocation slot counts against the deadline
//! - A handler whose deadline fired before it was scheduled never starts
//! - Timer notifications arriving after disarm are dropped

use std::any::Any;
use std::panic::{self, AssertUnwindSafe};
use std::sync::Arc;
use std::time::Duration;

use axum::http::StatusCode;
use tokio::sync::Semaphore;

use crate::observability::metrics;
use crate::scoring::deadline::{Deadline, DeadlineScope};
use crate::scoring::error::{Outcome, RunError, ScoringError};
use crate::scoring::handler::ScoringHandler;
use crate::scoring::request::InvocationParams;

/// Bounds handler calls to `timeout_ms` of wall-clock time.
#[derive(Debug, Clone)]
pub struct TimeoutSupervisor {
    timeout_ms: u64,
    timeout_status: StatusCode,
    handler_failure_status: StatusCode,
    slots: Arc<Semaphore>,
}

impl TimeoutSupervisor {
    pub fn new(
        timeout_ms: u64,
        timeout_status: StatusCode,
        handler_failure_status: StatusCode,
        max_concurrent: usize,
    ) -> Self {
        Self {
            timeout_ms,
            timeout_status,
            handler_failure_status,
            slots: Arc::new(Semaphore::new(max_concurrent)),
        }
    }

    pub fn timeout_ms(&self) -> u64 {
        self.timeout_ms
    }

    /// Invocation slots currently free.
    pub fn available_slots(&self) -> usize {
        self.slots.available_permits()
    }

    /// Invoke `handler` with `params`, returning within the configured budget.
    pub async fn invoke(&self, handler: Arc<dyn ScoringHandler>, params: InvocationParams) -> Outcome {
        if self.timeout_ms == 0 {
            tracing::error!("Scoring timeout is zero; refusing to invoke handler");
            return Err(ScoringError::server(
                StatusCode::INTERNAL_SERVER_ERROR,
                "Scoring timeout must be a positive number of milliseconds",
            ));
        }

        let deadline = Deadline::arm(Duration::from_millis(self.timeout_ms));
        tracing::info!(
            timeout_ms = self.timeout_ms,
            "Scoring timer is set to {} seconds",
            self.timeout_ms as f64 / 1000.0
        );

        // Waiting for a slot counts against the budget.
        let acquire = self.slots.clone().acquire_owned();
        let permit = match tokio::time::timeout_at(deadline.expires_at(), acquire).await {
            Ok(Ok(permit)) => permit,
            Ok(Err(_closed)) => {
                deadline.disarm();
                return Err(ScoringError::server(
                    StatusCode::SERVICE_UNAVAILABLE,
                    "Scoring engine is shutting down",
                ));
            }
            Err(_elapsed) => {
                deadline.fire();
                metrics::record_timeout();
                tracing::warn!(
                    timeout_ms = self.timeout_ms,
                    "No invocation slot freed up before the scoring timeout"
                );
                return Err(ScoringError::timeout(self.timeout_ms, self.timeout_status));
            }
        };

        let worker_deadline = deadline.clone();
        let mut worker = tokio::task::spawn_blocking(move || {
            let _permit = permit;
            // Queued behind a saturated blocking pool past the deadline; the
            // caller already answered with a timeout.
            if !worker_deadline.is_armed() {
                tracing::debug!("Deadline fired before the handler started; skipping it");
                return Ok(Err(RunError::failed("deadline expired before the handler started")));
            }
            let _scope = DeadlineScope::enter(worker_deadline);
            panic::catch_unwind(AssertUnwindSafe(|| handler.run(params)))
        });

        let joined = tokio::select! {
            joined = &mut worker => joined,
            _ = tokio::time::sleep_until(deadline.expires_at()) => {
                if deadline.fire() {
                    metrics::record_timeout();
                    tracing::warn!(timeout_ms = self.timeout_ms, "Handler exceeded scoring timeout");
                    return Err(ScoringError::timeout(self.timeout_ms, self.timeout_status));
                }
                tracing::debug!("Deadline fired after handler returned; ignoring");
                worker.await
            }
        };

        // Normal completions were disarmed on the worker before the result was published.
        deadline.disarm();

        match joined {
            Ok(Ok(Ok(value))) => Ok(value),
            Ok(Ok(Err(err))) => Err(self.classify(err)),
            Ok(Err(payload)) => {
                let message = panic_message(payload.as_ref());
                tracing::error!(panic = %message, "Handler panicked");
                Err(ScoringError::handler(message, self.handler_failure_status))
            }
            Err(join_error) => Err(self.worker_lost(join_error.to_string())),
        }
    }

    /// The worker was cancelled or lost before publishing a result.
    fn worker_lost(&self, detail: String) -> ScoringError {
        tracing::error!(error = %detail, "Handler worker did not complete");
        ScoringError::handler(detail, self.handler_failure_status)
    }

    fn classify(&self, err: RunError) -> ScoringError {
        tracing::debug!(error = %err, "Handler returned an error");
        err.classify(self.handler_failure_status)
    }
}

/// Best-effort text of a panic payload.
pub fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(message) = payload.downcast_ref::<&str>() {
        (*message).to_string()
    } else if let Some(message) = payload.downcast_ref::<String>() {
        message.clone()
    } else {
        "handler panicked".to_string()
    }
}

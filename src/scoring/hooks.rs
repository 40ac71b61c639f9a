//! Start/stop instrumentation around every invocation.

use std::panic::{self, AssertUnwindSafe};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use thiserror::Error;

use crate::observability::metrics;

/// Failure raised by a hook's `start`. Logged, never surfaced.
#[derive(Debug, Error)]
#[error("hook start failed: {0}")]
pub struct HookError(pub String);

/// Instrumentation bracketing a handler call.
pub trait LifecycleHooks: Send + Sync {
    fn start(&self, correlation_id: &str) -> Result<(), HookError>;

    fn stop(&self, correlation_id: &str);
}

/// Hooks that do nothing.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoopHooks;

impl LifecycleHooks for NoopHooks {
    fn start(&self, _correlation_id: &str) -> Result<(), HookError> {
        Ok(())
    }

    fn stop(&self, _correlation_id: &str) {}
}

/// Hooks that emit tracing events and track invocations in flight.
#[derive(Debug, Default, Clone, Copy)]
pub struct LoggingHooks;

impl LifecycleHooks for LoggingHooks {
    fn start(&self, correlation_id: &str) -> Result<(), HookError> {
        metrics::invocation_started();
        tracing::debug!(request_id = %correlation_id, "Invocation hooks started");
        Ok(())
    }

    fn stop(&self, correlation_id: &str) {
        metrics::invocation_finished();
        tracing::debug!(request_id = %correlation_id, "Invocation hooks stopped");
    }
}

/// Entry point for bracketing one invocation.
pub struct HookLifecycle;

impl HookLifecycle {
    /// Call `start` and return the guard that owns the matching `stop`.
    ///
    /// The guard exists before `start` runs. A failing or panicking `start`
    /// is logged and the guard still stops exactly once.
    pub fn begin(hooks: Arc<dyn LifecycleHooks>, correlation_id: &str) -> HookGuard {
        let guard = HookGuard {
            hooks,
            correlation_id: correlation_id.to_string(),
            stopped: AtomicBool::new(false),
        };

        match panic::catch_unwind(AssertUnwindSafe(|| guard.hooks.start(correlation_id))) {
            Ok(Ok(())) => {}
            Ok(Err(e)) => {
                tracing::warn!(request_id = %correlation_id, error = %e, "Lifecycle hook start failed");
            }
            Err(payload) => {
                let message = crate::scoring::supervisor::panic_message(payload.as_ref());
                tracing::warn!(request_id = %correlation_id, panic = %message, "Lifecycle hook start panicked");
            }
        }
        guard
    }
}

/// Owns the single `stop` call for one invocation.
pub struct HookGuard {
    hooks: Arc<dyn LifecycleHooks>,
    correlation_id: String,
    stopped: AtomicBool,
}

impl HookGuard {
    /// Stop the hooks. Safe to call any number of times.
    pub fn stop(&self) {
        if !self.stopped.swap(true, Ordering::AcqRel) {
            self.hooks.stop(&self.correlation_id);
        }
    }

    pub fn is_stopped(&self) -> bool {
        self.stopped.load(Ordering::Acquire)
    }
}

impl Drop for HookGuard {
    fn drop(&mut self) {
        self.stop();
    }
}

//! Failure reporting collaborator.

use std::panic::{self, AssertUnwindSafe};

use crate::observability::metrics;
use crate::scoring::error::ScoringError;
use crate::scoring::request::RequestContext;

/// Receives every classified failure. Fire-and-forget.
pub trait Telemetry: Send + Sync {
    fn report(&self, failure: &ScoringError, context: &RequestContext);
}

/// Reports failures as structured log events and a failure counter.
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingTelemetry;

impl Telemetry for TracingTelemetry {
    fn report(&self, failure: &ScoringError, context: &RequestContext) {
        metrics::record_failure(failure.kind().as_str());
        tracing::error!(
            request_id = %context.request_id,
            api = context.api_name,
            kind = failure.kind().as_str(),
            status = failure.status().as_u16(),
            error = %failure,
            "Scoring failure reported"
        );
    }
}

/// Deliver a report, containing any panic raised by the collaborator.
pub(crate) fn report_quietly(telemetry: &dyn Telemetry, failure: &ScoringError, context: &RequestContext) {
    let delivered = panic::catch_unwind(AssertUnwindSafe(|| telemetry.report(failure, context)));
    if delivered.is_err() {
        tracing::warn!(request_id = %context.request_id, "Telemetry reporter panicked; response unaffected");
    }
}

//! Logs and metrics for the scoring server.
//!
//! # Data Flow
//! ```text
//! transport, orchestrator, supervisor, hooks, telemetry
//!     → logging.rs (tracing events with request_id / timeout_ms / kind fields)
//!     → metrics.rs (request, failure, timeout and in-flight series)
//!
//! Sinks:
//!     → stdout (fmt layer)
//!     → Prometheus scrape listener, when metrics are enabled
//! ```

pub mod logging;
pub mod metrics;

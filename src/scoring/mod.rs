//! Bounded-time invocation engine.
//!
//! # Data Flow
//! ```text
//! POST /score
//!     → orchestrator.rs (normalize, hooks, classify, telemetry)
//!     → supervisor.rs   (deadline race on the blocking pool)
//!     → handler.rs      (deployment-supplied computation)
//!     → response.rs     (override keys → ResponseContract)
//!     → error.rs        (failures → ResponseContract)
//! ```
//!
//! # Design Decisions
//! - Deadlines are per call, never process-wide
//! - Every failure is one `ScoringError` variant before it leaves the engine
//! - Hook stop is owned by a guard, so it runs on every exit path

pub mod deadline;
pub mod error;
pub mod handler;
pub mod hooks;
pub mod orchestrator;
pub mod request;
pub mod response;
pub mod supervisor;
pub mod telemetry;

pub use deadline::Deadline;
pub use error::{ErrorKind, Outcome, RunError, ScoringError};
pub use handler::{EchoHandler, ScoringHandler};
pub use hooks::{HookError, HookGuard, HookLifecycle, LifecycleHooks, LoggingHooks, NoopHooks};
pub use orchestrator::Orchestrator;
pub use request::{InvocationParams, InvocationRequest, NormalizedHeaders, Param, RequestContext};
pub use response::{ResponseBody, ResponseContract, ResponseShaper};
pub use supervisor::TimeoutSupervisor;
pub use telemetry::{Telemetry, TracingTelemetry};

//! Failure taxonomy for scoring invocations.
//!
//! Every failure that leaves the orchestrator is exactly one of these kinds.
//! The transport only needs the carried status and the body rule.

use axum::http::StatusCode;
use serde_json::Value;
use thiserror::Error;

use crate::scoring::response::{ResponseBody, ResponseContract};

/// Discriminant of [`ScoringError`], used for metrics and logs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    ClientFault,
    ServerFault,
    HandlerFault,
    Timeout,
    Unclassified,
}

impl ErrorKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorKind::ClientFault => "client_fault",
            ErrorKind::ServerFault => "server_fault",
            ErrorKind::HandlerFault => "handler_fault",
            ErrorKind::Timeout => "timeout",
            ErrorKind::Unclassified => "unclassified",
        }
    }
}

/// A classified invocation failure.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ScoringError {
    /// The request itself was at fault. Rendered as structured JSON.
    #[error("client fault ({status}): {detail}")]
    ClientFault { status: StatusCode, detail: Value },

    /// The serving side was at fault. Rendered as structured JSON.
    #[error("server fault ({status}): {detail}")]
    ServerFault { status: StatusCode, detail: Value },

    /// The handler failed. The message is sent back raw.
    #[error("{message}")]
    HandlerFault { message: String, status: StatusCode },

    /// The deadline fired before the handler returned. Sent back raw.
    #[error("{message}")]
    Timeout { message: String, status: StatusCode },

    /// Anything that escaped classification.
    #[error("An unexpected internal error occurred. {0}")]
    Unclassified(String),
}

/// Result of a single invocation: the handler's value or one classified failure.
pub type Outcome = Result<Value, ScoringError>;

impl ScoringError {
    /// Client fault with a `{"message": ...}` detail.
    pub fn client(status: StatusCode, message: impl Into<String>) -> Self {
        ScoringError::ClientFault {
            status,
            detail: message_detail(message.into()),
        }
    }

    /// Server fault with a `{"message": ...}` detail.
    pub fn server(status: StatusCode, message: impl Into<String>) -> Self {
        ScoringError::ServerFault {
            status,
            detail: message_detail(message.into()),
        }
    }

    pub fn handler(message: impl Into<String>, status: StatusCode) -> Self {
        ScoringError::HandlerFault {
            message: message.into(),
            status,
        }
    }

    /// Timeout after `timeout_ms` milliseconds.
    pub fn timeout(timeout_ms: u64, status: StatusCode) -> Self {
        ScoringError::Timeout {
            message: format!("Scoring timeout after {} ms", timeout_ms),
            status,
        }
    }

    pub fn kind(&self) -> ErrorKind {
        match self {
            ScoringError::ClientFault { .. } => ErrorKind::ClientFault,
            ScoringError::ServerFault { .. } => ErrorKind::ServerFault,
            ScoringError::HandlerFault { .. } => ErrorKind::HandlerFault,
            ScoringError::Timeout { .. } => ErrorKind::Timeout,
            ScoringError::Unclassified(_) => ErrorKind::Unclassified,
        }
    }

    pub fn status(&self) -> StatusCode {
        match self {
            ScoringError::ClientFault { status, .. }
            | ScoringError::ServerFault { status, .. }
            | ScoringError::HandlerFault { status, .. }
            | ScoringError::Timeout { status, .. } => *status,
            ScoringError::Unclassified(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Render the failure into the contract the transport sends back.
    pub fn into_contract(self) -> ResponseContract {
        let status = self.status();
        match self {
            ScoringError::ClientFault { detail, .. } | ScoringError::ServerFault { detail, .. } => {
                ResponseContract::new(status, Some(ResponseBody::Value(detail)))
            }
            ScoringError::HandlerFault { message, .. } | ScoringError::Timeout { message, .. } => {
                let mut contract = ResponseContract::new(status, Some(ResponseBody::Text(message)));
                contract.run_function_failed = true;
                contract
            }
            unclassified @ ScoringError::Unclassified(_) => {
                ResponseContract::new(status, Some(ResponseBody::Text(unclassified.to_string())))
            }
        }
    }
}

fn message_detail(message: String) -> Value {
    serde_json::json!({ "message": message })
}

/// Failure reported by a handler.
///
/// `Client` and `Server` pass through the orchestrator unchanged. Everything
/// else is demoted to a handler fault carrying the error's text.
#[derive(Debug, Error)]
pub enum RunError {
    #[error("client fault ({status}): {detail}")]
    Client { status: StatusCode, detail: Value },

    #[error("server fault ({status}): {detail}")]
    Server { status: StatusCode, detail: Value },

    #[error("{0}")]
    Failed(Box<dyn std::error::Error + Send + Sync>),
}

impl RunError {
    pub fn client(status: StatusCode, message: impl Into<String>) -> Self {
        RunError::Client {
            status,
            detail: message_detail(message.into()),
        }
    }

    pub fn server(status: StatusCode, message: impl Into<String>) -> Self {
        RunError::Server {
            status,
            detail: message_detail(message.into()),
        }
    }

    /// Wrap any error as an unclassified handler failure.
    pub fn failed(err: impl Into<Box<dyn std::error::Error + Send + Sync>>) -> Self {
        RunError::Failed(err.into())
    }

    /// Classify into the taxonomy; unknown failures become handler faults.
    pub fn classify(self, handler_failure_status: StatusCode) -> ScoringError {
        match self {
            RunError::Client { status, detail } => ScoringError::ClientFault { status, detail },
            RunError::Server { status, detail } => ScoringError::ServerFault { status, detail },
            RunError::Failed(err) => ScoringError::handler(err.to_string(), handler_failure_status),
        }
    }
}

impl From<String> for RunError {
    fn from(message: String) -> Self {
        RunError::Failed(message.into())
    }
}

impl From<&str> for RunError {
    fn from(message: &str) -> Self {
        RunError::Failed(message.into())
    }
}

impl From<std::io::Error> for RunError {
    fn from(err: std::io::Error) -> Self {
        RunError::Failed(Box::new(err))
    }
}

impl From<serde_json::Error> for RunError {
    fn from(err: serde_json::Error) -> Self {
        RunError::Failed(Box::new(err))
    }
}

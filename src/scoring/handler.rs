//! The pluggable computation served at `/score`.

use serde_json::Value;

use crate::scoring::error::RunError;
use crate::scoring::request::InvocationParams;

/// A deployment-supplied scoring function.
///
/// Called synchronously on a blocking worker thread. Implementations may block
/// for arbitrarily long; the supervisor bounds the caller's wait, not the
/// handler's execution. Long-running handlers can poll
/// [`crate::scoring::deadline::current`] to stop early after a timeout.
pub trait ScoringHandler: Send + Sync + 'static {
    fn run(&self, params: InvocationParams) -> Result<Value, RunError>;
}

impl<F> ScoringHandler for F
where
    F: Fn(InvocationParams) -> Result<Value, RunError> + Send + Sync + 'static,
{
    fn run(&self, params: InvocationParams) -> Result<Value, RunError> {
        self(params)
    }
}

/// Returns the request body: parsed JSON when possible, UTF-8 text otherwise.
///
/// With header passthrough enabled the result is
/// `{"body": ..., "headers": {...}}`.
#[derive(Debug, Default, Clone, Copy)]
pub struct EchoHandler;

impl ScoringHandler for EchoHandler {
    fn run(&self, params: InvocationParams) -> Result<Value, RunError> {
        let body = params.body();
        let echoed = match serde_json::from_slice::<Value>(body) {
            Ok(value) => value,
            Err(_) => Value::String(String::from_utf8_lossy(body).into_owned()),
        };

        match params.headers() {
            Some(headers) => Ok(serde_json::json!({
                "body": echoed,
                "headers": headers,
            })),
            None => Ok(echoed),
        }
    }
}

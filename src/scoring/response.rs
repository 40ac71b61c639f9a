//! Response contract and shaping of handler output.
//!
//! # Responsibilities
//! - Interpret override keys in a handler's returned object
//! - Produce the final (status, headers, body) contract
//! - Convert the contract to an HTTP response at the transport boundary
//!
//! # Design Decisions
//! - Override detection is key presence on a JSON object; nothing else is inspected
//! - Raw vs structured encoding is decided once, in `IntoResponse`
//! - A handler-supplied Content-Type wins over the default

use std::collections::BTreeMap;

use axum::body::Body;
use axum::http::{header, HeaderName, HeaderValue, StatusCode};
use axum::response::{IntoResponse, Response};
use serde_json::Value;

use crate::config::ScoringConfig;

/// Header flagging responses where the handler failed or timed out.
pub const RUN_FUNCTION_FAILED_HEADER: &str = "x-run-function-failed";

/// Body of a response contract.
#[derive(Debug, Clone, PartialEq)]
pub enum ResponseBody {
    /// Structured value; strings are sent raw, everything else as JSON.
    Value(Value),
    /// Raw text, never JSON-encoded.
    Text(String),
}

/// Final response handed to the transport. Consumed exactly once.
#[derive(Debug, Clone, PartialEq)]
pub struct ResponseContract {
    pub status: StatusCode,
    pub headers: BTreeMap<String, String>,
    pub body: Option<ResponseBody>,
    pub run_function_failed: bool,
}

impl ResponseContract {
    pub fn new(status: StatusCode, body: Option<ResponseBody>) -> Self {
        Self {
            status,
            headers: BTreeMap::new(),
            body,
            run_function_failed: false,
        }
    }

    /// Whether the body is sent as-is rather than JSON-encoded.
    pub fn is_raw(&self) -> bool {
        matches!(
            self.body,
            Some(ResponseBody::Text(_)) | Some(ResponseBody::Value(Value::String(_)))
        )
    }
}

/// Turns a handler's return value into a response contract.
#[derive(Debug, Clone)]
pub struct ResponseShaper {
    success_status: StatusCode,
    headers_key: String,
    body_key: String,
}

impl ResponseShaper {
    pub fn new(success_status: StatusCode, headers_key: impl Into<String>, body_key: impl Into<String>) -> Self {
        Self {
            success_status,
            headers_key: headers_key.into(),
            body_key: body_key.into(),
        }
    }

    pub fn from_config(config: &ScoringConfig) -> Self {
        Self::new(
            StatusCode::from_u16(config.success_status).unwrap_or(StatusCode::OK),
            config.response_headers_key.clone(),
            config.response_body_key.clone(),
        )
    }

    pub fn shape(&self, value: Value) -> ResponseContract {
        let mut contract = ResponseContract::new(self.success_status, None);

        let mut object = match value {
            Value::Object(object)
                if object.contains_key(&self.headers_key) || object.contains_key(&self.body_key) =>
            {
                object
            }
            other => {
                contract.body = Some(ResponseBody::Value(other));
                return contract;
            }
        };

        if let Some(headers) = object.remove(&self.headers_key) {
            tracing::info!("{} are available from handler output", self.headers_key);
            contract.headers = header_overrides(headers, &self.headers_key);
        }

        if let Some(body) = object.remove(&self.body_key) {
            tracing::info!("{} is available from handler output", self.body_key);
            contract.body = match body {
                Value::Null => None,
                body => Some(ResponseBody::Value(body)),
            };
        }

        contract
    }
}

fn header_overrides(value: Value, key: &str) -> BTreeMap<String, String> {
    match value {
        Value::Object(entries) => entries
            .into_iter()
            .map(|(name, value)| {
                let value = match value {
                    Value::String(s) => s,
                    other => other.to_string(),
                };
                (name, value)
            })
            .collect(),
        Value::Null => BTreeMap::new(),
        other => {
            tracing::warn!(key = %key, value = %other, "Header override is not an object; ignoring");
            BTreeMap::new()
        }
    }
}

impl IntoResponse for ResponseContract {
    fn into_response(self) -> Response {
        let raw = self.is_raw();
        let (content_type, body) = match self.body {
            None => (None, Body::empty()),
            Some(ResponseBody::Text(text)) | Some(ResponseBody::Value(Value::String(text))) => {
                (Some("text/plain; charset=utf-8"), Body::from(text))
            }
            Some(ResponseBody::Value(value)) => match serde_json::to_vec(&value) {
                Ok(bytes) => (Some("application/json"), Body::from(bytes)),
                Err(e) => {
                    tracing::error!(error = %e, "Failed to encode response body");
                    return (StatusCode::INTERNAL_SERVER_ERROR, "Failed to encode response body")
                        .into_response();
                }
            },
        };

        let mut response = Response::new(body);
        *response.status_mut() = self.status;

        let headers = response.headers_mut();
        for (name, value) in &self.headers {
            match (HeaderName::try_from(name.as_str()), HeaderValue::from_str(value)) {
                (Ok(name), Ok(value)) => {
                    headers.insert(name, value);
                }
                _ => tracing::warn!(header = %name, "Dropping invalid response header"),
            }
        }

        if let Some(content_type) = content_type {
            if !headers.contains_key(header::CONTENT_TYPE) {
                headers.insert(header::CONTENT_TYPE, HeaderValue::from_static(content_type));
            }
        }

        if self.run_function_failed {
            headers.insert(RUN_FUNCTION_FAILED_HEADER, HeaderValue::from_static("true"));
        }

        tracing::trace!(status = %self.status, raw, "Response contract rendered");
        response
    }
}

//! Inbound request view and handler parameters.
//!
//! # Responsibilities
//! - Hold the immutable body/header view of one invocation
//! - Normalize headers: case-insensitive keys, duplicates joined with ", "
//! - Build the parameter mapping handed to the handler

use std::collections::BTreeMap;

use axum::body::Bytes;
use axum::http::HeaderMap;
use serde::Serialize;

/// Correlation id used when the transport did not supply one.
pub const DEFAULT_REQUEST_ID: &str = "00000000-0000-0000-0000-000000000000";

/// Immutable view of one scoring request.
#[derive(Debug, Clone)]
pub struct InvocationRequest {
    body: Bytes,
    headers: Vec<(String, String)>,
}

impl InvocationRequest {
    /// Build a request from a body and headers in declaration order.
    pub fn new<I, K, V>(body: impl Into<Bytes>, headers: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        Self {
            body: body.into(),
            headers: headers
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        }
    }

    /// Build a request from an HTTP header map. Non UTF-8 values are decoded lossily.
    pub fn from_http(body: Bytes, headers: &HeaderMap) -> Self {
        Self {
            body,
            headers: headers
                .iter()
                .map(|(name, value)| {
                    (
                        name.as_str().to_string(),
                        String::from_utf8_lossy(value.as_bytes()).into_owned(),
                    )
                })
                .collect(),
        }
    }

    pub fn body(&self) -> &Bytes {
        &self.body
    }

    /// Raw headers in declaration order.
    pub fn headers(&self) -> &[(String, String)] {
        &self.headers
    }
}

/// Request headers after normalization.
///
/// Keys are stored in canonical `Title-Case`, so lookup ignores case.
/// Repeated headers are joined by `", "` in the order they arrived.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct NormalizedHeaders(BTreeMap<String, String>);

impl NormalizedHeaders {
    pub fn from_pairs<'a, I>(pairs: I) -> Self
    where
        I: IntoIterator<Item = &'a (String, String)>,
    {
        let mut map: BTreeMap<String, String> = BTreeMap::new();
        for (name, value) in pairs {
            map.entry(canonical_name(name))
                .and_modify(|joined| {
                    joined.push_str(", ");
                    joined.push_str(value);
                })
                .or_insert_with(|| value.clone());
        }
        Self(map)
    }

    /// Case-insensitive lookup.
    pub fn get(&self, name: &str) -> Option<&str> {
        self.0.get(&canonical_name(name)).map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.0.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }
}

/// `x-REQUEST-id` → `X-Request-Id`.
fn canonical_name(name: &str) -> String {
    name.split('-')
        .map(|segment| {
            let mut chars = segment.chars();
            match chars.next() {
                Some(first) => first
                    .to_uppercase()
                    .chain(chars.flat_map(char::to_lowercase))
                    .collect::<String>(),
                None => String::new(),
            }
        })
        .collect::<Vec<_>>()
        .join("-")
}

/// A single parameter value handed to the handler.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Param {
    Body(Bytes),
    Headers(NormalizedHeaders),
}

/// Named parameters for one handler call, built fresh per invocation.
#[derive(Debug, Clone, Default)]
pub struct InvocationParams {
    entries: Vec<(String, Param)>,
}

impl InvocationParams {
    /// Body under `body_name`; headers under `headers_name` when passthrough is on.
    pub fn build(
        request: &InvocationRequest,
        body_name: &str,
        headers_name: Option<&str>,
    ) -> Self {
        let mut entries = vec![(body_name.to_string(), Param::Body(request.body().clone()))];
        if let Some(headers_name) = headers_name {
            entries.push((
                headers_name.to_string(),
                Param::Headers(NormalizedHeaders::from_pairs(request.headers())),
            ));
        }
        Self { entries }
    }

    pub fn get(&self, name: &str) -> Option<&Param> {
        self.entries
            .iter()
            .find(|(key, _)| key == name)
            .map(|(_, param)| param)
    }

    /// The request body, whatever name it was passed under.
    pub fn body(&self) -> &[u8] {
        self.entries
            .iter()
            .find_map(|(_, param)| match param {
                Param::Body(bytes) => Some(bytes.as_ref()),
                Param::Headers(_) => None,
            })
            .unwrap_or_default()
    }

    /// Normalized headers, if header passthrough is enabled.
    pub fn headers(&self) -> Option<&NormalizedHeaders> {
        self.entries.iter().find_map(|(_, param)| match param {
            Param::Headers(headers) => Some(headers),
            Param::Body(_) => None,
        })
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|(name, _)| name.as_str())
    }
}

/// Per-request context handed to hooks and telemetry.
#[derive(Debug, Clone)]
pub struct RequestContext {
    pub request_id: String,
    pub api_name: &'static str,
}

impl RequestContext {
    pub fn new(request_id: impl Into<String>, api_name: &'static str) -> Self {
        Self {
            request_id: request_id.into(),
            api_name,
        }
    }
}

impl Default for RequestContext {
    fn default() -> Self {
        Self::new(DEFAULT_REQUEST_ID, "/score")
    }
}

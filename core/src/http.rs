//! HTTP-level types shared by the dispatcher and its transports.
//!
//! # Design
//! Requests and responses are plain data. The dispatcher resolves a
//! `TransportRequest` and hands it to whatever `Transport` it was built with;
//! the transport returns a `TransportResponse` or a `TransportError`. Header
//! and query maps are `BTreeMap`s so every log record renders in a stable
//! order.

use std::collections::BTreeMap;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::types::Body;

pub const AUTHORIZATION: &str = "Authorization";

/// Header name to value. Keys are kept exactly as the caller wrote them.
pub type Headers = BTreeMap<String, String>;

/// Query parameter name to one or more values.
pub type QueryParams = BTreeMap<String, QueryValue>;

/// HTTP method for a request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum HttpMethod {
    Get,
    Post,
    Put,
    Patch,
    Delete,
}

/// Which optional request fields a method-specific entry point forwards.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FieldSet {
    pub body: bool,
    pub query: bool,
}

impl HttpMethod {
    pub fn as_str(self) -> &'static str {
        match self {
            HttpMethod::Get => "GET",
            HttpMethod::Post => "POST",
            HttpMethod::Put => "PUT",
            HttpMethod::Patch => "PATCH",
            HttpMethod::Delete => "DELETE",
        }
    }

    pub const fn fields(self) -> FieldSet {
        match self {
            HttpMethod::Get | HttpMethod::Delete => FieldSet { body: false, query: true },
            HttpMethod::Post => FieldSet { body: true, query: true },
            HttpMethod::Put | HttpMethod::Patch => FieldSet { body: true, query: false },
        }
    }
}

impl std::fmt::Display for HttpMethod {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A single query value or a list sent as the same key repeated.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum QueryValue {
    One(String),
    Many(Vec<String>),
}

impl QueryValue {
    pub fn values(&self) -> impl Iterator<Item = &str> {
        let slice: &[String] = match self {
            QueryValue::One(value) => std::slice::from_ref(value),
            QueryValue::Many(values) => values,
        };
        slice.iter().map(String::as_str)
    }
}

impl From<&str> for QueryValue {
    fn from(value: &str) -> Self {
        QueryValue::One(value.to_string())
    }
}

impl From<String> for QueryValue {
    fn from(value: String) -> Self {
        QueryValue::One(value)
    }
}

impl From<Vec<String>> for QueryValue {
    fn from(values: Vec<String>) -> Self {
        QueryValue::Many(values)
    }
}

/// Transport-specific settings applied after everything the dispatcher
/// computes. Method, url and body are never overridable from here.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransportOptions {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timeout_ms: Option<u64>,

    /// Merged over the resolved headers; these win on key collision.
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub headers: Headers,
}

impl TransportOptions {
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout_ms = Some(u64::try_from(timeout.as_millis()).unwrap_or(u64::MAX));
        self
    }

    pub fn with_header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.insert(name.into(), value.into());
        self
    }

    pub fn timeout(&self) -> Option<Duration> {
        self.timeout_ms.map(Duration::from_millis)
    }

    pub fn is_empty(&self) -> bool {
        self.timeout_ms.is_none() && self.headers.is_empty()
    }
}

/// A fully resolved outbound call, produced by the dispatcher.
#[derive(Debug, Clone, PartialEq)]
pub struct TransportRequest {
    pub method: HttpMethod,
    pub route: String,
    pub headers: Headers,
    pub body: Option<Body>,
    pub query: Option<QueryParams>,
    pub options: Option<TransportOptions>,
}

/// An HTTP response described as plain data.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransportResponse {
    pub status: u16,
    pub status_text: String,
    pub headers: Vec<(String, String)>,
    pub body: String,
}

pub fn default_headers() -> Headers {
    Headers::from([
        ("Content-Type".to_string(), "application/json".to_string()),
        ("Accept".to_string(), "application/json".to_string()),
    ])
}

/// Build the header view for one call.
///
/// Absent headers fall back to [`default_headers`]. A bearer token replaces
/// any existing authorization entry, whatever its case.
pub fn resolve_headers(headers: Option<&Headers>, auth_token: Option<&str>) -> Headers {
    let mut resolved = headers.cloned().unwrap_or_else(default_headers);
    if let Some(token) = auth_token {
        resolved.retain(|name, _| !name.eq_ignore_ascii_case(AUTHORIZATION));
        resolved.insert(AUTHORIZATION.to_string(), format!("Bearer {token}"));
    }
    resolved
}

/// Overlay option headers on the resolved set. Shallow overwrite.
pub fn effective_headers(resolved: &Headers, options: Option<&TransportOptions>) -> Headers {
    let mut merged = resolved.clone();
    if let Some(options) = options {
        for (name, value) in &options.headers {
            merged.retain(|existing, _| !existing.eq_ignore_ascii_case(name));
            merged.insert(name.clone(), value.clone());
        }
    }
    merged
}

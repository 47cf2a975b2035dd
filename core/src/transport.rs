//! The transport capability and its reqwest-backed implementation.
//!
//! # Design
//! The dispatcher only knows the `Transport` trait. `ReqwestTransport` owns
//! the base url, the certificate policy and a pooled `reqwest::Client`; all
//! three are fixed for its lifetime. Like a browser-side HTTP client it
//! reports non-2xx statuses as errors that still carry the response, unless
//! `status_as_error(false)` is set.

use std::error::Error as StdError;
use std::time::Duration;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use url::Url;

use crate::error::TransportError;
use crate::http::{effective_headers, HttpMethod, QueryParams, TransportRequest, TransportResponse};
use crate::types::Body;

#[async_trait]
pub trait Transport: Send + Sync {
    async fn request(&self, request: TransportRequest) -> Result<TransportResponse, TransportError>;
}

/// Server certificate handling.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TlsPolicy {
    Strict,
    /// Accept self-signed and otherwise invalid certificates. Test
    /// environments only.
    AcceptInvalidCerts,
}

#[derive(Debug, Clone)]
pub struct ReqwestTransport {
    client: reqwest::Client,
    base_url: String,
    tls: TlsPolicy,
    status_as_error: bool,
}

impl ReqwestTransport {
    pub fn new(base_url: &str, tls: TlsPolicy) -> Result<Self, TransportError> {
        Self::with_timeout(base_url, tls, None)
    }

    /// `timeout` applies to every request that does not set its own.
    pub fn with_timeout(
        base_url: &str,
        tls: TlsPolicy,
        timeout: Option<Duration>,
    ) -> Result<Self, TransportError> {
        let mut builder = reqwest::Client::builder()
            .danger_accept_invalid_certs(tls == TlsPolicy::AcceptInvalidCerts);
        if let Some(timeout) = timeout {
            builder = builder.timeout(timeout);
        }
        let client = builder
            .build()
            .map_err(|e| TransportError::without_response(error_chain(&e)))?;

        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            tls,
            status_as_error: true,
        })
    }

    pub fn status_as_error(mut self, enabled: bool) -> Self {
        self.status_as_error = enabled;
        self
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn tls_policy(&self) -> TlsPolicy {
        self.tls
    }

    /// Absolute routes are used as-is; anything else hangs off the base url.
    fn resolve_url(&self, route: &str, query: Option<&QueryParams>) -> Result<Url, url::ParseError> {
        let mut url = if route.starts_with("http://") || route.starts_with("https://") {
            Url::parse(route)?
        } else {
            Url::parse(&format!("{}/{}", self.base_url, route.trim_start_matches('/')))?
        };

        if let Some(query) = query.filter(|q| !q.is_empty()) {
            let mut pairs = url.query_pairs_mut();
            for (name, value) in query {
                for item in value.values() {
                    pairs.append_pair(name, item);
                }
            }
        }
        Ok(url)
    }
}

fn to_reqwest_method(method: HttpMethod) -> reqwest::Method {
    match method {
        HttpMethod::Get => reqwest::Method::GET,
        HttpMethod::Post => reqwest::Method::POST,
        HttpMethod::Put => reqwest::Method::PUT,
        HttpMethod::Patch => reqwest::Method::PATCH,
        HttpMethod::Delete => reqwest::Method::DELETE,
    }
}

/// Render an error with its sources, since reqwest keeps the useful part
/// (connection refused, dns failure) in the chain.
fn error_chain(err: &dyn StdError) -> String {
    let mut message = err.to_string();
    let mut source = err.source();
    while let Some(cause) = source {
        message.push_str(": ");
        message.push_str(&cause.to_string());
        source = cause.source();
    }
    message
}

#[async_trait]
impl Transport for ReqwestTransport {
    async fn request(&self, request: TransportRequest) -> Result<TransportResponse, TransportError> {
        let url = self
            .resolve_url(&request.route, request.query.as_ref())
            .map_err(|e| TransportError::without_response(format!("Invalid URL: {e}")))?;
        tracing::trace!(method = %request.method, %url, "sending request");

        let mut builder = self.client.request(to_reqwest_method(request.method), url);
        for (name, value) in effective_headers(&request.headers, request.options.as_ref()) {
            builder = builder.header(name, value);
        }
        if let Some(timeout) = request.options.as_ref().and_then(|o| o.timeout()) {
            builder = builder.timeout(timeout);
        }
        builder = match request.body {
            Some(Body::Json(value)) => builder.json(&value),
            Some(Body::Bytes(bytes)) => builder.body(bytes),
            None => builder,
        };

        let response = builder
            .send()
            .await
            .map_err(|e| TransportError::without_response(error_chain(&e)))?;

        let status = response.status();
        let headers = response
            .headers()
            .iter()
            .map(|(name, value)| {
                (
                    name.as_str().to_string(),
                    value.to_str().unwrap_or_default().to_string(),
                )
            })
            .collect();
        let mut received = TransportResponse {
            status: status.as_u16(),
            status_text: status.canonical_reason().unwrap_or_default().to_string(),
            headers,
            body: String::new(),
        };

        match response.text().await {
            Ok(body) => received.body = body,
            Err(e) => return Err(TransportError::with_response(error_chain(&e), received)),
        }
        tracing::trace!(status = received.status, "response received");

        if self.status_as_error && !status.is_success() {
            let message = format!("Request failed with status code {}", received.status);
            return Err(TransportError::with_response(message, received));
        }
        Ok(received)
    }
}

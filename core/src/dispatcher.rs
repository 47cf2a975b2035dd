//! Single entry point for every outbound call a scenario makes.
//!
//! # Design
//! `RequestDispatcher` holds a transport and a log sink and nothing else.
//! `dispatch` resolves headers, emits the request record, awaits the
//! transport once, folds whatever came back into a `CallOutcome`, and emits
//! the summary line. It has no error path: failures are data in the outcome.

use std::sync::Arc;

use crate::config::DispatcherConfig;
use crate::error::TransportError;
use crate::http::{resolve_headers, HttpMethod, TransportRequest, TransportResponse};
use crate::record;
use crate::sink::LogSink;
use crate::transport::{ReqwestTransport, Transport};
use crate::types::{CallArgs, CallOutcome, Payload, RequestSpec, TransportFailure};

#[derive(Clone)]
pub struct RequestDispatcher {
    transport: Arc<dyn Transport>,
    sink: Arc<dyn LogSink>,
}

impl std::fmt::Debug for RequestDispatcher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RequestDispatcher").finish_non_exhaustive()
    }
}

impl RequestDispatcher {
    pub fn new(transport: Arc<dyn Transport>, sink: Arc<dyn LogSink>) -> Self {
        Self { transport, sink }
    }

    /// Build a dispatcher over `ReqwestTransport` for the configured origin.
    pub fn from_config(config: &DispatcherConfig, sink: Arc<dyn LogSink>) -> Result<Self, TransportError> {
        let transport = ReqwestTransport::with_timeout(&config.base_url, config.tls, config.timeout())?;
        Ok(Self::new(Arc::new(transport), sink))
    }

    pub async fn dispatch(&self, spec: &RequestSpec) -> CallOutcome {
        let headers = resolve_headers(spec.headers.as_ref(), spec.auth_token.as_deref());

        self.emit(&record::request_record(
            spec.method,
            &spec.route,
            &headers,
            spec.query.as_ref(),
            spec.transport_options.as_ref(),
            spec.body.as_ref(),
        ));

        let request = TransportRequest {
            method: spec.method,
            route: spec.route.clone(),
            headers,
            body: spec.body.clone(),
            query: spec.query.clone(),
            options: spec.transport_options.clone(),
        };
        let outcome = match self.transport.request(request).await {
            Ok(response) => {
                let summary = record::success_summary(response.status, &response.status_text);
                received(true, response, summary)
            }
            Err(TransportError {
                message,
                response: Some(response),
            }) => {
                let summary =
                    record::status_error_summary(response.status, &response.status_text, &message);
                received(false, response, summary)
            }
            Err(TransportError {
                message,
                response: None,
            }) => CallOutcome {
                succeeded: false,
                status: None,
                status_text: None,
                headers: Vec::new(),
                payload: None,
                summary: record::transport_failure_summary(&message),
                transport_error: Some(TransportFailure { message }),
            },
        };

        self.emit(&outcome.summary);
        outcome
    }

    pub async fn get(&self, args: CallArgs) -> CallOutcome {
        self.dispatch(&RequestSpec::for_method(HttpMethod::Get, args)).await
    }

    pub async fn post(&self, args: CallArgs) -> CallOutcome {
        self.dispatch(&RequestSpec::for_method(HttpMethod::Post, args)).await
    }

    pub async fn put(&self, args: CallArgs) -> CallOutcome {
        self.dispatch(&RequestSpec::for_method(HttpMethod::Put, args)).await
    }

    pub async fn patch(&self, args: CallArgs) -> CallOutcome {
        self.dispatch(&RequestSpec::for_method(HttpMethod::Patch, args)).await
    }

    pub async fn delete(&self, args: CallArgs) -> CallOutcome {
        self.dispatch(&RequestSpec::for_method(HttpMethod::Delete, args)).await
    }

    fn emit(&self, record: &str) {
        if let Err(err) = self.sink.emit(record) {
            tracing::warn!(error = %err, "dispatch record dropped");
        }
    }
}

fn received(succeeded: bool, response: TransportResponse, summary: String) -> CallOutcome {
    CallOutcome {
        succeeded,
        payload: Payload::from_body(&response.body),
        status: Some(response.status),
        status_text: Some(response.status_text),
        headers: response.headers,
        transport_error: None,
        summary,
    }
}

//! Request dispatch core for end-to-end API scenarios.
//!
//! # Overview
//! Scenarios describe each call as a `RequestSpec` and hand it to a
//! `RequestDispatcher`. The dispatcher resolves headers (JSON defaults,
//! bearer token), logs a readable record of the request, sends it through an
//! injected `Transport`, and returns a `CallOutcome` that carries the status,
//! the payload, or the transport failure. It never returns an error.
//!
//! # Design
//! - The transport and the log sink are injected, so scenarios can swap in a
//!   stub transport or a `MemorySink` without touching global state.
//! - `ReqwestTransport` is the production transport; its base url and TLS
//!   policy are fixed at construction.
//! - Tokens live in a caller-owned `AuthSession`; the dispatcher keeps none.

pub mod auth;
pub mod config;
pub mod dispatcher;
pub mod error;
pub mod http;
pub mod record;
pub mod sink;
pub mod transport;
pub mod types;

pub use auth::{AuthResponseBody, AuthSession};
pub use config::DispatcherConfig;
pub use dispatcher::RequestDispatcher;
pub use error::{ConfigError, DecodeError, LogError, TransportError};
pub use http::{
    default_headers, resolve_headers, Headers, HttpMethod, QueryParams, QueryValue, TransportOptions,
    TransportRequest, TransportResponse,
};
pub use sink::{LogSink, MemorySink, TracingSink};
pub use transport::{ReqwestTransport, TlsPolicy, Transport};
pub use types::{Body, CallArgs, CallOutcome, Payload, RequestSpec, TransportFailure};

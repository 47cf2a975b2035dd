//! Error types for the dispatch core.
//!
//! # Design
//! `TransportError` is the only error a transport may return. Whether it
//! carries a response is what separates an application error (the service
//! answered with a failing status) from a transport failure (nothing came
//! back). The dispatcher absorbs it into a `CallOutcome`; the other errors
//! here belong to sinks, configuration and payload decoding.

use thiserror::Error;

use crate::http::TransportResponse;

/// Failure reported by a `Transport`.
#[derive(Debug, Clone, Error)]
#[error("{message}")]
pub struct TransportError {
    pub message: String,
    pub response: Option<TransportResponse>,
}

impl TransportError {
    /// Nothing was received: DNS, connect, reset, timeout.
    pub fn without_response(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            response: None,
        }
    }

    /// The service answered, but the transport treats the answer as a failure.
    pub fn with_response(message: impl Into<String>, response: TransportResponse) -> Self {
        Self {
            message: message.into(),
            response: Some(response),
        }
    }
}

/// A log sink could not take a record.
#[derive(Debug, Error)]
#[error("log sink failed: {0}")]
pub struct LogError(pub String);

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid dispatcher configuration: {0}")]
    Invalid(#[from] Box<figment::Error>),
}

impl From<figment::Error> for ConfigError {
    fn from(err: figment::Error) -> Self {
        ConfigError::Invalid(Box::new(err))
    }
}

/// A response payload could not be turned into the requested type.
#[derive(Debug, Error)]
pub enum DecodeError {
    #[error("response had no body")]
    Empty,

    #[error("response body is not JSON")]
    NotJson,

    #[error("response body has unexpected shape: {0}")]
    Shape(String),
}

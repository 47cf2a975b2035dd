//! Request and outcome types for one dispatch.
//!
//! # Design
//! A `RequestSpec` is built per call and only ever borrowed by the
//! dispatcher, so the caller's headers, query and options are never touched.
//! A `CallOutcome` is returned by value and holds everything the assertion
//! layer needs: raw status, decoded payload, and the summary line that was
//! logged.

use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::auth::AuthSession;
use crate::error::DecodeError;
use crate::http::{Headers, HttpMethod, QueryParams, QueryValue, TransportOptions};

/// Outbound request payload.
#[derive(Debug, Clone, PartialEq)]
pub enum Body {
    /// A structured value, sent as JSON.
    Json(serde_json::Value),
    /// Opaque bytes, sent as-is and never rendered into log records.
    Bytes(Vec<u8>),
}

impl Body {
    pub fn json<T: Serialize>(value: &T) -> Result<Self, serde_json::Error> {
        serde_json::to_value(value).map(Body::Json)
    }
}

impl From<serde_json::Value> for Body {
    fn from(value: serde_json::Value) -> Self {
        Body::Json(value)
    }
}

/// Describes one outbound call.
#[derive(Debug, Clone, PartialEq)]
pub struct RequestSpec {
    pub route: String,
    pub method: HttpMethod,
    pub headers: Option<Headers>,
    pub auth_token: Option<String>,
    pub body: Option<Body>,
    pub query: Option<QueryParams>,
    pub transport_options: Option<TransportOptions>,
}

impl RequestSpec {
    pub fn new(method: HttpMethod, route: impl Into<String>) -> Self {
        Self {
            route: route.into(),
            method,
            headers: None,
            auth_token: None,
            body: None,
            query: None,
            transport_options: None,
        }
    }

    /// Build a spec for `method`, keeping only the fields that method
    /// forwards.
    pub fn for_method(method: HttpMethod, args: CallArgs) -> Self {
        let fields = method.fields();
        Self {
            route: args.route,
            method,
            headers: args.headers,
            auth_token: args.auth_token,
            body: args.body.filter(|_| fields.body),
            query: args.query.filter(|_| fields.query),
            transport_options: args.transport_options,
        }
    }

    pub fn headers(mut self, headers: Headers) -> Self {
        self.headers = Some(headers);
        self
    }

    pub fn header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers
            .get_or_insert_with(Headers::new)
            .insert(name.into(), value.into());
        self
    }

    pub fn auth_token(mut self, token: impl Into<String>) -> Self {
        self.auth_token = Some(token.into());
        self
    }

    /// Use the session's token, if it holds one.
    pub fn with_session(mut self, session: &AuthSession) -> Self {
        if let Some(token) = session.token() {
            self.auth_token = Some(token.to_string());
        }
        self
    }

    pub fn body(mut self, body: impl Into<Body>) -> Self {
        self.body = Some(body.into());
        self
    }

    pub fn query(mut self, name: impl Into<String>, value: impl Into<QueryValue>) -> Self {
        self.query
            .get_or_insert_with(QueryParams::new)
            .insert(name.into(), value.into());
        self
    }

    pub fn transport_options(mut self, options: TransportOptions) -> Self {
        self.transport_options = Some(options);
        self
    }
}

/// Arguments accepted by the method-specific dispatcher entry points.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CallArgs {
    pub route: String,
    pub auth_token: Option<String>,
    pub headers: Option<Headers>,
    pub body: Option<Body>,
    pub query: Option<QueryParams>,
    pub transport_options: Option<TransportOptions>,
}

impl CallArgs {
    pub fn new(route: impl Into<String>) -> Self {
        Self {
            route: route.into(),
            ..Self::default()
        }
    }
}

/// Response body as received.
#[derive(Debug, Clone, PartialEq)]
pub enum Payload {
    Json(serde_json::Value),
    Text(String),
}

impl Payload {
    /// Empty bodies yield `None`; anything that is not JSON is kept as text.
    pub fn from_body(body: &str) -> Option<Self> {
        if body.is_empty() {
            return None;
        }
        Some(match serde_json::from_str(body) {
            Ok(value) => Payload::Json(value),
            Err(_) => Payload::Text(body.to_string()),
        })
    }
}

/// No response was obtained at all.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransportFailure {
    pub message: String,
}

/// Result of one dispatch. Never raised; always returned.
#[derive(Debug, Clone, PartialEq)]
pub struct CallOutcome {
    /// The transport returned without reporting an error.
    pub succeeded: bool,
    pub status: Option<u16>,
    pub status_text: Option<String>,
    pub headers: Vec<(String, String)>,
    pub payload: Option<Payload>,
    pub transport_error: Option<TransportFailure>,
    /// The post-dispatch line emitted to the log sink.
    pub summary: String,
}

impl CallOutcome {
    pub fn json<T: DeserializeOwned>(&self) -> Result<T, DecodeError> {
        match &self.payload {
            Some(Payload::Json(value)) => {
                T::deserialize(value).map_err(|e| DecodeError::Shape(e.to_string()))
            }
            Some(Payload::Text(_)) => Err(DecodeError::NotJson),
            None => Err(DecodeError::Empty),
        }
    }

    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(key, _)| key.eq_ignore_ascii_case(name))
            .map(|(_, value)| value.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn args() -> CallArgs {
        CallArgs {
            route: "/items".to_string(),
            body: Some(Body::Json(json!({"name": "x"}))),
            query: Some(QueryParams::from([("page".to_string(), QueryValue::from("2"))])),
            ..CallArgs::default()
        }
    }

    #[test]
    fn get_and_delete_drop_body() {
        for method in [HttpMethod::Get, HttpMethod::Delete] {
            let spec = RequestSpec::for_method(method, args());
            assert!(spec.body.is_none(), "{method}");
            assert!(spec.query.is_some(), "{method}");
        }
    }

    #[test]
    fn put_and_patch_drop_query() {
        for method in [HttpMethod::Put, HttpMethod::Patch] {
            let spec = RequestSpec::for_method(method, args());
            assert!(spec.body.is_some(), "{method}");
            assert!(spec.query.is_none(), "{method}");
        }
    }

    #[test]
    fn post_keeps_body_and_query() {
        let spec = RequestSpec::for_method(HttpMethod::Post, args());
        assert_eq!(spec.route, "/items");
        assert!(spec.body.is_some());
        assert!(spec.query.is_some());
    }

    #[test]
    fn session_token_is_copied_only_when_present() {
        let mut session = AuthSession::new();
        let spec = RequestSpec::new(HttpMethod::Get, "/a").with_session(&session);
        assert!(spec.auth_token.is_none());

        session.set_token("abc");
        let spec = RequestSpec::new(HttpMethod::Get, "/a").with_session(&session);
        assert_eq!(spec.auth_token.as_deref(), Some("abc"));
    }

    #[test]
    fn payload_falls_back_to_text() {
        assert_eq!(Payload::from_body(""), None);
        assert_eq!(Payload::from_body(r#"{"id":1}"#), Some(Payload::Json(json!({"id": 1}))));
        assert_eq!(
            Payload::from_body("plain words"),
            Some(Payload::Text("plain words".to_string()))
        );
    }

    #[test]
    fn outcome_decodes_typed_payload() {
        #[derive(serde::Deserialize)]
        struct User {
            id: u32,
        }

        let mut outcome = CallOutcome {
            succeeded: true,
            status: Some(200),
            status_text: Some("OK".to_string()),
            headers: vec![("content-type".to_string(), "application/json".to_string())],
            payload: Some(Payload::Json(json!({"id": 1}))),
            transport_error: None,
            summary: String::new(),
        };
        assert_eq!(outcome.json::<User>().unwrap().id, 1);
        assert_eq!(outcome.header("Content-Type"), Some("application/json"));

        outcome.payload = Some(Payload::Text("oops".to_string()));
        assert!(matches!(outcome.json::<User>(), Err(DecodeError::NotJson)));
        outcome.payload = None;
        assert!(matches!(outcome.json::<User>(), Err(DecodeError::Empty)));
    }
}

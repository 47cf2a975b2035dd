//! Text of the records the dispatcher emits around each call.
//!
//! Values are rendered as YAML for readability. Absent fields are left out
//! of the request record entirely.

use serde::Serialize;

use crate::http::{Headers, HttpMethod, QueryParams, TransportOptions};
use crate::types::Body;

pub const NOT_JSON: &str = "Some data, not JSON!";

fn to_yaml<T: Serialize + ?Sized>(value: &T) -> Option<String> {
    serde_yaml::to_string(value)
        .ok()
        .map(|text| text.trim_end().to_string())
}

fn to_text<T: Serialize + ?Sized>(value: &T) -> String {
    to_yaml(value).unwrap_or_else(|| serde_json::to_string(value).unwrap_or_default())
}

fn render_body(body: &Body) -> String {
    match body {
        Body::Json(value) => to_yaml(value).unwrap_or_else(|| NOT_JSON.to_string()),
        Body::Bytes(_) => NOT_JSON.to_string(),
    }
}

/// The pre-dispatch record.
pub fn request_record(
    method: HttpMethod,
    route: &str,
    headers: &Headers,
    query: Option<&QueryParams>,
    options: Option<&TransportOptions>,
    body: Option<&Body>,
) -> String {
    let mut record = format!("Request: {method} {route}");
    record.push_str("\nHeaders: ");
    record.push_str(&to_text(headers));

    if let Some(query) = query {
        record.push_str("\nParams: ");
        record.push_str(&to_text(query));
    }
    if let Some(options) = options.filter(|o| !o.is_empty()) {
        record.push_str("\nAdditional Configuration: ");
        record.push_str(&to_text(options));
    }
    if let Some(body) = body {
        record.push_str("\nData: ");
        record.push_str(&render_body(body));
    }
    record
}

pub fn success_summary(status: u16, status_text: &str) -> String {
    format!("<Success> Status = {status} {status_text}")
}

pub fn status_error_summary(status: u16, status_text: &str, message: &str) -> String {
    format!("<Error> Status = {status} {status_text}, {message}")
}

pub fn transport_failure_summary(message: &str) -> String {
    format!("<Error> Something wrong happened, did not get proper error from server! ({message})")
}

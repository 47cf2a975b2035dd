//! Bearer-token helpers shared by auth flows and test scenarios.

use serde::{Deserialize, Serialize};

/// Body returned by the service's token endpoints. Success and failure paths
/// fill different subsets, so every field is optional.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AuthResponseBody {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<serde_json::Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub access_token: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub token_type: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub refresh_token: Option<String>,
    /// Seconds.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub expires_in: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub scope: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub jti: Option<String>,
}

/// Current bearer token for a sequence of calls.
///
/// Owned by the test context. The dispatcher only reads a token from a
/// `RequestSpec`; see `RequestSpec::with_session`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AuthSession {
    token: Option<String>,
}

impl AuthSession {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn token(&self) -> Option<&str> {
        self.token.as_deref()
    }

    pub fn set_token(&mut self, token: impl Into<String>) {
        self.token = Some(token.into());
    }

    pub fn clear(&mut self) {
        self.token = None;
    }

    pub fn is_authenticated(&self) -> bool {
        self.token.is_some()
    }

    /// Keep the access token from a login response. Returns whether one was
    /// present; a response without one leaves the session unchanged.
    pub fn absorb(&mut self, response: &AuthResponseBody) -> bool {
        match &response.access_token {
            Some(token) => {
                self.token = Some(token.clone());
                true
            }
            None => false,
        }
    }
}

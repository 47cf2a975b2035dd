use std::{
    collections::{BTreeMap, HashSet},
    sync::Arc,
};

use axum::{
    extract::{RawQuery, State},
    http::{header, HeaderMap, Method, StatusCode},
    routing::{any, delete, get, post},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use serde_json::json;
use tokio::{net::TcpListener, sync::RwLock};
use uuid::Uuid;

pub const USERNAME: &str = "admin";
pub const PASSWORD: &str = "1q2w3e";
pub const BAD_CREDENTIALS: &str = "You do not have enough permissions. Bad credentials";

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Credentials {
    pub username: String,
    pub password: String,
}

/// Token endpoint response. Failures carry only `message`.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct TokenGrant {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub access_token: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub token_type: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub refresh_token: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub expires_in: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub scope: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub jti: Option<String>,
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct User {
    pub id: u32,
    pub username: String,
}

/// What `/echo` saw.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Echo {
    pub method: String,
    pub headers: BTreeMap<String, String>,
    pub query: Option<String>,
    pub body: String,
}

pub type Tokens = Arc<RwLock<HashSet<String>>>;

pub fn app() -> Router {
    let tokens: Tokens = Arc::new(RwLock::new(HashSet::new()));
    Router::new()
        .route("/login", post(login))
        .route("/users/me", get(current_user))
        .route("/secure", delete(secure))
        .route("/echo", any(echo))
        .with_state(tokens)
}

pub async fn run(listener: TcpListener) -> Result<(), std::io::Error> {
    axum::serve(listener, app()).await
}

async fn login(
    State(tokens): State<Tokens>,
    Json(input): Json<Credentials>,
) -> (StatusCode, Json<TokenGrant>) {
    if input.username != USERNAME || input.password != PASSWORD {
        tracing::debug!(username = %input.username, "rejected login");
        let grant = TokenGrant {
            message: Some(BAD_CREDENTIALS.to_string()),
            ..TokenGrant::default()
        };
        return (StatusCode::UNAUTHORIZED, Json(grant));
    }

    let token = Uuid::new_v4().to_string();
    tokens.write().await.insert(token.clone());
    let grant = TokenGrant {
        access_token: Some(token),
        token_type: Some("bearer".to_string()),
        refresh_token: Some(Uuid::new_v4().to_string()),
        expires_in: Some(3600),
        scope: Some("read write".to_string()),
        jti: Some(Uuid::new_v4().to_string()),
        ..TokenGrant::default()
    };
    (StatusCode::OK, Json(grant))
}

fn bearer(headers: &HeaderMap) -> Option<&str> {
    headers
        .get(header::AUTHORIZATION)?
        .to_str()
        .ok()?
        .strip_prefix("Bearer ")
}

async fn current_user(
    State(tokens): State<Tokens>,
    headers: HeaderMap,
) -> Result<Json<User>, (StatusCode, Json<serde_json::Value>)> {
    let tokens = tokens.read().await;
    match bearer(&headers) {
        Some(token) if tokens.contains(token) => Ok(Json(User {
            id: 1,
            username: USERNAME.to_string(),
        })),
        _ => Err((
            StatusCode::UNAUTHORIZED,
            Json(json!({"message": "Full authentication is required"})),
        )),
    }
}

async fn secure() -> (StatusCode, Json<serde_json::Value>) {
    (StatusCode::FORBIDDEN, Json(json!({"message": "Access is denied"})))
}

async fn echo(method: Method, headers: HeaderMap, RawQuery(query): RawQuery, body: String) -> Json<Echo> {
    let headers = headers
        .iter()
        .map(|(name, value)| {
            (
                name.as_str().to_string(),
                value.to_str().unwrap_or_default().to_string(),
            )
        })
        .collect();
    Json(Echo {
        method: method.to_string(),
        headers,
        query,
        body,
    })
}

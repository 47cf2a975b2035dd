use axum::http::{self, Request, StatusCode};
use http_body_util::BodyExt;
use mock_server::{app, Echo, TokenGrant, User, BAD_CREDENTIALS, PASSWORD, USERNAME};
use tower::ServiceExt;

async fn body_json<T: serde::de::DeserializeOwned>(response: axum::response::Response) -> T {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    serde_json::from_slice(&bytes).unwrap()
}

async fn body_bytes(response: axum::response::Response) -> bytes::Bytes {
    response.into_body().collect().await.unwrap().to_bytes()
}

fn json_request(method: &str, uri: &str, body: &str) -> Request<String> {
    Request::builder()
        .method(method)
        .uri(uri)
        .header(http::header::CONTENT_TYPE, "application/json")
        .body(body.to_string())
        .unwrap()
}

fn login_body(username: &str, password: &str) -> String {
    serde_json::json!({"username": username, "password": password}).to_string()
}

// --- login ---

#[tokio::test]
async fn login_with_valid_credentials_grants_token() {
    let resp = app()
        .oneshot(json_request("POST", "/login", &login_body(USERNAME, PASSWORD)))
        .await
        .unwrap();

    assert_eq!(resp.status(), StatusCode::OK);
    let grant: TokenGrant = body_json(resp).await;
    assert!(grant.access_token.is_some());
    assert_eq!(grant.token_type.as_deref(), Some("bearer"));
    assert_eq!(grant.expires_in, Some(3600));
    assert!(grant.message.is_none());
}

#[tokio::test]
async fn login_with_bad_credentials_returns_401_and_message() {
    let resp = app()
        .oneshot(json_request("POST", "/login", &login_body("someone", "wrong")))
        .await
        .unwrap();

    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
    let grant: TokenGrant = body_json(resp).await;
    assert_eq!(grant.message.as_deref(), Some(BAD_CREDENTIALS));
    assert!(grant.access_token.is_none());
}

#[tokio::test]
async fn login_malformed_json_returns_422() {
    let resp = app()
        .oneshot(json_request("POST", "/login", r#"{"username":1}"#))
        .await
        .unwrap();

    assert_eq!(resp.status(), StatusCode::UNPROCESSABLE_ENTITY);
}

// --- users ---

#[tokio::test]
async fn current_user_without_token_returns_401() {
    let resp = app()
        .oneshot(Request::builder().uri("/users/me").body(String::new()).unwrap())
        .await
        .unwrap();

    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn current_user_with_unknown_token_returns_401() {
    let resp = app()
        .oneshot(
            Request::builder()
                .uri("/users/me")
                .header(http::header::AUTHORIZATION, "Bearer made-up")
                .body(String::new())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
}

// --- secure ---

#[tokio::test]
async fn secure_delete_is_forbidden() {
    let resp = app()
        .oneshot(
            Request::builder()
                .method("DELETE")
                .uri("/secure")
                .body(String::new())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(resp.status(), StatusCode::FORBIDDEN);
    assert!(!body_bytes(resp).await.is_empty());
}

// --- echo ---

#[tokio::test]
async fn echo_reflects_request() {
    let resp = app()
        .oneshot(
            Request::builder()
                .method("PATCH")
                .uri("/echo?tag=a&tag=b")
                .header("x-trace", "42")
                .body("raw".to_string())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(resp.status(), StatusCode::OK);
    let echo: Echo = body_json(resp).await;
    assert_eq!(echo.method, "PATCH");
    assert_eq!(echo.query.as_deref(), Some("tag=a&tag=b"));
    assert_eq!(echo.headers.get("x-trace").map(String::as_str), Some("42"));
    assert_eq!(echo.body, "raw");
}

// --- token lifecycle ---

#[tokio::test]
async fn login_then_fetch_current_user() {
    use tower::Service;

    let mut app = app().into_service();

    let resp = ServiceExt::ready(&mut app)
        .await
        .unwrap()
        .call(json_request("POST", "/login", &login_body(USERNAME, PASSWORD)))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
    let grant: TokenGrant = body_json(resp).await;
    let token = grant.access_token.unwrap();

    let resp = ServiceExt::ready(&mut app)
        .await
        .unwrap()
        .call(
            Request::builder()
                .uri("/users/me")
                .header(http::header::AUTHORIZATION, format!("Bearer {token}"))
                .body(String::new())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
    let user: User = body_json(resp).await;
    assert_eq!(
        user,
        User {
            id: 1,
            username: USERNAME.to_string()
        }
    );
}

mod support;

use std::sync::Arc;

use axum::body::{to_bytes, Body};
use axum::http::{header, Request, StatusCode};
use axum::middleware::from_fn_with_state;
use axum::routing::get;
use axum::Router;
use serde_json::{json, Value};
use tower::ServiceExt;

use auth_service::router;
use common_auth::{authenticate, AuthContext, JwtVerifier};
use support::{harness, TEST_SECRET};

async fn post_json(app: &Router, uri: &str, body: Value) -> (StatusCode, Value) {
    let request = Request::builder()
        .method("POST")
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(body.to_string()))
        .unwrap();
    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let value = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
    (status, value)
}

fn credentials(email: &str, password: &str) -> Value {
    json!({"email": email, "password": password})
}

#[tokio::test]
async fn register_returns_bearer_token_for_subject() {
    let app = router(harness(3600).state);

    let (status, body) = post_json(&app, "/auth/register", credentials("a@x.com", "hunter2")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["token_type"], "Bearer");
    assert_eq!(body["expires_in"], 3600);

    let verifier = JwtVerifier::new(TEST_SECRET);
    let subject = verifier
        .extract_subject(body["token"].as_str().unwrap())
        .expect("token verifies");
    assert_eq!(subject, "a@x.com");
}

#[tokio::test]
async fn duplicate_registration_returns_conflict() {
    let app = router(harness(3600).state);

    let (status, _) = post_json(&app, "/auth/register", credentials("a@x.com", "hunter2")).await;
    assert_eq!(status, StatusCode::OK);

    let (status, body) = post_json(&app, "/auth/register", credentials("a@x.com", "hunter2")).await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["code"], "USER_ALREADY_EXISTS");
    assert!(body["message"].as_str().unwrap().contains("a@x.com"));
}

#[tokio::test]
async fn login_failures_share_one_error_shape() {
    let app = router(harness(3600).state);
    post_json(&app, "/auth/register", credentials("a@x.com", "hunter2")).await;

    let (unknown_status, unknown_body) =
        post_json(&app, "/auth/login", credentials("nobody@x.com", "hunter2")).await;
    let (wrong_status, wrong_body) =
        post_json(&app, "/auth/login", credentials("a@x.com", "wrong")).await;

    assert_eq!(unknown_status, StatusCode::UNAUTHORIZED);
    assert_eq!(wrong_status, StatusCode::UNAUTHORIZED);
    // Byte-identical bodies: no account enumeration via error content.
    assert_eq!(unknown_body, wrong_body);
    assert_eq!(unknown_body["code"], "INVALID_CREDENTIALS");
    assert_eq!(unknown_body["message"], "Invalid email or password");
}

#[tokio::test]
async fn malformed_requests_are_rejected_before_any_lookup() {
    let app = router(harness(3600).state);

    for body in [
        credentials("", "pw"),
        credentials("not-an-email", "pw"),
        credentials("a@x.com", ""),
    ] {
        let (status, response) = post_json(&app, "/auth/register", body).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(response["code"], "VALIDATION_FAILED");
    }
}

async fn protected(auth: AuthContext) -> String {
    auth.subject().to_string()
}

fn protected_app() -> Router {
    let verifier = Arc::new(JwtVerifier::new(TEST_SECRET));
    Router::new()
        .route("/protected", get(protected))
        .layer(from_fn_with_state(verifier, authenticate))
}

async fn get_protected(app: &Router, authorization: Option<String>) -> StatusCode {
    let mut builder = Request::builder().uri("/protected");
    if let Some(value) = authorization {
        builder = builder.header(header::AUTHORIZATION, value);
    }
    let response = app
        .clone()
        .oneshot(builder.body(Body::empty()).unwrap())
        .await
        .unwrap();
    response.status()
}

#[tokio::test]
async fn full_exchange_then_resource_access_scenario() {
    let auth_app = router(harness(3600).state);
    let resource_app = protected_app();

    // Register, then log in.
    let (status, _) = post_json(
        &auth_app,
        "/auth/register",
        credentials("a@x.com", "hunter2"),
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    let (status, body) =
        post_json(&auth_app, "/auth/login", credentials("a@x.com", "hunter2")).await;
    assert_eq!(status, StatusCode::OK);
    let token = body["token"].as_str().unwrap().to_string();

    // The login token opens the protected resource.
    let status = get_protected(&resource_app, Some(format!("Bearer {token}"))).await;
    assert_eq!(status, StatusCode::OK);

    // Truncating the token by one character closes it again.
    let truncated = &token[..token.len() - 1];
    let status = get_protected(&resource_app, Some(format!("Bearer {truncated}"))).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    // As does presenting nothing at all.
    let status = get_protected(&resource_app, None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn metrics_endpoint_reports_exchange_outcomes() {
    let harness = harness(3600);
    let app = router(harness.state);

    post_json(&app, "/auth/register", credentials("a@x.com", "hunter2")).await;
    post_json(&app, "/auth/login", credentials("a@x.com", "wrong")).await;

    assert_eq!(harness.metrics.register_total("success", "none"), 1);
    assert_eq!(harness.metrics.login_total("failure", "bad_secret"), 1);

    let response = app
        .clone()
        .oneshot(Request::builder().uri("/metrics").body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let text = String::from_utf8(bytes.to_vec()).unwrap();
    assert!(text.contains("auth_login_attempts_total"));
    assert!(text.contains("auth_register_attempts_total"));
}

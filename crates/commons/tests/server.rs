use std::sync::Arc;

use api_commons::server::MAX_SIGNED_BODY_BYTES;
use api_commons::{HmacSigner, verify_signature};
use axum::{
    Router,
    body::Body,
    http::{Request, StatusCode},
    middleware,
    routing::post,
};
use http_body_util::BodyExt;
use serde_json::json;
use tower::ServiceExt;

const BODY: &str = r#"{"event":"verification.approved","id":"abc123"}"#;

fn test_signer() -> HmacSigner {
    HmacSigner::new("api-key", "api-secret")
}

fn app() -> Router {
    Router::new()
        .route("/webhook", post(|body: String| async move { body }))
        .layer(middleware::from_fn_with_state(
            Arc::new(test_signer()),
            verify_signature,
        ))
}

fn webhook(authorization: Option<&str>, body: &str) -> Request<Body> {
    webhook_bytes(authorization, body.as_bytes().to_vec())
}

fn webhook_bytes(authorization: Option<&str>, body: Vec<u8>) -> Request<Body> {
    let mut builder = Request::builder().method("POST").uri("/webhook");
    if let Some(authorization) = authorization {
        builder = builder.header("authorization", authorization);
    }
    builder.body(Body::from(body)).unwrap()
}

#[tokio::test]
async fn signed_request_reaches_handler_with_body() {
    let header = test_signer().generate_header(BODY).unwrap();

    let response = app().oneshot(webhook(Some(&header), BODY)).await.unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body = response.into_body().collect().await.unwrap().to_bytes();
    assert_eq!(&body[..], BODY.as_bytes());
}

#[tokio::test]
async fn unprefixed_token_is_accepted() {
    let token = test_signer().generate(BODY).unwrap();

    let response = app().oneshot(webhook(Some(&token), BODY)).await.unwrap();

    assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test]
async fn structured_signature_matches_serialized_body() {
    let value = json!({"event": "verification.approved", "id": "abc123"});
    let header = test_signer().generate_header(&value).unwrap();

    let response = app().oneshot(webhook(Some(&header), BODY)).await.unwrap();

    assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test]
async fn tampered_body_returns_401() {
    let header = test_signer().generate_header(BODY).unwrap();
    let tampered = BODY.replace("approved", "rejected");

    let response = app().oneshot(webhook(Some(&header), &tampered)).await.unwrap();

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn foreign_secret_returns_401() {
    let header = HmacSigner::new("api-key", "other-secret")
        .generate_header(BODY)
        .unwrap();

    let response = app().oneshot(webhook(Some(&header), BODY)).await.unwrap();

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn missing_header_returns_400() {
    let response = app().oneshot(webhook(None, BODY)).await.unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn non_utf8_body_returns_400() {
    // Lossy decoding would turn the 0xff byte into U+FFFD and match this token.
    let header = test_signer().generate_header("amount=1\u{FFFD}").unwrap();

    let response = app()
        .oneshot(webhook_bytes(Some(&header), b"amount=1\xff".to_vec()))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn oversized_body_returns_400() {
    let body = "a".repeat(MAX_SIGNED_BODY_BYTES + 1);
    let header = test_signer().generate_header(body.as_str()).unwrap();

    let response = app().oneshot(webhook(Some(&header), &body)).await.unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn body_at_limit_is_accepted() {
    let body = "a".repeat(MAX_SIGNED_BODY_BYTES);
    let header = test_signer().generate_header(body.as_str()).unwrap();

    let response = app().oneshot(webhook(Some(&header), &body)).await.unwrap();

    assert_eq!(response.status(), StatusCode::OK);
}

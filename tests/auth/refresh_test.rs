use axum::http::{header, HeaderValue, StatusCode};
use serde_json::json;

use crate::common::{refresh_cookie_header, refresh_cookie_value, test_email, test_password, TestContext};

async fn register_user(ctx: &TestContext) -> (String, String) {
    let email = test_email();

    let response = ctx
        .server
        .post("/v1/register")
        .json(&json!({
            "fullName": "Jane Doe",
            "email": &email,
            "password": test_password(),
            "confirmPassword": test_password()
        }))
        .await;

    let cookie = refresh_cookie_value(&response).expect("refresh cookie should be set");
    (email, cookie)
}

fn cookie_header(token: &str) -> HeaderValue {
    HeaderValue::from_str(&refresh_cookie_header(token)).unwrap()
}

#[tokio::test]
async fn refresh_without_cookie_returns_unauthorized() {
    let ctx = TestContext::new().await;

    let response = ctx.server.post("/v1/refresh").await;

    response.assert_status(StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn refresh_with_valid_cookie_rotates_the_token() {
    let ctx = TestContext::new().await;
    let (email, cookie) = register_user(&ctx).await;

    let response = ctx
        .server
        .post("/v1/refresh")
        .add_header(header::COOKIE, cookie_header(&cookie))
        .await;

    response.assert_status(StatusCode::OK);

    let body: serde_json::Value = response.json();
    assert!(!body["data"]["accessToken"].as_str().unwrap().is_empty());

    let rotated = refresh_cookie_value(&response).expect("rotated cookie should be set");
    assert_ne!(rotated, cookie);

    ctx.cleanup_user(&email).await;
}

#[tokio::test]
async fn refresh_is_exactly_once_per_token() {
    let ctx = TestContext::new().await;
    let (email, cookie) = register_user(&ctx).await;

    let first = ctx
        .server
        .post("/v1/refresh")
        .add_header(header::COOKIE, cookie_header(&cookie))
        .await;
    first.assert_status(StatusCode::OK);

    // Replaying the consumed cookie must fail: rotation replaced the hash.
    let replay = ctx
        .server
        .post("/v1/refresh")
        .add_header(header::COOKIE, cookie_header(&cookie))
        .await;
    replay.assert_status(StatusCode::UNAUTHORIZED);

    // The rotated value keeps working.
    let rotated = refresh_cookie_value(&first).unwrap();
    let next = ctx
        .server
        .post("/v1/refresh")
        .add_header(header::COOKIE, cookie_header(&rotated))
        .await;
    next.assert_status(StatusCode::OK);

    ctx.cleanup_user(&email).await;
}

#[tokio::test]
async fn refresh_with_unknown_token_returns_unauthorized() {
    let ctx = TestContext::new().await;

    let response = ctx
        .server
        .post("/v1/refresh")
        .add_header(header::COOKIE, cookie_header("deadbeef"))
        .await;

    response.assert_status(StatusCode::UNAUTHORIZED);
}

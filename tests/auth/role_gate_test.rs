use axum::http::{header, HeaderValue, StatusCode};
use serde_json::json;

use crate::common::{test_email, test_password, TestContext};

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

    let body: serde_json::Value = response.json();
    let access_token = body["data"]["accessToken"].as_str().unwrap().to_string();

    (email, access_token)
}

fn bearer(token: &str) -> HeaderValue {
    HeaderValue::from_str(&format!("Bearer {token}")).unwrap()
}

#[tokio::test]
async fn me_requires_authentication() {
    let ctx = TestContext::new().await;

    ctx.server
        .get("/v1/me")
        .await
        .assert_status(StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn me_returns_the_authenticated_profile() {
    let ctx = TestContext::new().await;
    let (email, access_token) = register_user(&ctx).await;

    let response = ctx
        .server
        .get("/v1/me")
        .add_header(header::AUTHORIZATION, bearer(&access_token))
        .await;

    response.assert_status(StatusCode::OK);

    let body: serde_json::Value = response.json();
    assert_eq!(body["data"]["email"], email.as_str());
    assert_eq!(body["data"]["role"], "student");

    ctx.cleanup_user(&email).await;
}

#[tokio::test]
async fn invalid_bearer_token_returns_unauthorized() {
    let ctx = TestContext::new().await;

    let response = ctx
        .server
        .get("/v1/me")
        .add_header(header::AUTHORIZATION, bearer("not-a-real-token"))
        .await;

    response.assert_status(StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn roles_route_is_forbidden_for_students() {
    let ctx = TestContext::new().await;
    let (email, access_token) = register_user(&ctx).await;

    let response = ctx
        .server
        .get("/v1/roles")
        .add_header(header::AUTHORIZATION, bearer(&access_token))
        .await;

    response.assert_status(StatusCode::FORBIDDEN);

    let body: serde_json::Value = response.json();
    assert_eq!(body["success"], false);

    ctx.cleanup_user(&email).await;
}

#[tokio::test]
async fn roles_route_allows_admins() {
    let ctx = TestContext::new().await;
    let (email, _) = register_user(&ctx).await;

    // Promote, then log in again so the session reflects the new role.
    ctx.set_role(&email, "admin").await;
    let login = ctx
        .server
        .post("/v1/login")
        .json(&json!({ "email": &email, "password": test_password() }))
        .await;
    let body: serde_json::Value = login.json();
    let admin_token = body["data"]["accessToken"].as_str().unwrap().to_string();

    let response = ctx
        .server
        .get("/v1/roles")
        .add_header(header::AUTHORIZATION, bearer(&admin_token))
        .await;

    response.assert_status(StatusCode::OK);

    let body: serde_json::Value = response.json();
    let roles = body["data"]["roles"].as_array().unwrap();
    assert!(roles.iter().any(|r| r == "admin"));
    assert!(roles.iter().any(|r| r == "student"));

    ctx.cleanup_user(&email).await;
}

#[tokio::test]
async fn roles_route_requires_authentication() {
    let ctx = TestContext::new().await;

    ctx.server
        .get("/v1/roles")
        .await
        .assert_status(StatusCode::UNAUTHORIZED);
}

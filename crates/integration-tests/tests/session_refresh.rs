//! Token refresh protocol and credential lifecycle.

use jhytermax_core::Role;
use jhytermax_integration_tests::{TestContext, order_body, profile_body};
use jhytermax_storefront::ApiError;
use jhytermax_storefront::http::ApiRequest;
use jhytermax_storefront::session::{ACCESS_KEY, CredentialStore, SessionState};
use reqwest::StatusCode;
use secrecy::SecretString;
use serde_json::json;
use wiremock::matchers::{body_json, header, method, path};
use wiremock::{Mock, ResponseTemplate};

// ============================================================================
// AuthorizedRequest
// ============================================================================

#[tokio::test]
async fn test_authorized_request_refreshes_once_then_replays() {
    let ctx = TestContext::new().await;
    ctx.with_credentials("stale", "r1");

    Mock::given(method("GET"))
        .and(path("/api/orders/orders/"))
        .and(header("authorization", "Bearer stale"))
        .respond_with(ResponseTemplate::new(401).set_body_json(json!({"detail": "expired"})))
        .expect(1)
        .mount(&ctx.server)
        .await;
    Mock::given(method("POST"))
        .and(path("/api/auth/refresh/"))
        .and(body_json(json!({"refresh": "r1"})))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(json!({"access": "fresh", "refresh": "r2"})),
        )
        .expect(1)
        .mount(&ctx.server)
        .await;
    Mock::given(method("GET"))
        .and(path("/api/orders/orders/"))
        .and(header("authorization", "Bearer fresh"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
        .expect(1)
        .mount(&ctx.server)
        .await;

    let response = ctx
        .session
        .authorized_request(&ApiRequest::get("/api/orders/orders/"))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(
        ctx.stored_tokens(),
        Some(("fresh".to_string(), "r2".to_string()))
    );
}

#[tokio::test]
async fn test_authorized_request_keeps_refresh_token_when_not_rotated() {
    let ctx = TestContext::new().await;
    ctx.with_credentials("stale", "r1");

    Mock::given(method("GET"))
        .and(path("/api/payments/payments/"))
        .and(header("authorization", "Bearer stale"))
        .respond_with(ResponseTemplate::new(401))
        .mount(&ctx.server)
        .await;
    Mock::given(method("POST"))
        .and(path("/api/auth/refresh/"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"access": "fresh"})))
        .expect(1)
        .mount(&ctx.server)
        .await;
    Mock::given(method("GET"))
        .and(path("/api/payments/payments/"))
        .and(header("authorization", "Bearer fresh"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
        .mount(&ctx.server)
        .await;

    let payments = ctx.api.list_payments().await.unwrap();

    assert!(payments.is_empty());
    assert_eq!(
        ctx.stored_tokens(),
        Some(("fresh".to_string(), "r1".to_string()))
    );
}

#[tokio::test]
async fn test_failed_refresh_clears_credentials_and_returns_original_401() {
    let ctx = TestContext::new().await;
    ctx.with_credentials("stale", "dead");

    Mock::given(method("GET"))
        .and(path("/api/orders/orders/"))
        .respond_with(
            ResponseTemplate::new(401)
                .set_body_json(json!({"detail": "Given token not valid for any token type"})),
        )
        .expect(1)
        .mount(&ctx.server)
        .await;
    Mock::given(method("POST"))
        .and(path("/api/auth/refresh/"))
        .respond_with(
            ResponseTemplate::new(401)
                .set_body_json(json!({"detail": "Token is invalid or expired"})),
        )
        .expect(1)
        .mount(&ctx.server)
        .await;

    let response = ctx
        .session
        .authorized_request(&ApiRequest::get("/api/orders/orders/"))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    let body: serde_json::Value = response.json().await.unwrap();
    assert_eq!(body["detail"], "Given token not valid for any token type");
    assert!(ctx.stored_tokens().is_none());
    assert_eq!(ctx.session.state().unwrap(), SessionState::Anonymous);
}

#[tokio::test]
async fn test_malformed_refresh_response_clears_credentials() {
    let ctx = TestContext::new().await;
    ctx.with_credentials("stale", "r1");

    Mock::given(method("GET"))
        .and(path("/api/orders/orders/"))
        .respond_with(ResponseTemplate::new(401))
        .expect(1)
        .mount(&ctx.server)
        .await;
    Mock::given(method("POST"))
        .and(path("/api/auth/refresh/"))
        .respond_with(ResponseTemplate::new(200).set_body_string("<html>gateway</html>"))
        .expect(1)
        .mount(&ctx.server)
        .await;

    let response = ctx
        .session
        .authorized_request(&ApiRequest::get("/api/orders/orders/"))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    assert!(ctx.stored_tokens().is_none());
    assert_eq!(ctx.session.state().unwrap(), SessionState::Anonymous);
}

#[tokio::test]
async fn test_second_401_after_refresh_is_returned_without_another_refresh() {
    let ctx = TestContext::new().await;
    ctx.with_credentials("stale", "r1");

    Mock::given(method("GET"))
        .and(path("/api/orders/orders/7/"))
        .respond_with(ResponseTemplate::new(401))
        .expect(2)
        .mount(&ctx.server)
        .await;
    Mock::given(method("POST"))
        .and(path("/api/auth/refresh/"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(json!({"access": "fresh", "refresh": "r2"})),
        )
        .expect(1)
        .mount(&ctx.server)
        .await;

    let response = ctx
        .session
        .authorized_request(&ApiRequest::get("/api/orders/orders/7/"))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    assert_eq!(
        ctx.stored_tokens(),
        Some(("fresh".to_string(), "r2".to_string()))
    );
}

#[tokio::test]
async fn test_anonymous_401_does_not_refresh() {
    let ctx = TestContext::new().await;

    Mock::given(method("GET"))
        .and(path("/api/orders/orders/"))
        .respond_with(ResponseTemplate::new(401))
        .expect(1)
        .mount(&ctx.server)
        .await;
    Mock::given(method("POST"))
        .and(path("/api/auth/refresh/"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&ctx.server)
        .await;

    let err = ctx.api.list_orders().await.unwrap_err();
    assert!(
        matches!(err, ApiError::RequestFailed { status, .. } if status == StatusCode::UNAUTHORIZED)
    );
    assert!(err.requires_login());
}

#[tokio::test]
async fn test_partial_pair_is_treated_as_absent() {
    let ctx = TestContext::new().await;
    ctx.store.set_all(&[(ACCESS_KEY, "orphan")]).unwrap();

    assert!(ctx.session.load_credentials().unwrap().is_none());
    let err = ctx.session.ensure_profile().await.unwrap_err();
    assert!(matches!(err, ApiError::NotAuthenticated));
}

// ============================================================================
// EnsureProfile
// ============================================================================

#[tokio::test]
async fn test_ensure_profile_with_valid_token_does_not_refresh() {
    let ctx = TestContext::new().await;
    ctx.with_credentials("good", "r1");

    Mock::given(method("GET"))
        .and(path("/api/auth/me/"))
        .and(header("authorization", "Bearer good"))
        .respond_with(ResponseTemplate::new(200).set_body_json(profile_body(3, "ada", "buyer")))
        .expect(1)
        .mount(&ctx.server)
        .await;
    Mock::given(method("POST"))
        .and(path("/api/auth/refresh/"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&ctx.server)
        .await;

    let profile = ctx.session.ensure_profile().await.unwrap();
    assert_eq!(profile.username, "ada");
    assert_eq!(profile.role, Role::Buyer);
    assert!(!profile.is_admin());
}

#[tokio::test]
async fn test_ensure_profile_with_expired_token_refreshes_once() {
    let ctx = TestContext::new().await;
    ctx.with_credentials("stale", "r1");

    Mock::given(method("GET"))
        .and(path("/api/auth/me/"))
        .and(header("authorization", "Bearer stale"))
        .respond_with(ResponseTemplate::new(401))
        .expect(1)
        .mount(&ctx.server)
        .await;
    Mock::given(method("POST"))
        .and(path("/api/auth/refresh/"))
        .and(body_json(json!({"refresh": "r1"})))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(json!({"access": "fresh", "refresh": "r2"})),
        )
        .expect(1)
        .mount(&ctx.server)
        .await;
    Mock::given(method("GET"))
        .and(path("/api/auth/me/"))
        .and(header("authorization", "Bearer fresh"))
        .respond_with(ResponseTemplate::new(200).set_body_json(profile_body(1, "root", "admin")))
        .expect(1)
        .mount(&ctx.server)
        .await;

    let profile = ctx.session.ensure_profile().await.unwrap();
    assert!(profile.is_admin());
    assert_eq!(
        ctx.stored_tokens(),
        Some(("fresh".to_string(), "r2".to_string()))
    );
}

#[tokio::test]
async fn test_ensure_profile_failed_refresh_propagates_original_error() {
    let ctx = TestContext::new().await;
    ctx.with_credentials("stale", "dead");

    Mock::given(method("GET"))
        .and(path("/api/auth/me/"))
        .respond_with(ResponseTemplate::new(401))
        .expect(1)
        .mount(&ctx.server)
        .await;
    Mock::given(method("POST"))
        .and(path("/api/auth/refresh/"))
        .respond_with(
            ResponseTemplate::new(401)
                .set_body_json(json!({"detail": "Token is invalid or expired"})),
        )
        .expect(1)
        .mount(&ctx.server)
        .await;

    let err = ctx.session.ensure_profile().await.unwrap_err();
    assert!(matches!(&err, ApiError::Auth(message) if message == "Failed to load profile"));
    assert!(ctx.stored_tokens().is_none());
}

#[tokio::test]
async fn test_ensure_profile_server_error_refreshes_once() {
    let ctx = TestContext::new().await;
    ctx.with_credentials("good", "r1");

    Mock::given(method("GET"))
        .and(path("/api/auth/me/"))
        .and(header("authorization", "Bearer good"))
        .respond_with(ResponseTemplate::new(500).set_body_string("upstream down"))
        .expect(1)
        .mount(&ctx.server)
        .await;
    Mock::given(method("POST"))
        .and(path("/api/auth/refresh/"))
        .and(body_json(json!({"refresh": "r1"})))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(json!({"access": "fresh", "refresh": "r2"})),
        )
        .expect(1)
        .mount(&ctx.server)
        .await;
    Mock::given(method("GET"))
        .and(path("/api/auth/me/"))
        .and(header("authorization", "Bearer fresh"))
        .respond_with(ResponseTemplate::new(200).set_body_json(profile_body(3, "ada", "buyer")))
        .expect(1)
        .mount(&ctx.server)
        .await;

    let profile = ctx.session.ensure_profile().await.unwrap();
    assert_eq!(profile.username, "ada");
    assert_eq!(
        ctx.stored_tokens(),
        Some(("fresh".to_string(), "r2".to_string()))
    );
}

#[tokio::test]
async fn test_ensure_profile_malformed_refresh_clears_credentials() {
    let ctx = TestContext::new().await;
    ctx.with_credentials("good", "r1");

    Mock::given(method("GET"))
        .and(path("/api/auth/me/"))
        .respond_with(ResponseTemplate::new(500).set_body_string("upstream down"))
        .expect(1)
        .mount(&ctx.server)
        .await;
    Mock::given(method("POST"))
        .and(path("/api/auth/refresh/"))
        .respond_with(ResponseTemplate::new(200).set_body_string("<html>gateway</html>"))
        .expect(1)
        .mount(&ctx.server)
        .await;

    let err = ctx.session.ensure_profile().await.unwrap_err();
    assert!(
        matches!(err, ApiError::RequestFailed { status, .. } if status == StatusCode::INTERNAL_SERVER_ERROR)
    );
    assert!(ctx.stored_tokens().is_none());
    assert_eq!(ctx.session.state().unwrap(), SessionState::Anonymous);
}

// ============================================================================
// Login / Register
// ============================================================================

#[tokio::test]
async fn test_login_surfaces_server_detail() {
    let ctx = TestContext::new().await;

    Mock::given(method("POST"))
        .and(path("/api/auth/login/"))
        .and(body_json(json!({"username": "ada", "password": "wrong"})))
        .respond_with(ResponseTemplate::new(401).set_body_json(
            json!({"detail": "No active account found with the given credentials"}),
        ))
        .mount(&ctx.server)
        .await;

    let err = ctx
        .session
        .login("ada", &SecretString::from("wrong"))
        .await
        .unwrap_err();
    assert_eq!(
        err.to_string(),
        "No active account found with the given credentials"
    );
}

#[tokio::test]
async fn test_login_non_json_error_uses_fallback() {
    let ctx = TestContext::new().await;

    Mock::given(method("POST"))
        .and(path("/api/auth/login/"))
        .respond_with(ResponseTemplate::new(502).set_body_string("<html>Bad gateway</html>"))
        .mount(&ctx.server)
        .await;

    let err = ctx
        .session
        .login("ada", &SecretString::from("pw"))
        .await
        .unwrap_err();
    assert!(matches!(&err, ApiError::Auth(message) if message == "Request failed"));
}

#[tokio::test]
async fn test_sign_up_registers_then_signs_in() {
    let ctx = TestContext::new().await;

    Mock::given(method("POST"))
        .and(path("/api/auth/register/"))
        .and(body_json(json!({
            "username": "ada",
            "email": "ada@farm.ng",
            "password": "pw",
            "role": "buyer",
        })))
        .respond_with(
            ResponseTemplate::new(201)
                .set_body_json(json!({"id": 3, "username": "ada", "email": "ada@farm.ng"})),
        )
        .expect(1)
        .mount(&ctx.server)
        .await;
    Mock::given(method("POST"))
        .and(path("/api/auth/login/"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(json!({"access": "a1", "refresh": "r1"})),
        )
        .expect(1)
        .mount(&ctx.server)
        .await;

    let registration = jhytermax_storefront::session::Registration {
        username: "ada".into(),
        email: jhytermax_core::Email::parse("ada@farm.ng").unwrap(),
        password: SecretString::from("pw"),
        role: Role::Buyer,
    };
    let user = ctx.session.sign_up(&registration).await.unwrap();

    assert_eq!(user.username.as_deref(), Some("ada"));
    assert_eq!(ctx.session.state().unwrap(), SessionState::Authenticated);
    assert_eq!(ctx.stored_tokens(), Some(("a1".to_string(), "r1".to_string())));
}

#[tokio::test]
async fn test_register_duplicate_reports_field_errors() {
    let ctx = TestContext::new().await;

    Mock::given(method("POST"))
        .and(path("/api/auth/register/"))
        .respond_with(ResponseTemplate::new(400).set_body_json(
            json!({"username": ["A user with that username already exists."]}),
        ))
        .mount(&ctx.server)
        .await;

    let registration = jhytermax_storefront::session::Registration {
        username: "ada".into(),
        email: jhytermax_core::Email::parse("ada@farm.ng").unwrap(),
        password: SecretString::from("pw"),
        role: Role::Buyer,
    };
    let err = ctx.session.register(&registration).await.unwrap_err();
    assert_eq!(
        err.to_string(),
        r#"{"username":["A user with that username already exists."]}"#
    );
    assert_eq!(ctx.session.state().unwrap(), SessionState::Anonymous);
}

#[tokio::test]
async fn test_authorized_request_sends_bearer_on_mutation() {
    let ctx = TestContext::new().await;
    ctx.with_credentials("good", "r1");

    Mock::given(method("PATCH"))
        .and(path("/api/orders/orders/12/update_status/"))
        .and(header("authorization", "Bearer good"))
        .and(body_json(json!({"status": "shipped"})))
        .respond_with(ResponseTemplate::new(200).set_body_json(order_body(12, "shipped", "29700.00")))
        .expect(1)
        .mount(&ctx.server)
        .await;

    let order = ctx
        .api
        .update_order_status(
            jhytermax_core::OrderId::new(12),
            jhytermax_core::OrderStatus::Shipped,
        )
        .await
        .unwrap();
    assert_eq!(order.status, jhytermax_core::OrderStatus::Shipped);
}

//! Endpoint decoding, error messages and reference-data caching.

use jhytermax_core::{PaymentStatus, ProductId, StateId};
use jhytermax_integration_tests::{TestContext, location_body, product_body};
use jhytermax_storefront::ApiError;
use jhytermax_storefront::api::{ImageUpload, ProductDraft};
use reqwest::StatusCode;
use rust_decimal::Decimal;
use serde_json::json;
use wiremock::matchers::{body_json, header, method, path, query_param};
use wiremock::{Mock, ResponseTemplate};

fn payment_body(status: &str) -> serde_json::Value {
    json!({
        "id": 40,
        "order": 12,
        "order_id": "JM-0012",
        "user": 3,
        "user_username": "ada",
        "amount": "29700.00",
        "currency": "NGN",
        "status": status,
        "payment_method": "card",
        "tx_ref": "JM-12-abc",
        "flw_ref": null,
        "transaction_id": null,
        "customer_email": "ada@farm.ng",
        "customer_name": "ada",
        "customer_phone": "",
        "metadata": {},
        "failure_reason": null,
        "created_at": "2025-03-01T09:30:00Z",
        "updated_at": "2025-03-01T09:31:00Z",
        "paid_at": null,
    })
}

// ============================================================================
// Lists
// ============================================================================

#[tokio::test]
async fn test_list_products_decodes_catalog() {
    let ctx = TestContext::new().await;

    Mock::given(method("GET"))
        .and(path("/api/products/"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            product_body(7, "Baby Spinach", "9200.00", 14),
            product_body(9, "Red Onions", "9800", 3),
        ])))
        .mount(&ctx.server)
        .await;

    let products = ctx.api.list_products().await.unwrap();

    assert_eq!(products.len(), 2);
    let onions = products.iter().find(|p| p.id == ProductId::new(9)).unwrap();
    assert_eq!(onions.price, Decimal::new(9800, 0));
    assert_eq!(onions.quantity, 3);
}

#[tokio::test]
async fn test_list_endpoint_rejects_non_array() {
    let ctx = TestContext::new().await;

    Mock::given(method("GET"))
        .and(path("/api/products/"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(json!({"count": 0, "results": []})),
        )
        .mount(&ctx.server)
        .await;

    let err = ctx.api.list_products().await.unwrap_err();
    assert!(matches!(&err, ApiError::UnexpectedPayload(endpoint) if endpoint == "products"));
}

#[tokio::test]
async fn test_list_products_does_not_send_credentials() {
    let ctx = TestContext::new().await;
    ctx.with_credentials("good", "r1");

    Mock::given(method("GET"))
        .and(path("/api/products/"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
        .mount(&ctx.server)
        .await;

    ctx.api.list_products().await.unwrap();

    let requests = ctx.server.received_requests().await.unwrap();
    assert_eq!(requests.len(), 1);
    assert!(!requests.iter().any(|r| r.headers.contains_key("authorization")));
}

// ============================================================================
// Error messages
// ============================================================================

#[tokio::test]
async fn test_request_failed_carries_server_detail() {
    let ctx = TestContext::new().await;

    Mock::given(method("GET"))
        .and(path("/api/products/404/"))
        .respond_with(ResponseTemplate::new(404).set_body_json(json!({"detail": "Not found."})))
        .mount(&ctx.server)
        .await;

    let err = ctx.api.get_product(ProductId::new(404)).await.unwrap_err();
    assert!(matches!(
        &err,
        ApiError::RequestFailed { status, message }
            if *status == StatusCode::NOT_FOUND && message == "Not found."
    ));
    assert_eq!(err.to_string(), "Not found. (HTTP 404)");
}

#[tokio::test]
async fn test_request_failed_empty_body_uses_fallback() {
    let ctx = TestContext::new().await;
    ctx.with_credentials("good", "r1");

    Mock::given(method("DELETE"))
        .and(path("/api/products/7/"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&ctx.server)
        .await;

    let err = ctx.api.delete_product(ProductId::new(7)).await.unwrap_err();
    assert!(matches!(
        &err,
        ApiError::RequestFailed { message, .. } if message == "Failed to delete product"
    ));
}

// ============================================================================
// Products
// ============================================================================

#[tokio::test]
async fn test_create_product_multipart_is_replayed_after_refresh() {
    let ctx = TestContext::new().await;
    ctx.with_credentials("stale", "r1");

    Mock::given(method("POST"))
        .and(path("/api/products/"))
        .and(header("authorization", "Bearer stale"))
        .respond_with(ResponseTemplate::new(401))
        .expect(1)
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
    Mock::given(method("POST"))
        .and(path("/api/products/"))
        .and(header("authorization", "Bearer fresh"))
        .respond_with(
            ResponseTemplate::new(201).set_body_json(product_body(21, "Yam Tubers", "4500.00", 40)),
        )
        .expect(1)
        .mount(&ctx.server)
        .await;

    let draft = ProductDraft {
        name: "Yam Tubers".into(),
        description: None,
        price: Decimal::new(450_000, 2),
        quantity: 40,
        category_id: None,
        image: Some(ImageUpload {
            file_name: "yam.png".into(),
            content_type: Some("image/png".into()),
            bytes: b"\x89PNG-yam".to_vec(),
        }),
    };
    let product = ctx.api.create_product(&draft).await.unwrap();
    assert_eq!(product.id, ProductId::new(21));

    let uploads: Vec<_> = ctx
        .server
        .received_requests()
        .await
        .unwrap()
        .into_iter()
        .filter(|r| r.url.path() == "/api/products/")
        .collect();
    assert_eq!(uploads.len(), 2);
    for upload in &uploads {
        let body = String::from_utf8_lossy(&upload.body);
        assert!(body.contains("Yam Tubers"));
        assert!(body.contains("yam.png"));
        assert!(body.contains("PNG-yam"));
    }
}

// ============================================================================
// Payments
// ============================================================================

#[tokio::test]
async fn test_verify_payment_success() {
    let ctx = TestContext::new().await;
    ctx.with_credentials("good", "r1");

    Mock::given(method("POST"))
        .and(path("/api/payments/payments/verify/"))
        .and(body_json(json!({"tx_ref": "JM-12-abc"})))
        .respond_with(ResponseTemplate::new(200).set_body_json(payment_body("successful")))
        .mount(&ctx.server)
        .await;

    let payment = ctx.api.verify_payment("JM-12-abc").await.unwrap();
    assert_eq!(payment.status, PaymentStatus::Successful);
    assert!(payment.status.is_successful());
}

#[tokio::test]
async fn test_verify_payment_202_is_pending() {
    let ctx = TestContext::new().await;
    ctx.with_credentials("good", "r1");

    Mock::given(method("POST"))
        .and(path("/api/payments/payments/verify/"))
        .respond_with(
            ResponseTemplate::new(202)
                .set_body_json(json!({"message": "Awaiting confirmation from the bank"})),
        )
        .mount(&ctx.server)
        .await;

    let err = ctx.api.verify_payment("JM-12-abc").await.unwrap_err();
    assert!(
        matches!(&err, ApiError::PaymentPending(message) if message == "Awaiting confirmation from the bank")
    );
}

#[tokio::test]
async fn test_verify_payment_202_without_message_uses_fallback() {
    let ctx = TestContext::new().await;
    ctx.with_credentials("good", "r1");

    Mock::given(method("POST"))
        .and(path("/api/payments/payments/verify/"))
        .respond_with(ResponseTemplate::new(202).set_body_json(json!({})))
        .mount(&ctx.server)
        .await;

    let err = ctx.api.verify_payment("JM-12-abc").await.unwrap_err();
    assert_eq!(
        err.to_string(),
        "Transaction not yet available. Please wait a moment and try again."
    );
}

// ============================================================================
// Reference data
// ============================================================================

#[tokio::test]
async fn test_states_are_cached() {
    let ctx = TestContext::new().await;

    Mock::given(method("GET"))
        .and(path("/api/orders/states/"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            {"id": 1, "name": "Lagos", "code": "LA", "is_active": true},
            {"id": 2, "name": "Oyo", "code": "OY", "is_active": true},
        ])))
        .expect(1)
        .mount(&ctx.server)
        .await;

    let first = ctx.api.list_states().await.unwrap();
    let second = ctx.api.list_states().await.unwrap();

    assert_eq!(first.len(), 2);
    assert_eq!(first, second);
}

#[tokio::test]
async fn test_invalidate_reference_data_refetches() {
    let ctx = TestContext::new().await;

    Mock::given(method("GET"))
        .and(path("/api/orders/states/"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
        .expect(2)
        .mount(&ctx.server)
        .await;

    ctx.api.list_states().await.unwrap();
    ctx.api.invalidate_reference_data().await;
    ctx.api.list_states().await.unwrap();
}

#[tokio::test]
async fn test_locations_filter_by_state_and_cache_per_state() {
    let ctx = TestContext::new().await;

    Mock::given(method("GET"))
        .and(path("/api/orders/locations/"))
        .and(query_param("state_id", "1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            location_body(2, "Ikeja", "1500.00"),
            location_body(3, "Lekki", "2500.00"),
        ])))
        .expect(1)
        .mount(&ctx.server)
        .await;

    let lagos = ctx.api.list_locations(Some(StateId::new(1))).await.unwrap();
    let again = ctx.api.list_locations(Some(StateId::new(1))).await.unwrap();

    assert_eq!(lagos.len(), 2);
    assert_eq!(lagos, again);
    let lekki = lagos.iter().find(|l| l.name == "Lekki").unwrap();
    assert_eq!(lekki.delivery_fee, Decimal::new(2500, 0));
}

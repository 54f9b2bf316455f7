//! Integration tests for the Jhytermax client libraries.
//!
//! Every test runs the real session client and API wrapper against a
//! `wiremock` server standing in for the marketplace REST API, so no
//! network access or running backend is needed.
//!
//! # Running Tests
//!
//! ```bash
//! cargo test -p jhytermax-integration-tests
//! ```
//!
//! # Test Categories
//!
//! - `session_refresh` - token refresh protocol and credential lifecycle
//! - `api_client` - endpoint decoding, error messages, caching
//! - `admin_console` - admin gate and dashboard figures
//! - `checkout_flow` - cart to order to payment

use std::sync::Arc;
use std::time::Duration;

use jhytermax_storefront::api::ApiClient;
use jhytermax_storefront::session::{CredentialPair, CredentialStore, MemoryStore, SessionClient};
use secrecy::ExposeSecret;
use serde_json::{Value, json};
use url::Url;
use wiremock::MockServer;

/// A mock API plus clients wired to it with an in-memory credential store.
pub struct TestContext {
    pub server: MockServer,
    pub store: Arc<MemoryStore>,
    pub session: SessionClient,
    pub api: ApiClient,
}

impl TestContext {
    pub async fn new() -> Self {
        let server = MockServer::start().await;
        let store = Arc::new(MemoryStore::new());
        let api_base = Url::parse(&server.uri()).expect("mock server URI is a valid URL");
        let session = SessionClient::with_http_client(
            reqwest::Client::new(),
            api_base,
            Arc::clone(&store) as Arc<dyn CredentialStore>,
        );
        let api = ApiClient::new(session.clone(), Duration::from_secs(60));

        Self {
            server,
            store,
            session,
            api,
        }
    }

    /// Store a credential pair as if a login had happened earlier.
    pub fn with_credentials(&self, access: &str, refresh: &str) {
        self.session
            .store_credentials(&CredentialPair::new(access, refresh))
            .expect("memory store never fails");
    }

    /// The stored pair as plain strings.
    pub fn stored_tokens(&self) -> Option<(String, String)> {
        self.session
            .load_credentials()
            .expect("memory store never fails")
            .map(|pair| {
                (
                    pair.access().expose_secret().to_string(),
                    pair.refresh().expose_secret().to_string(),
                )
            })
    }
}

// ============================================================================
// Response bodies
// ============================================================================

pub fn profile_body(id: i64, username: &str, role: &str) -> Value {
    json!({
        "id": id,
        "username": username,
        "email": format!("{username}@farm.ng"),
        "role": role,
        "is_staff": false,
        "is_superuser": false,
    })
}

pub fn product_body(id: i64, name: &str, price: &str, quantity: u32) -> Value {
    json!({
        "id": id,
        "name": name,
        "description": "",
        "price": price,
        "quantity": quantity,
        "image": null,
        "category": null,
    })
}

pub fn order_body(id: i64, status: &str, total: &str) -> Value {
    json!({
        "id": id,
        "order_id": format!("JM-{id:04}"),
        "buyer": 3,
        "buyer_username": "ada",
        "buyer_email": "ada@farm.ng",
        "status": status,
        "total_amount": total,
        "shipping_address": "",
        "delivery_location": 2,
        "delivery_location_name": "Ikeja",
        "delivery_location_state": "Lagos",
        "delivery_fee": "1500.00",
        "notes": "",
        "items": [],
        "created_at": "2025-03-01T09:30:00Z",
        "updated_at": "2025-03-01T09:30:00Z",
    })
}

pub fn location_body(id: i64, name: &str, fee: &str) -> Value {
    json!({
        "id": id,
        "state": {"id": 1, "name": "Lagos", "code": "LA", "is_active": true},
        "state_id": 1,
        "name": name,
        "delivery_fee": fee,
        "is_active": true,
    })
}

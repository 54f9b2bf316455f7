//! Typed wrapper around the marketplace REST API.
//!
//! Catalog and delivery reference reads are public; everything else goes
//! through [`SessionClient::authorized_request`] and so benefits from the
//! refresh-once recovery. States and locations are cached using `moka`.
//!
//! Endpoints are grouped by domain, one `impl ApiClient` block per file.

mod cache;
mod catalog;
mod orders;
mod payments;
mod types;

use std::sync::Arc;
use std::time::Duration;

use moka::future::Cache;
use reqwest::Response;

use crate::error::Result;
use crate::http::ApiRequest;
use crate::session::SessionClient;

use cache::{CacheKey, CacheValue};

pub use types::{
    Category, ImageUpload, Location, NewOrder, NewOrderItem, Order, OrderItem, Payment,
    PaymentInit, PaymentLink, Product, ProductDraft, ProductPatch, State,
};

/// Most reference-data entries kept at once (one per state filter).
const REFERENCE_CACHE_CAPACITY: u64 = 128;

/// Client for the catalog, order, reference-data and payment endpoints.
///
/// Cheap to clone; clones share the session and the reference cache.
#[derive(Clone)]
pub struct ApiClient {
    inner: Arc<ApiClientInner>,
}

struct ApiClientInner {
    session: SessionClient,
    reference: Cache<CacheKey, CacheValue>,
}

impl ApiClient {
    /// Wrap `session`, caching reference data for `reference_ttl`.
    #[must_use]
    pub fn new(session: SessionClient, reference_ttl: Duration) -> Self {
        let reference = Cache::builder()
            .max_capacity(REFERENCE_CACHE_CAPACITY)
            .time_to_live(reference_ttl)
            .build();

        Self {
            inner: Arc::new(ApiClientInner { session, reference }),
        }
    }

    /// The session this client sends requests through.
    #[must_use]
    pub fn session(&self) -> &SessionClient {
        &self.inner.session
    }

    /// Drop all cached reference data.
    pub async fn invalidate_reference_data(&self) {
        self.inner.reference.invalidate_all();
        self.inner.reference.run_pending_tasks().await;
    }

    async fn authorized(&self, request: &ApiRequest) -> Result<Response> {
        self.inner.session.authorized_request(request).await
    }

    async fn public(&self, request: &ApiRequest) -> Result<Response> {
        self.inner.session.public_request(request).await
    }
}

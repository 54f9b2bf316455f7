//! Process-wide handle wiring configuration, session, API and cart together.

use std::sync::Arc;

use crate::api::ApiClient;
use crate::cart::CartStore;
use crate::config::StorefrontConfig;
use crate::error::Result;
use crate::session::{CredentialStore, SessionClient};

/// Everything a front-end needs, built once at start-up.
///
/// This struct is cheaply cloneable via `Arc`; clones share the session,
/// the reference-data cache and the cart.
#[derive(Clone)]
pub struct AppState {
    inner: Arc<AppStateInner>,
}

struct AppStateInner {
    config: StorefrontConfig,
    api: ApiClient,
    cart: Arc<CartStore>,
}

impl AppState {
    /// Create the state for `config`, persisting credentials into `store`.
    ///
    /// # Errors
    ///
    /// Returns `ApiError::Http` if the HTTP client cannot be built.
    pub fn new(config: StorefrontConfig, store: Arc<dyn CredentialStore>) -> Result<Self> {
        let session = SessionClient::new(&config, store)?;
        let api = ApiClient::new(session, config.reference_cache_ttl);

        Ok(Self {
            inner: Arc::new(AppStateInner {
                config,
                api,
                cart: Arc::new(CartStore::new()),
            }),
        })
    }

    #[must_use]
    pub fn config(&self) -> &StorefrontConfig {
        &self.inner.config
    }

    #[must_use]
    pub fn api(&self) -> &ApiClient {
        &self.inner.api
    }

    #[must_use]
    pub fn session(&self) -> &SessionClient {
        self.inner.api.session()
    }

    /// The cart, for use with [`CartProvider`](crate::cart::CartProvider).
    #[must_use]
    pub fn cart(&self) -> Arc<CartStore> {
        Arc::clone(&self.inner.cart)
    }
}

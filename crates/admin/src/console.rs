//! Admin-gated access to catalog and order management.

use jhytermax_core::{CategoryId, OrderId, OrderStatus, ProductId};
use jhytermax_storefront::api::{
    ApiClient, Category, Order, Product, ProductDraft, ProductPatch,
};
use jhytermax_storefront::dashboard::filter_by_status;
use jhytermax_storefront::session::UserProfile;
use jhytermax_storefront::{ApiError, Result};
use tracing::instrument;

use crate::inventory::InventorySummary;

/// Handle proving the signed-in user is an administrator.
///
/// Only [`connect`](Self::connect) creates one, so holding an
/// `AdminConsole` means the admin check already passed. Every call still
/// goes through the session, so an expired token is refreshed as usual
/// and the server enforces its own permissions.
#[derive(Clone)]
pub struct AdminConsole {
    api: ApiClient,
    profile: UserProfile,
}

impl AdminConsole {
    /// Verify the current session belongs to an administrator.
    ///
    /// # Errors
    ///
    /// Returns `ApiError::NotAuthenticated` or `ApiError::Auth` when there
    /// is no usable session, and `ApiError::Forbidden` when the user is
    /// not an administrator.
    #[instrument(skip(api))]
    pub async fn connect(api: ApiClient) -> Result<Self> {
        let profile = api.session().ensure_profile().await?;
        if !profile.is_admin() {
            tracing::warn!(username = %profile.username, "Admin access denied");
            return Err(ApiError::Forbidden(format!(
                "{} is not an administrator",
                profile.username
            )));
        }
        tracing::debug!(username = %profile.username, "Admin access granted");
        Ok(Self { api, profile })
    }

    #[must_use]
    pub const fn profile(&self) -> &UserProfile {
        &self.profile
    }

    #[must_use]
    pub const fn api(&self) -> &ApiClient {
        &self.api
    }

    // =========================================================================
    // Catalog
    // =========================================================================

    /// # Errors
    ///
    /// Propagates the API error.
    pub async fn products(&self) -> Result<Vec<Product>> {
        self.api.list_products().await
    }

    /// # Errors
    ///
    /// Propagates the API error.
    pub async fn create_product(&self, draft: &ProductDraft) -> Result<Product> {
        self.api.create_product(draft).await
    }

    /// # Errors
    ///
    /// Propagates the API error.
    pub async fn update_product(&self, id: ProductId, patch: &ProductPatch) -> Result<Product> {
        self.api.update_product(id, patch).await
    }

    /// # Errors
    ///
    /// Propagates the API error.
    pub async fn delete_product(&self, id: ProductId) -> Result<()> {
        self.api.delete_product(id).await
    }

    /// Categories as seen by the signed-in admin.
    ///
    /// # Errors
    ///
    /// Propagates the API error.
    pub async fn categories(&self) -> Result<Vec<Category>> {
        self.api.list_categories(true).await
    }

    /// # Errors
    ///
    /// Propagates the API error.
    pub async fn create_category(&self, name: &str) -> Result<Category> {
        self.api.create_category(name).await
    }

    /// # Errors
    ///
    /// Propagates the API error.
    pub async fn rename_category(&self, id: CategoryId, name: &str) -> Result<Category> {
        self.api.update_category(id, name).await
    }

    /// # Errors
    ///
    /// Propagates the API error.
    pub async fn delete_category(&self, id: CategoryId) -> Result<()> {
        self.api.delete_category(id).await
    }

    // =========================================================================
    // Orders
    // =========================================================================

    /// Every order, optionally only those in `status`.
    ///
    /// # Errors
    ///
    /// Propagates the API error.
    #[instrument(skip(self))]
    pub async fn orders(&self, status: Option<OrderStatus>) -> Result<Vec<Order>> {
        let orders = self.api.list_orders().await?;
        Ok(filter_by_status(&orders, status).cloned().collect())
    }

    /// # Errors
    ///
    /// Propagates the API error.
    pub async fn set_order_status(&self, id: OrderId, status: OrderStatus) -> Result<Order> {
        self.api.update_order_status(id, status).await
    }

    // =========================================================================
    // Dashboard
    // =========================================================================

    /// Catalog figures for the dashboard header.
    ///
    /// # Errors
    ///
    /// Propagates the API error of either listing.
    #[instrument(skip(self))]
    pub async fn inventory_summary(&self) -> Result<InventorySummary> {
        let (products, categories) = tokio::try_join!(self.products(), self.categories())?;
        Ok(InventorySummary::from_catalog(&products, &categories))
    }
}

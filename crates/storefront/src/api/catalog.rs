//! Products and categories.

use jhytermax_core::{CategoryId, ProductId};
use tracing::instrument;

use super::ApiClient;
use super::types::{Category, ImageUpload, Product, ProductDraft, ProductPatch};
use crate::error::Result;
use crate::http::{ApiRequest, FormField, ensure_success, read_json, read_list};

const PRODUCTS_PATH: &str = "/api/products/";
const CATEGORIES_PATH: &str = "/api/products/categories/";

fn product_path(id: ProductId) -> String {
    format!("{PRODUCTS_PATH}{id}/")
}

fn category_path(id: CategoryId) -> String {
    format!("{CATEGORIES_PATH}{id}/")
}

impl ApiClient {
    // =========================================================================
    // Products
    // =========================================================================

    /// List the whole catalog.
    ///
    /// # Errors
    ///
    /// Returns `ApiError::UnexpectedPayload` if the endpoint does not answer
    /// with an array, or `ApiError::RequestFailed` on a non-success status.
    #[instrument(skip(self))]
    pub async fn list_products(&self) -> Result<Vec<Product>> {
        let response = self.public(&ApiRequest::get(PRODUCTS_PATH)).await?;
        read_list(response, "products", "Failed to load products").await
    }

    /// Fetch a single product.
    ///
    /// # Errors
    ///
    /// Returns `ApiError::RequestFailed` if the product does not exist.
    #[instrument(skip(self), fields(product_id = %id))]
    pub async fn get_product(&self, id: ProductId) -> Result<Product> {
        let response = self.public(&ApiRequest::get(product_path(id))).await?;
        read_json(response, "Failed to load product").await
    }

    /// Create a product, uploading its image when one is given.
    ///
    /// # Errors
    ///
    /// Returns `ApiError::RequestFailed` with the server's validation text
    /// if the product is refused.
    #[instrument(skip(self, draft), fields(name = %draft.name))]
    pub async fn create_product(&self, draft: &ProductDraft) -> Result<Product> {
        let request = ApiRequest::post(PRODUCTS_PATH).multipart(draft_fields(draft));
        let response = self.authorized(&request).await?;
        let product: Product = read_json(response, "Failed to create product").await?;
        tracing::info!(product_id = %product.id, "Created product");
        Ok(product)
    }

    /// Replace the fields present in `patch`.
    ///
    /// # Errors
    ///
    /// Returns `ApiError::RequestFailed` with the server's validation text
    /// if the update is refused.
    #[instrument(skip(self, patch), fields(product_id = %id))]
    pub async fn update_product(&self, id: ProductId, patch: &ProductPatch) -> Result<Product> {
        let request = ApiRequest::put(product_path(id)).multipart(patch_fields(patch));
        let response = self.authorized(&request).await?;
        read_json(response, "Failed to update product").await
    }

    /// Delete a product.
    ///
    /// # Errors
    ///
    /// Returns `ApiError::RequestFailed` if the product cannot be deleted.
    #[instrument(skip(self), fields(product_id = %id))]
    pub async fn delete_product(&self, id: ProductId) -> Result<()> {
        let response = self.authorized(&ApiRequest::delete(product_path(id))).await?;
        ensure_success(response, "Failed to delete product").await?;
        tracing::info!("Deleted product");
        Ok(())
    }

    // =========================================================================
    // Categories
    // =========================================================================

    /// List categories, optionally as the signed-in user (admin views see
    /// the same list but the request is then attributed to the session).
    ///
    /// # Errors
    ///
    /// Returns `ApiError::UnexpectedPayload` if the endpoint does not answer
    /// with an array, or `ApiError::RequestFailed` on a non-success status.
    #[instrument(skip(self))]
    pub async fn list_categories(&self, authenticated: bool) -> Result<Vec<Category>> {
        let request = ApiRequest::get(CATEGORIES_PATH);
        let response = if authenticated {
            self.authorized(&request).await?
        } else {
            self.public(&request).await?
        };
        read_list(response, "categories", "Failed to load categories").await
    }

    /// Create a category.
    ///
    /// # Errors
    ///
    /// Returns `ApiError::RequestFailed` if the category is refused.
    #[instrument(skip(self))]
    pub async fn create_category(&self, name: &str) -> Result<Category> {
        let request = ApiRequest::post(CATEGORIES_PATH).json(&serde_json::json!({ "name": name }))?;
        let response = self.authorized(&request).await?;
        read_json(response, "Failed to create category").await
    }

    /// Rename a category.
    ///
    /// # Errors
    ///
    /// Returns `ApiError::RequestFailed` if the update is refused.
    #[instrument(skip(self), fields(category_id = %id))]
    pub async fn update_category(&self, id: CategoryId, name: &str) -> Result<Category> {
        let request =
            ApiRequest::put(category_path(id)).json(&serde_json::json!({ "name": name }))?;
        let response = self.authorized(&request).await?;
        read_json(response, "Failed to update category").await
    }

    /// Delete a category.
    ///
    /// # Errors
    ///
    /// Returns `ApiError::RequestFailed` if the category cannot be deleted.
    #[instrument(skip(self), fields(category_id = %id))]
    pub async fn delete_category(&self, id: CategoryId) -> Result<()> {
        let response = self.authorized(&ApiRequest::delete(category_path(id))).await?;
        ensure_success(response, "Failed to delete category").await?;
        Ok(())
    }
}

// =============================================================================
// Multipart encoding
// =============================================================================

fn draft_fields(draft: &ProductDraft) -> Vec<FormField> {
    let mut fields = vec![
        FormField::text("name", &draft.name),
        FormField::text("price", draft.price.to_string()),
        FormField::text("quantity", draft.quantity.to_string()),
    ];
    if let Some(description) = draft.description.as_deref().filter(|d| !d.is_empty()) {
        fields.push(FormField::text("description", description));
    }
    if let Some(category_id) = draft.category_id {
        fields.push(FormField::text("category_id", category_id.to_string()));
    }
    if let Some(image) = &draft.image {
        fields.push(image_field(image));
    }
    fields
}

fn patch_fields(patch: &ProductPatch) -> Vec<FormField> {
    let mut fields = Vec::new();
    if let Some(name) = &patch.name {
        fields.push(FormField::text("name", name));
    }
    if let Some(price) = patch.price {
        fields.push(FormField::text("price", price.to_string()));
    }
    if let Some(quantity) = patch.quantity {
        fields.push(FormField::text("quantity", quantity.to_string()));
    }
    if let Some(description) = &patch.description {
        fields.push(FormField::text("description", description));
    }
    if let Some(category_id) = patch.category_id {
        // An empty value detaches the product from its category.
        let value = category_id.map(|id| id.to_string()).unwrap_or_default();
        fields.push(FormField::text("category_id", value));
    }
    if let Some(image) = &patch.image {
        fields.push(image_field(image));
    }
    fields
}

fn image_field(image: &ImageUpload) -> FormField {
    FormField::File {
        name: "image".to_string(),
        file_name: image.file_name.clone(),
        content_type: image.content_type.clone(),
        bytes: image.bytes.clone(),
    }
}

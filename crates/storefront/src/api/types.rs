//! Records exchanged with the catalog, order and payment endpoints.

use chrono::{DateTime, Utc};
use jhytermax_core::{
    CategoryId, LocationId, OrderId, OrderItemId, OrderStatus, PaymentId, PaymentStatus,
    ProductId, StateId, UserId,
};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

// =============================================================================
// Catalog
// =============================================================================

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Category {
    pub id: CategoryId,
    pub name: String,
    #[serde(default)]
    pub slug: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Product {
    pub id: ProductId,
    pub name: String,
    #[serde(default)]
    pub description: String,
    pub price: Decimal,
    /// Units in stock.
    pub quantity: u32,
    #[serde(default)]
    pub image: Option<String>,
    #[serde(default)]
    pub category: Option<Category>,
}

/// Image attached to a product create/update.
#[derive(Debug, Clone)]
pub struct ImageUpload {
    pub file_name: String,
    pub content_type: Option<String>,
    pub bytes: Vec<u8>,
}

/// New catalog entry.
#[derive(Debug, Clone)]
pub struct ProductDraft {
    pub name: String,
    pub description: Option<String>,
    pub price: Decimal,
    pub quantity: u32,
    pub category_id: Option<CategoryId>,
    pub image: Option<ImageUpload>,
}

/// Partial product update; `None` leaves a field unchanged.
///
/// `category_id: Some(None)` detaches the product from its category.
#[derive(Debug, Clone, Default)]
pub struct ProductPatch {
    pub name: Option<String>,
    pub description: Option<String>,
    pub price: Option<Decimal>,
    pub quantity: Option<u32>,
    pub category_id: Option<Option<CategoryId>>,
    pub image: Option<ImageUpload>,
}

// =============================================================================
// Orders
// =============================================================================

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderItem {
    pub id: OrderItemId,
    pub product: ProductId,
    pub product_name: String,
    #[serde(default)]
    pub product_image: Option<String>,
    pub quantity: u32,
    pub price: Decimal,
    pub subtotal: Decimal,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Order {
    pub id: OrderId,
    /// Human-facing order reference.
    pub order_id: String,
    pub buyer: UserId,
    pub buyer_username: String,
    pub buyer_email: String,
    pub status: OrderStatus,
    pub total_amount: Decimal,
    #[serde(default)]
    pub shipping_address: String,
    #[serde(default)]
    pub delivery_location: Option<LocationId>,
    #[serde(default)]
    pub delivery_location_name: Option<String>,
    #[serde(default)]
    pub delivery_location_state: Option<String>,
    pub delivery_fee: Decimal,
    #[serde(default)]
    pub notes: String,
    #[serde(default)]
    pub items: Vec<OrderItem>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Order {
    /// Sum of the line subtotals, delivery excluded.
    #[must_use]
    pub fn items_subtotal(&self) -> Decimal {
        self.items.iter().map(|item| item.subtotal).sum()
    }
}

/// Body of `POST /api/orders/orders/`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NewOrder {
    pub items: Vec<NewOrderItem>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub location_id: Option<LocationId>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub detailed_address: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct NewOrderItem {
    pub product_id: ProductId,
    pub quantity: u32,
}

// =============================================================================
// Delivery reference data
// =============================================================================

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct State {
    pub id: StateId,
    pub name: String,
    pub code: String,
    pub is_active: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Location {
    pub id: LocationId,
    pub state: State,
    pub state_id: StateId,
    pub name: String,
    pub delivery_fee: Decimal,
    pub is_active: bool,
}

// =============================================================================
// Payments
// =============================================================================

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Payment {
    pub id: PaymentId,
    pub order: OrderId,
    pub order_id: String,
    pub user: UserId,
    pub user_username: String,
    pub amount: Decimal,
    pub currency: String,
    pub status: PaymentStatus,
    #[serde(default)]
    pub payment_method: Option<String>,
    #[serde(default)]
    pub tx_ref: Option<String>,
    #[serde(default)]
    pub flw_ref: Option<String>,
    #[serde(default)]
    pub transaction_id: Option<String>,
    pub customer_email: String,
    pub customer_name: String,
    #[serde(default)]
    pub customer_phone: String,
    #[serde(default)]
    pub metadata: serde_json::Value,
    #[serde(default)]
    pub failure_reason: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    #[serde(default)]
    pub paid_at: Option<DateTime<Utc>>,
}

/// Body of `POST /api/payments/payments/initiate/`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PaymentInit {
    pub order_id: OrderId,
    pub customer_email: String,
    pub customer_name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub customer_phone: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub payment_method: Option<String>,
}

/// Hosted checkout page for a freshly initiated payment.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct PaymentLink {
    pub payment_id: PaymentId,
    pub payment_link: String,
    pub tx_ref: String,
}

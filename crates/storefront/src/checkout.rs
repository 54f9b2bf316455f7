//! Turning a cart into a placed order and a payment.

use jhytermax_core::{LocationId, ProductId};
use rust_decimal::Decimal;
use tracing::instrument;

use crate::api::{ApiClient, Location, NewOrder, NewOrderItem, Order, PaymentInit};
use crate::cart::{CartState, CartStore};
use crate::error::CheckoutError;
use crate::session::UserProfile;

/// A validated order ready to be submitted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CheckoutDraft {
    items: Vec<NewOrderItem>,
    location_id: LocationId,
    subtotal: Decimal,
    delivery_fee: Decimal,
    detailed_address: Option<String>,
    notes: Option<String>,
}

impl CheckoutDraft {
    /// Validate `cart` against the chosen delivery `location`.
    ///
    /// Blank address and notes are left out of the order.
    ///
    /// # Errors
    ///
    /// Returns `CheckoutError::EmptyCart`, `CheckoutError::MissingLocation`,
    /// or `CheckoutError::InvalidProductId` when a line id is not numeric.
    pub fn from_cart(
        cart: &CartState,
        location: Option<&Location>,
        detailed_address: Option<&str>,
        notes: Option<&str>,
    ) -> Result<Self, CheckoutError> {
        if cart.is_empty() {
            return Err(CheckoutError::EmptyCart);
        }
        let location = location.ok_or(CheckoutError::MissingLocation)?;

        let items = cart
            .items()
            .iter()
            .map(|line| {
                let product_id = line
                    .id
                    .parse::<ProductId>()
                    .map_err(|_| CheckoutError::InvalidProductId(line.id.clone()))?;
                Ok(NewOrderItem {
                    product_id,
                    quantity: line.quantity,
                })
            })
            .collect::<Result<Vec<_>, CheckoutError>>()?;

        Ok(Self {
            items,
            location_id: location.id,
            subtotal: cart.subtotal(),
            delivery_fee: location.delivery_fee,
            detailed_address: non_blank(detailed_address),
            notes: non_blank(notes),
        })
    }

    #[must_use]
    pub const fn subtotal(&self) -> Decimal {
        self.subtotal
    }

    #[must_use]
    pub const fn delivery_fee(&self) -> Decimal {
        self.delivery_fee
    }

    /// Amount the buyer pays: subtotal plus delivery.
    #[must_use]
    pub fn total(&self) -> Decimal {
        self.subtotal + self.delivery_fee
    }

    #[must_use]
    pub fn items(&self) -> &[NewOrderItem] {
        &self.items
    }

    /// Request body for order creation.
    #[must_use]
    pub fn into_order(self) -> NewOrder {
        NewOrder {
            items: self.items,
            location_id: Some(self.location_id),
            detailed_address: self.detailed_address,
            notes: self.notes,
        }
    }

    /// Create the order and empty `cart`.
    ///
    /// The cart is left untouched when the order is refused.
    ///
    /// # Errors
    ///
    /// Returns `CheckoutError::Api` if order creation fails.
    #[instrument(skip_all, fields(items = self.items.len(), total = %self.total()))]
    pub async fn submit(self, api: &ApiClient, cart: &CartStore) -> Result<Order, CheckoutError> {
        let order = api.create_order(&self.into_order()).await?;
        cart.clear();
        Ok(order)
    }
}

/// Payment initiation for `order`, billed to the signed-in `profile`.
#[must_use]
pub fn payment_for(profile: &UserProfile, order: &Order) -> PaymentInit {
    PaymentInit {
        order_id: order.id,
        customer_email: profile.email.to_string(),
        customer_name: profile.username.clone(),
        customer_phone: None,
        payment_method: None,
    }
}

fn non_blank(value: Option<&str>) -> Option<String> {
    value
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(str::to_string)
}

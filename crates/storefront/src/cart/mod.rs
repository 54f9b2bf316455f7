//! The buyer's working selection of products.
//!
//! [`CartState`] is an immutable snapshot; every change is a
//! [`CartAction`] reduced into a new snapshot by [`CartState::reduce`].
//! [`CartStore`] owns the current snapshot and applies actions one at a
//! time, and [`CartProvider`] scopes a store to a task so code deep in a
//! call chain can reach it through [`use_cart`].
//!
//! Carts are not persisted; a store lives as long as its owner.

mod store;

use rust_decimal::Decimal;

use crate::api::Product;
use crate::error::CartError;

pub use store::{CartProvider, CartStore, use_cart};

/// Item data supplied when adding to the cart.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewCartItem {
    id: String,
    name: String,
    price: Decimal,
    metric: Option<String>,
    image: Option<String>,
    note: Option<String>,
}

impl NewCartItem {
    /// Line data for `id` at unit `price`.
    ///
    /// # Errors
    ///
    /// Returns `CartError::NegativePrice` if `price` is below zero.
    pub fn new(
        id: impl Into<String>,
        name: impl Into<String>,
        price: Decimal,
    ) -> Result<Self, CartError> {
        if price < Decimal::ZERO {
            return Err(CartError::NegativePrice);
        }
        Ok(Self {
            id: id.into(),
            name: name.into(),
            price,
            metric: None,
            image: None,
            note: None,
        })
    }

    /// Unit label shown next to the price ("per basket", "1kg").
    #[must_use]
    pub fn with_metric(mut self, metric: impl Into<String>) -> Self {
        self.metric = Some(metric.into());
        self
    }

    #[must_use]
    pub fn with_image(mut self, image: impl Into<String>) -> Self {
        self.image = Some(image.into());
        self
    }

    #[must_use]
    pub fn with_note(mut self, note: impl Into<String>) -> Self {
        self.note = Some(note.into());
        self
    }

    #[must_use]
    pub fn id(&self) -> &str {
        &self.id
    }
}

impl From<&Product> for NewCartItem {
    /// Catalog prices are validated server-side; a negative one is floored
    /// to zero rather than carried into the cart.
    fn from(product: &Product) -> Self {
        Self {
            id: product.id.to_string(),
            name: product.name.clone(),
            price: product.price.max(Decimal::ZERO),
            metric: None,
            image: product.image.clone(),
            note: None,
        }
    }
}

/// One line of the cart.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CartItem {
    pub id: String,
    pub name: String,
    pub price: Decimal,
    /// Always at least 1; lines whose quantity drops to 0 are removed.
    pub quantity: u32,
    pub metric: Option<String>,
    pub image: Option<String>,
    pub note: Option<String>,
}

impl CartItem {
    /// `price × quantity`.
    #[must_use]
    pub fn line_total(&self) -> Decimal {
        self.price * Decimal::from(self.quantity)
    }
}

/// A change to the cart.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CartAction {
    /// Add one unit; repeat adds only bump the quantity.
    Add(NewCartItem),
    Remove(String),
    /// Set the quantity; zero or less removes the line.
    SetQuantity(String, i64),
    Clear,
}

/// Immutable cart snapshot.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CartState {
    items: Vec<CartItem>,
}

impl CartState {
    /// Empty cart.
    #[must_use]
    pub const fn new() -> Self {
        Self { items: Vec::new() }
    }

    /// Apply `action`, producing the next snapshot.
    #[must_use]
    pub fn reduce(&self, action: CartAction) -> Self {
        let mut items = self.items.clone();
        match action {
            CartAction::Add(item) => {
                if let Some(line) = items.iter_mut().find(|line| line.id == item.id) {
                    line.quantity = line.quantity.saturating_add(1);
                } else {
                    items.push(CartItem {
                        id: item.id,
                        name: item.name,
                        price: item.price,
                        quantity: 1,
                        metric: item.metric,
                        image: item.image,
                        note: item.note,
                    });
                }
            }
            CartAction::Remove(id) => items.retain(|line| line.id != id),
            CartAction::SetQuantity(id, quantity) => {
                if quantity <= 0 {
                    items.retain(|line| line.id != id);
                } else if let Some(line) = items.iter_mut().find(|line| line.id == id) {
                    line.quantity = u32::try_from(quantity).unwrap_or(u32::MAX);
                }
            }
            CartAction::Clear => items.clear(),
        }
        Self { items }
    }

    /// Lines in the order they were first added.
    #[must_use]
    pub fn items(&self) -> &[CartItem] {
        &self.items
    }

    #[must_use]
    pub fn get(&self, id: &str) -> Option<&CartItem> {
        self.items.iter().find(|line| line.id == id)
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Total number of units across all lines.
    #[must_use]
    pub fn item_count(&self) -> u64 {
        self.items.iter().map(|line| u64::from(line.quantity)).sum()
    }

    /// Sum of `price × quantity` over the current lines.
    #[must_use]
    pub fn subtotal(&self) -> Decimal {
        self.items.iter().map(CartItem::line_total).sum()
    }
}

//! Fill a cart from the command line and place the order.
//!
//! # Usage
//!
//! ```bash
//! # Two of product 7 and one of product 9, delivered to location 2
//! jx checkout -i 7:2 -i 9 -l 2 -a "12 Market Rd" --pay
//! ```

use std::str::FromStr;
use std::sync::Arc;

use jhytermax_core::{LocationId, ProductId, format_naira};
use jhytermax_storefront::AppState;
use jhytermax_storefront::cart::{CartProvider, CartStore, NewCartItem, use_cart};
use jhytermax_storefront::checkout::{CheckoutDraft, payment_for};

use super::CommandResult;

/// One `--item <product_id>[:<quantity>]` argument.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CartLine {
    pub product_id: ProductId,
    pub quantity: u32,
}

impl FromStr for CartLine {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (id, quantity) = s.split_once(':').unwrap_or((s, "1"));
        let product_id = id
            .parse()
            .map_err(|_| format!("invalid product id: {id:?}"))?;
        let quantity = quantity
            .trim()
            .parse::<u32>()
            .ok()
            .filter(|q| *q > 0)
            .ok_or_else(|| format!("invalid quantity: {quantity:?}"))?;
        Ok(Self {
            product_id,
            quantity,
        })
    }
}

/// Arguments of `checkout`.
pub struct CheckoutRequest {
    pub items: Vec<CartLine>,
    pub location: Option<LocationId>,
    pub address: Option<String>,
    pub notes: Option<String>,
    pub pay: bool,
}

pub async fn run(state: &AppState, request: CheckoutRequest) -> CommandResult {
    let cart = state.cart();
    CartProvider::scope(Arc::clone(&cart), fill_cart(state, &request.items)).await?;

    let location = match request.location {
        Some(id) => {
            let locations = state.api().list_locations(None).await?;
            locations.into_iter().find(|l| l.id == id)
        }
        None => None,
    };

    let snapshot = cart.snapshot();
    let draft = CheckoutDraft::from_cart(
        &snapshot,
        location.as_ref(),
        request.address.as_deref(),
        request.notes.as_deref(),
    )?;
    tracing::info!(
        "Subtotal {}, delivery {}, total {}",
        format_naira(draft.subtotal()),
        format_naira(draft.delivery_fee()),
        format_naira(draft.total())
    );

    let order = draft.submit(state.api(), &cart).await?;
    tracing::info!("Order {} placed ({})", order.order_id, order.status);

    if request.pay {
        let profile = state.session().ensure_profile().await?;
        let link = state
            .api()
            .initiate_payment(&payment_for(&profile, &order))
            .await?;
        tracing::info!("Complete payment at {}", link.payment_link);
    }
    Ok(())
}

/// Add each requested product to the cart of the enclosing scope.
async fn fill_cart(state: &AppState, lines: &[CartLine]) -> CommandResult {
    let cart: Arc<CartStore> = use_cart()?;
    for line in lines {
        let product = state.api().get_product(line.product_id).await?;
        if product.quantity < line.quantity {
            tracing::warn!(
                "Only {} of {} in stock; the order may be refused",
                product.quantity,
                product.name
            );
        }
        let item = NewCartItem::from(&product);
        let id = item.id().to_string();
        let previous = cart.snapshot().get(&id).map_or(0, |l| l.quantity);
        cart.add_item(item);
        cart.set_quantity(id, i64::from(previous) + i64::from(line.quantity));
    }
    Ok(())
}

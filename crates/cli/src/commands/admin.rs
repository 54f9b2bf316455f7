//! Admin dashboard commands.
//!
//! # Usage
//!
//! ```bash
//! jx admin summary
//! ```

use jhytermax_admin::{AdminConsole, LOW_STOCK_THRESHOLD, inventory};
use jhytermax_core::format_naira;
use jhytermax_storefront::AppState;

use super::CommandResult;

/// Catalog figures, open orders and the products that need restocking.
pub async fn summary(state: &AppState) -> CommandResult {
    let console = AdminConsole::connect(state.api().clone()).await?;
    tracing::info!("Signed in as {}", console.profile().username);

    let summary = console.inventory_summary().await?;
    tracing::info!(
        "{} products in {} categories, inventory value {}",
        summary.product_count,
        summary.category_count,
        format_naira(summary.inventory_value)
    );

    let orders = console.orders(None).await?;
    let open = orders.iter().filter(|o| o.status.is_open()).count();
    tracing::info!("{} orders, {open} open", orders.len());

    if summary.low_stock_count > 0 {
        tracing::warn!(
            "{} products at or below {LOW_STOCK_THRESHOLD} units",
            summary.low_stock_count
        );
        let products = console.products().await?;
        for product in inventory::low_stock(&products) {
            tracing::warn!("  #{} {} ({} left)", product.id, product.name, product.quantity);
        }
    }
    Ok(())
}

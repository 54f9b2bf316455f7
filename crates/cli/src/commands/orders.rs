//! Order and delivery reference-data commands.

use chrono::Utc;
use jhytermax_admin::AdminConsole;
use jhytermax_core::{OrderId, OrderStatus, StateId, format_naira};
use jhytermax_storefront::AppState;
use jhytermax_storefront::api::Order;
use jhytermax_storefront::dashboard::{BuyerSummary, filter_by_status};

use super::CommandResult;

fn log_order(order: &Order) {
    tracing::info!(
        "#{:<5} {:<12} {:<10} {:>12}  {}  {}",
        order.id,
        order.order_id,
        order.status,
        format_naira(order.total_amount),
        order.created_at.format("%Y-%m-%d"),
        order.delivery_location_name.as_deref().unwrap_or("-")
    );
}

/// List orders, then the dashboard headline figures for the full history.
pub async fn list(state: &AppState, status: Option<OrderStatus>) -> CommandResult {
    let orders = state.api().list_orders().await?;
    let mut shown = 0_usize;
    for order in filter_by_status(&orders, status) {
        log_order(order);
        shown += 1;
    }
    if shown == 0 {
        tracing::info!("No orders");
    }

    let summary = BuyerSummary::from_orders(&orders, Utc::now());
    tracing::info!(
        "{} orders, {} open, {} delivered; spent {} ({} in the last 30 days)",
        summary.total_orders,
        summary.open_orders,
        summary.delivered_orders,
        format_naira(summary.total_spent),
        format_naira(summary.recent_spent)
    );
    Ok(())
}

pub async fn show(state: &AppState, id: OrderId) -> CommandResult {
    let order = state.api().get_order(id).await?;
    log_order(&order);
    for item in &order.items {
        tracing::info!(
            "  {} x {:<28} {:>12}",
            item.quantity,
            item.product_name,
            format_naira(item.subtotal)
        );
    }
    tracing::info!("  Subtotal {}", format_naira(order.items_subtotal()));
    tracing::info!("  Delivery {}", format_naira(order.delivery_fee));
    tracing::info!("  Total    {}", format_naira(order.total_amount));
    if !order.shipping_address.is_empty() {
        tracing::info!("  Ship to  {}", order.shipping_address);
    }
    Ok(())
}

pub async fn set_status(state: &AppState, id: OrderId, status: OrderStatus) -> CommandResult {
    let console = AdminConsole::connect(state.api().clone()).await?;
    let order = console.set_order_status(id, status).await?;
    tracing::info!("Order {} is now {}", order.order_id, order.status);
    Ok(())
}

pub async fn states(state: &AppState) -> CommandResult {
    for s in state.api().list_states().await? {
        let active = if s.is_active { "" } else { " (inactive)" };
        tracing::info!("#{:<4} {:<4} {}{active}", s.id, s.code, s.name);
    }
    Ok(())
}

pub async fn locations(state: &AppState, state_id: Option<StateId>) -> CommandResult {
    for location in state.api().list_locations(state_id).await? {
        tracing::info!(
            "#{:<4} {:<24} {:<16} delivery {}",
            location.id,
            location.name,
            location.state.name,
            format_naira(location.delivery_fee)
        );
    }
    Ok(())
}

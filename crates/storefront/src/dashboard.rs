//! Buyer dashboard figures derived from the order history.

use chrono::{DateTime, Duration, Utc};
use jhytermax_core::OrderStatus;
use rust_decimal::Decimal;

use crate::api::Order;

/// Window for recent spending.
const RECENT_WINDOW_DAYS: i64 = 30;

/// Headline numbers for a buyer's orders.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct BuyerSummary {
    pub total_orders: usize,
    /// Pending or processing.
    pub open_orders: usize,
    pub delivered_orders: usize,
    pub total_spent: Decimal,
    /// Spent on orders created in the last 30 days before `now`.
    pub recent_spent: Decimal,
}

impl BuyerSummary {
    #[must_use]
    pub fn from_orders(orders: &[Order], now: DateTime<Utc>) -> Self {
        let since = now - Duration::days(RECENT_WINDOW_DAYS);
        orders.iter().fold(Self::default(), |mut summary, order| {
            summary.total_orders += 1;
            if order.status.is_open() {
                summary.open_orders += 1;
            }
            if order.status == OrderStatus::Delivered {
                summary.delivered_orders += 1;
            }
            summary.total_spent += order.total_amount;
            if order.created_at >= since {
                summary.recent_spent += order.total_amount;
            }
            summary
        })
    }
}

/// Orders matching `status`, or all of them when `status` is `None`.
pub fn filter_by_status(
    orders: &[Order],
    status: Option<OrderStatus>,
) -> impl Iterator<Item = &Order> {
    orders
        .iter()
        .filter(move |order| status.is_none_or(|wanted| order.status == wanted))
}

//! Payment commands.

use jhytermax_core::{OrderId, format_naira};
use jhytermax_storefront::checkout::payment_for;
use jhytermax_storefront::{ApiError, AppState};

use super::CommandResult;

/// Start a payment for `order_id`, billed to the signed-in user.
pub async fn initiate(state: &AppState, order_id: OrderId, phone: Option<String>) -> CommandResult {
    let profile = state.session().ensure_profile().await?;
    let order = state.api().get_order(order_id).await?;

    let mut init = payment_for(&profile, &order);
    init.customer_phone = phone;
    let link = state.api().initiate_payment(&init).await?;

    tracing::info!(
        "Pay {} for order {} at {}",
        format_naira(order.total_amount),
        order.order_id,
        link.payment_link
    );
    tracing::info!("Verify afterwards with: jx payments verify {}", link.tx_ref);
    Ok(())
}

pub async fn verify(state: &AppState, tx_ref: &str) -> CommandResult {
    match state.api().verify_payment(tx_ref).await {
        Ok(payment) if payment.status.is_successful() => {
            tracing::info!(
                "Payment for order {} confirmed: {}",
                payment.order_id,
                format_naira(payment.amount)
            );
            Ok(())
        }
        Ok(payment) => {
            let reason = payment.failure_reason.as_deref().unwrap_or("no reason given");
            tracing::warn!("Payment {:?}: {reason}", payment.status);
            Ok(())
        }
        Err(ApiError::PaymentPending(message)) => {
            tracing::info!("{message}");
            Ok(())
        }
        Err(e) => Err(e.into()),
    }
}

pub async fn list(state: &AppState) -> CommandResult {
    for payment in state.api().list_payments().await? {
        tracing::info!(
            "#{:<5} {:<12} {:>12} {:<10?} {}",
            payment.id,
            payment.order_id,
            format_naira(payment.amount),
            payment.status,
            payment.tx_ref.as_deref().unwrap_or("-")
        );
    }
    Ok(())
}

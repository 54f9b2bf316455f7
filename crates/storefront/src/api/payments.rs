//! Payment initiation and verification.

use reqwest::StatusCode;
use serde_json::Value;
use tracing::instrument;

use super::ApiClient;
use super::types::{Payment, PaymentInit, PaymentLink};
use crate::error::{ApiError, Result};
use crate::http::{ApiRequest, read_json, read_list};

const PAYMENTS_PATH: &str = "/api/payments/payments/";
const INITIATE_PATH: &str = "/api/payments/payments/initiate/";
const VERIFY_PATH: &str = "/api/payments/payments/verify/";

/// Message when a pending verification carries no explanation.
const PENDING_FALLBACK: &str =
    "Transaction not yet available. Please wait a moment and try again.";

impl ApiClient {
    /// Start a payment for an order and get the hosted checkout link.
    ///
    /// # Errors
    ///
    /// Returns `ApiError::RequestFailed` if the payment provider or the API
    /// refuses the initiation.
    #[instrument(skip(self, init), fields(order_id = %init.order_id))]
    pub async fn initiate_payment(&self, init: &PaymentInit) -> Result<PaymentLink> {
        let request = ApiRequest::post(INITIATE_PATH).json(init)?;
        let response = self.authorized(&request).await?;
        let link: PaymentLink = read_json(response, "Failed to initiate payment").await?;
        tracing::info!(payment_id = %link.payment_id, tx_ref = %link.tx_ref, "Payment initiated");
        Ok(link)
    }

    /// Confirm a payment by its transaction reference.
    ///
    /// # Errors
    ///
    /// Returns `ApiError::PaymentPending` when the provider has not settled
    /// the transaction yet (HTTP 202) and `ApiError::RequestFailed` when
    /// verification fails.
    #[instrument(skip(self))]
    pub async fn verify_payment(&self, tx_ref: &str) -> Result<Payment> {
        let request = ApiRequest::post(VERIFY_PATH).json(&serde_json::json!({ "tx_ref": tx_ref }))?;
        let response = self.authorized(&request).await?;

        if response.status() == StatusCode::ACCEPTED {
            let body = response.text().await.unwrap_or_default();
            return Err(ApiError::PaymentPending(pending_message(&body)));
        }

        let payment: Payment = read_json(response, "Failed to verify payment").await?;
        tracing::info!(payment_id = %payment.id, status = ?payment.status, "Payment verified");
        Ok(payment)
    }

    /// Payments made by the signed-in user.
    ///
    /// # Errors
    ///
    /// Returns `ApiError::UnexpectedPayload` if the endpoint does not answer
    /// with an array, or `ApiError::RequestFailed` on a non-success status.
    #[instrument(skip(self))]
    pub async fn list_payments(&self) -> Result<Vec<Payment>> {
        let response = self.authorized(&ApiRequest::get(PAYMENTS_PATH)).await?;
        read_list(response, "payments", "Failed to load payments").await
    }
}

/// Explanation carried by a 202 verification answer.
fn pending_message(body: &str) -> String {
    let Ok(Value::Object(map)) = serde_json::from_str::<Value>(body) else {
        return "Transaction is being processed".to_string();
    };
    ["error", "message"]
        .iter()
        .find_map(|key| match map.get(*key) {
            Some(Value::String(text)) if !text.is_empty() => Some(text.clone()),
            _ => None,
        })
        .unwrap_or_else(|| PENDING_FALLBACK.to_string())
}

//! Orders and delivery reference data.

use jhytermax_core::{OrderId, OrderStatus, StateId};
use tracing::{debug, instrument};

use super::ApiClient;
use super::cache::{CacheKey, CacheValue};
use super::types::{Location, NewOrder, Order, State};
use crate::error::Result;
use crate::http::{ApiRequest, read_json, read_list};

const ORDERS_PATH: &str = "/api/orders/orders/";
const STATES_PATH: &str = "/api/orders/states/";
const LOCATIONS_PATH: &str = "/api/orders/locations/";

fn order_path(id: OrderId) -> String {
    format!("{ORDERS_PATH}{id}/")
}

impl ApiClient {
    // =========================================================================
    // Orders
    // =========================================================================

    /// Orders visible to the signed-in user: their own for buyers, every
    /// order for admins.
    ///
    /// # Errors
    ///
    /// Returns `ApiError::UnexpectedPayload` if the endpoint does not answer
    /// with an array, or `ApiError::RequestFailed` on a non-success status.
    #[instrument(skip(self))]
    pub async fn list_orders(&self) -> Result<Vec<Order>> {
        let response = self.authorized(&ApiRequest::get(ORDERS_PATH)).await?;
        read_list(response, "orders", "Failed to load orders").await
    }

    /// Fetch a single order with its line items.
    ///
    /// # Errors
    ///
    /// Returns `ApiError::RequestFailed` if the order does not exist or
    /// belongs to someone else.
    #[instrument(skip(self), fields(order_id = %id))]
    pub async fn get_order(&self, id: OrderId) -> Result<Order> {
        let response = self.authorized(&ApiRequest::get(order_path(id))).await?;
        read_json(response, "Failed to load order").await
    }

    /// Place an order.
    ///
    /// # Errors
    ///
    /// Returns `ApiError::RequestFailed` with the server's reason (for
    /// example insufficient stock) if the order is refused.
    #[instrument(skip(self, order), fields(items = order.items.len()))]
    pub async fn create_order(&self, order: &NewOrder) -> Result<Order> {
        let request = ApiRequest::post(ORDERS_PATH).json(order)?;
        let response = self.authorized(&request).await?;
        let order: Order = read_json(response, "Failed to create order").await?;
        tracing::info!(order_id = %order.id, reference = %order.order_id, "Created order");
        Ok(order)
    }

    /// Move an order to `status`. Admin only.
    ///
    /// # Errors
    ///
    /// Returns `ApiError::RequestFailed` if the change is refused.
    #[instrument(skip(self), fields(order_id = %id, status = %status))]
    pub async fn update_order_status(&self, id: OrderId, status: OrderStatus) -> Result<Order> {
        let request = ApiRequest::patch(format!("{ORDERS_PATH}{id}/update_status/"))
            .json(&serde_json::json!({ "status": status }))?;
        let response = self.authorized(&request).await?;
        read_json(response, "Failed to update order status").await
    }

    // =========================================================================
    // Reference data (cached)
    // =========================================================================

    /// States that have delivery locations.
    ///
    /// # Errors
    ///
    /// Returns `ApiError::UnexpectedPayload` if the endpoint does not answer
    /// with an array, or `ApiError::RequestFailed` on a non-success status.
    #[instrument(skip(self))]
    pub async fn list_states(&self) -> Result<Vec<State>> {
        if let Some(CacheValue::States(states)) = self.inner.reference.get(&CacheKey::States).await
        {
            debug!("Cache hit for states");
            return Ok(states);
        }

        let response = self.public(&ApiRequest::get(STATES_PATH)).await?;
        let states: Vec<State> = read_list(response, "states", "Failed to load states").await?;

        self.inner
            .reference
            .insert(CacheKey::States, CacheValue::States(states.clone()))
            .await;
        Ok(states)
    }

    /// Delivery locations, optionally limited to one state.
    ///
    /// # Errors
    ///
    /// Returns `ApiError::UnexpectedPayload` if the endpoint does not answer
    /// with an array, or `ApiError::RequestFailed` on a non-success status.
    #[instrument(skip(self))]
    pub async fn list_locations(&self, state_id: Option<StateId>) -> Result<Vec<Location>> {
        let key = CacheKey::Locations { state_id };
        if let Some(CacheValue::Locations(locations)) = self.inner.reference.get(&key).await {
            debug!("Cache hit for locations");
            return Ok(locations);
        }

        let mut request = ApiRequest::get(LOCATIONS_PATH);
        if let Some(state_id) = state_id {
            request = request.query("state_id", state_id);
        }
        let response = self.public(&request).await?;
        let locations: Vec<Location> =
            read_list(response, "locations", "Failed to load locations").await?;

        self.inner
            .reference
            .insert(key, CacheValue::Locations(locations.clone()))
            .await;
        Ok(locations)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_order_path() {
        assert_eq!(order_path(OrderId::new(12)), "/api/orders/orders/12/");
    }
}

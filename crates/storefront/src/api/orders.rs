//! Order endpoints.

use buildhive_core::OrderId;
use serde::Serialize;
use serde_json::Value;
use tracing::{debug, instrument};

use crate::models::{Order, OrderDraft, OrderTracking, PageMeta};

use super::{ApiClient, ApiError};

/// Query parameters for the order list endpoint.
#[derive(Debug, Clone, Default, Serialize)]
pub struct OrderListQuery {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub page: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub limit: Option<u32>,
}

/// Client for `/orders` endpoints.
#[derive(Debug, Clone)]
pub struct OrderApi {
    client: ApiClient,
}

impl OrderApi {
    #[must_use]
    pub const fn new(client: ApiClient) -> Self {
        Self { client }
    }

    /// Place an order.
    ///
    /// # Errors
    ///
    /// Returns an error if validation fails, stock ran out, or the
    /// response lacks the created order.
    #[instrument(skip(self, draft), fields(lines = draft.items.len()))]
    pub async fn create(&self, draft: &OrderDraft) -> Result<Order, ApiError> {
        let value = self.client.post_value("orders", draft).await?;

        // Multi-seller checkouts come back as {"orders": [...]}; single
        // orders come back bare. Surface the first either way.
        let order = match value {
            Value::Object(ref map) if map.contains_key("orders") => map
                .get("orders")
                .and_then(Value::as_array)
                .and_then(|orders| orders.first())
                .cloned()
                .ok_or_else(|| {
                    ApiError::Malformed("order creation returned an empty orders list".to_string())
                })?,
            other => other,
        };

        Ok(serde_json::from_value(order)?)
    }

    /// List the signed-in user's orders.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails.
    #[instrument(skip(self))]
    pub async fn list(&self, query: &OrderListQuery) -> Result<(Vec<Order>, PageMeta), ApiError> {
        let value: Value = self.client.get_with_query("orders", query).await?;

        let meta = value
            .get("pagination")
            .or_else(|| value.get("meta"))
            .cloned()
            .and_then(|m| serde_json::from_value(m).ok())
            .unwrap_or_default();

        let orders = match value {
            Value::Array(_) => serde_json::from_value(value)?,
            Value::Object(mut map) => match map.remove("orders") {
                Some(list) => serde_json::from_value(list)?,
                None => Vec::new(),
            },
            _ => Vec::new(),
        };

        Ok((orders, meta))
    }

    /// Fetch one order by id.
    ///
    /// # Errors
    ///
    /// Returns an error if the order does not exist or belongs to someone
    /// else.
    #[instrument(skip(self), fields(order_id = %order_id))]
    pub async fn get(&self, order_id: &OrderId) -> Result<Order, ApiError> {
        let value = self.client.get_value(&format!("orders/{order_id}")).await?;
        let order = value.get("order").cloned().unwrap_or(value);
        Ok(serde_json::from_value(order)?)
    }

    /// Cancel an order that has not shipped yet.
    ///
    /// # Errors
    ///
    /// Returns an error if the order is past the cancellable states.
    #[instrument(skip(self), fields(order_id = %order_id))]
    pub async fn cancel(&self, order_id: &OrderId) -> Result<Order, ApiError> {
        let value = self
            .client
            .put_value(&format!("orders/{order_id}/cancel"), &serde_json::json!({}))
            .await?;
        let order = value.get("order").cloned().unwrap_or(value);
        Ok(serde_json::from_value(order)?)
    }

    /// Fetch shipment tracking for an order.
    ///
    /// Tracking is optional data; any failure is logged and reported as
    /// "no tracking yet" instead of an error.
    ///
    /// # Errors
    ///
    /// Infallible in practice; the signature stays `Result` for symmetry
    /// with the other calls.
    #[instrument(skip(self), fields(order_id = %order_id))]
    pub async fn tracking(&self, order_id: &OrderId) -> Result<Option<OrderTracking>, ApiError> {
        match self
            .client
            .get::<OrderTracking>(&format!("orders/{order_id}/tracking"))
            .await
        {
            Ok(tracking) => Ok(Some(tracking)),
            Err(e) => {
                debug!(error = %e, "tracking unavailable for order");
                Ok(None)
            }
        }
    }
}

//! Cart endpoints.
//!
//! The cart endpoints have accumulated three response shapes for the same
//! list (`{"data": {"items": [...]}}`, `{"data": [...]}`, and a bare
//! array), so everything funnels through [`CartApi::items`] which
//! normalizes them. Lines that fail to parse individually are skipped with
//! a warning rather than failing the whole fetch.

use buildhive_core::CartLineId;
use serde_json::{Value, json};
use tracing::{instrument, warn};

use crate::cart::CartGateway;
use crate::models::{CartLine, CartSummary};

use super::{ApiClient, ApiError};

/// Client for `/cart` endpoints.
#[derive(Debug, Clone)]
pub struct CartApi {
    client: ApiClient,
}

impl CartApi {
    #[must_use]
    pub const fn new(client: ApiClient) -> Self {
        Self { client }
    }

    /// Fetch the signed-in user's cart lines.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails; unparseable individual
    /// lines are skipped, and an unrecognized shape yields an empty cart.
    #[instrument(skip(self))]
    pub async fn items(&self) -> Result<Vec<CartLine>, ApiError> {
        let value = self.client.get_value("cart").await?;
        Ok(normalize_cart_items(value))
    }

    /// Add a product to the cart, merging with an existing line server-side.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails or the response lacks the
    /// created/updated line.
    #[instrument(skip(self), fields(product_id = %product_id, quantity))]
    pub async fn add(&self, product_id: &str, quantity: u32) -> Result<CartLine, ApiError> {
        let value = self
            .client
            .post_value(
                "cart",
                &json!({"productId": product_id, "quantity": quantity}),
            )
            .await?;

        // The created line may come back bare or nested under "item".
        let line = value.get("item").cloned().unwrap_or(value);
        serde_json::from_value(line).map_err(|_| {
            ApiError::Malformed("Invalid response structure from add to cart API".to_string())
        })
    }

    /// Set the quantity of an existing cart line.
    ///
    /// # Errors
    ///
    /// Returns an error if the line no longer exists or the request fails.
    #[instrument(skip(self), fields(line_id = %line_id, quantity))]
    pub async fn update_quantity(&self, line_id: &CartLineId, quantity: u32) -> Result<(), ApiError> {
        self.client
            .put_value(&format!("cart/{line_id}"), &json!({"quantity": quantity}))
            .await?;
        Ok(())
    }

    /// Remove one cart line.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails.
    #[instrument(skip(self), fields(line_id = %line_id))]
    pub async fn remove(&self, line_id: &CartLineId) -> Result<(), ApiError> {
        self.client.delete(&format!("cart/{line_id}")).await
    }

    /// Remove every line from the cart.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails.
    #[instrument(skip(self))]
    pub async fn clear(&self) -> Result<(), ApiError> {
        self.client.delete("cart/clear/all").await
    }

    /// Fetch server-computed cart totals.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails.
    #[instrument(skip(self))]
    pub async fn summary(&self) -> Result<CartSummary, ApiError> {
        self.client.get("cart/summary").await
    }
}

impl CartGateway for CartApi {
    async fn fetch(&self) -> Result<Vec<CartLine>, ApiError> {
        self.items().await
    }

    async fn add(&self, product_id: &str, quantity: u32) -> Result<CartLine, ApiError> {
        Self::add(self, product_id, quantity).await
    }

    async fn update_quantity(
        &self,
        line_id: &CartLineId,
        quantity: u32,
    ) -> Result<(), ApiError> {
        Self::update_quantity(self, line_id, quantity).await
    }

    async fn remove(&self, line_id: &CartLineId) -> Result<(), ApiError> {
        Self::remove(self, line_id).await
    }

    async fn clear(&self) -> Result<(), ApiError> {
        Self::clear(self).await
    }
}

/// Normalize the cart list's known response shapes into a line vector.
fn normalize_cart_items(value: Value) -> Vec<CartLine> {
    let items = match value {
        Value::Array(items) => items,
        Value::Object(mut map) => match map.remove("items") {
            Some(Value::Array(items)) => items,
            _ => {
                warn!("unrecognized cart response shape, treating as empty");
                return Vec::new();
            }
        },
        _ => return Vec::new(),
    };

    items
        .into_iter()
        .filter_map(|item| match serde_json::from_value::<CartLine>(item) {
            Ok(line) => Some(line),
            Err(e) => {
                warn!(error = %e, "skipping unparseable cart line");
                None
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_normalize_bare_array() {
        let value = json!([{"id": "l-1", "product_id": "p-1", "quantity": 1}]);
        assert_eq!(normalize_cart_items(value).len(), 1);
    }

    #[test]
    fn test_normalize_items_object() {
        let value = json!({"items": [
            {"id": "l-1", "product_id": "p-1", "quantity": 2},
            {"id": "l-2", "product_id": "p-2", "quantity": 1}
        ]});
        assert_eq!(normalize_cart_items(value).len(), 2);
    }

    #[test]
    fn test_normalize_skips_bad_lines() {
        let value = json!([
            {"id": "l-1", "product_id": "p-1", "quantity": 1},
            {"id": "l-2"}
        ]);
        let lines = normalize_cart_items(value);
        assert_eq!(lines.len(), 1);
        assert_eq!(lines.first().map(|l| l.id.as_str()), Some("l-1"));
    }

    #[test]
    fn test_normalize_unknown_shape_is_empty() {
        assert!(normalize_cart_items(json!({"cart": 1})).is_empty());
        assert!(normalize_cart_items(json!(null)).is_empty());
    }
}

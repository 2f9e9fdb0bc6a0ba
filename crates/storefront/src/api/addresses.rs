//! Shipping address endpoints, scoped under the owning user.

use buildhive_core::{AddressId, UserId};
use serde_json::Value;
use tracing::instrument;

use crate::models::{Address, NewAddress};

use super::{ApiClient, ApiError};

/// Client for `/users/{userId}/addresses` endpoints.
#[derive(Debug, Clone)]
pub struct AddressApi {
    client: ApiClient,
}

impl AddressApi {
    #[must_use]
    pub const fn new(client: ApiClient) -> Self {
        Self { client }
    }

    /// Save a new address for the user.
    ///
    /// # Errors
    ///
    /// Returns an error if validation fails or the request fails.
    #[instrument(skip(self, address), fields(user_id = %user_id))]
    pub async fn create(
        &self,
        user_id: &UserId,
        address: &NewAddress,
    ) -> Result<Address, ApiError> {
        let value = self
            .client
            .post_value(&format!("users/{user_id}/addresses"), address)
            .await?;
        let address = value.get("address").cloned().unwrap_or(value);
        Ok(serde_json::from_value(address)?)
    }

    /// List the user's saved addresses.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails.
    #[instrument(skip(self), fields(user_id = %user_id))]
    pub async fn list(&self, user_id: &UserId) -> Result<Vec<Address>, ApiError> {
        let value = self
            .client
            .get_value(&format!("users/{user_id}/addresses"))
            .await?;
        let addresses = match value {
            Value::Array(_) => value,
            Value::Object(mut map) => map.remove("addresses").unwrap_or(Value::Array(Vec::new())),
            _ => Value::Array(Vec::new()),
        };
        Ok(serde_json::from_value(addresses)?)
    }

    /// Replace a saved address.
    ///
    /// # Errors
    ///
    /// Returns an error if the address does not exist or validation fails.
    #[instrument(skip(self, address), fields(user_id = %user_id, address_id = %address_id))]
    pub async fn update(
        &self,
        user_id: &UserId,
        address_id: &AddressId,
        address: &NewAddress,
    ) -> Result<Address, ApiError> {
        let value = self
            .client
            .put_value(&format!("users/{user_id}/addresses/{address_id}"), address)
            .await?;
        let address = value.get("address").cloned().unwrap_or(value);
        Ok(serde_json::from_value(address)?)
    }

    /// Delete a saved address.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails.
    #[instrument(skip(self), fields(user_id = %user_id, address_id = %address_id))]
    pub async fn delete(&self, user_id: &UserId, address_id: &AddressId) -> Result<(), ApiError> {
        self.client
            .delete(&format!("users/{user_id}/addresses/{address_id}"))
            .await
    }
}

//! Card payment endpoints.

use buildhive_core::{OrderId, PaymentIntentId};
use serde_json::json;
use tracing::instrument;

use crate::models::{PaymentConfig, PaymentIntent};

use super::{ApiClient, ApiError};

/// Client for `/payment` endpoints.
#[derive(Debug, Clone)]
pub struct PaymentApi {
    client: ApiClient,
}

impl PaymentApi {
    #[must_use]
    pub const fn new(client: ApiClient) -> Self {
        Self { client }
    }

    /// Fetch the publishable gateway configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails or the config is missing a
    /// publishable key.
    #[instrument(skip(self))]
    pub async fn config(&self) -> Result<PaymentConfig, ApiError> {
        self.client.get("payment/config").await
    }

    /// Create a payment intent for an unpaid order.
    ///
    /// # Errors
    ///
    /// Returns an error if the order is not payable or the request fails.
    #[instrument(skip(self), fields(order_id = %order_id))]
    pub async fn create_intent(&self, order_id: &OrderId) -> Result<PaymentIntent, ApiError> {
        self.client
            .post("payment/create-payment-intent", &json!({"orderId": order_id}))
            .await
    }

    /// Tell the backend a card payment went through so it can verify with
    /// the gateway and mark the order paid.
    ///
    /// # Errors
    ///
    /// Returns an error if the gateway reports the intent unpaid.
    #[instrument(skip(self), fields(intent_id = %intent_id))]
    pub async fn confirm(&self, intent_id: &PaymentIntentId) -> Result<(), ApiError> {
        self.client
            .post_value(
                "payment/confirm-payment",
                &json!({"paymentIntentId": intent_id}),
            )
            .await?;
        Ok(())
    }
}

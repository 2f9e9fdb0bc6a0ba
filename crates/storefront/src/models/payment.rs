//! Card payment configuration and intents.

use buildhive_core::{OrderId, PaymentIntentId};
use serde::{Deserialize, Serialize};

/// Publishable gateway configuration for the card widget.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PaymentConfig {
    #[serde(alias = "publishableKey")]
    pub publishable_key: String,
    #[serde(default)]
    pub mode: Option<String>,
}

/// A freshly created payment intent.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PaymentIntent {
    #[serde(alias = "clientSecret")]
    pub client_secret: String,
    #[serde(alias = "paymentIntentId")]
    pub payment_intent_id: PaymentIntentId,
}

/// Everything the card confirmation step needs, carried across the pause
/// between order placement and card entry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PaymentSession {
    pub publishable_key: String,
    pub client_secret: String,
    pub intent_id: PaymentIntentId,
    pub order_id: OrderId,
    pub order_number: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_payment_config_accepts_camel_case() {
        let json = r#"{"publishableKey": "pk_test_abc", "mode": "test"}"#;
        let config: PaymentConfig = serde_json::from_str(json).expect("deserialize");
        assert_eq!(config.publishable_key, "pk_test_abc");
    }

    #[test]
    fn test_payment_intent_accepts_either_casing() {
        let camel = r#"{"clientSecret": "cs_1", "paymentIntentId": "pi_1"}"#;
        let intent: PaymentIntent = serde_json::from_str(camel).expect("deserialize");
        assert_eq!(intent.payment_intent_id.as_str(), "pi_1");

        let snake = r#"{"client_secret": "cs_2", "payment_intent_id": "pi_2"}"#;
        let intent: PaymentIntent = serde_json::from_str(snake).expect("deserialize");
        assert_eq!(intent.client_secret, "cs_2");
    }
}

//! Orders: the creation payload, the stored order, and tracking events.

use buildhive_core::{AddressId, OrderId, OrderStatus, PaymentMethod, PaymentStatus, ProductId};
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::address::Address;

/// Payload for placing an order.
///
/// The wire format mixes conventions: line items are snake_case while the
/// top-level keys are camelCase. Keep both as the backend expects them.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct OrderDraft {
    pub items: Vec<OrderDraftItem>,
    #[serde(rename = "shippingAddressId")]
    pub shipping_address_id: AddressId,
    #[serde(rename = "paymentMethod")]
    pub payment_method: PaymentMethod,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
}

/// One line item in an order creation payload.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct OrderDraftItem {
    pub product_id: ProductId,
    pub quantity: u32,
    pub price: Decimal,
}

/// A placed order as returned by the backend.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Order {
    pub id: OrderId,
    pub order_number: String,
    #[serde(default)]
    pub status: OrderStatus,
    #[serde(default)]
    pub payment_status: PaymentStatus,
    #[serde(default)]
    pub payment_method: PaymentMethod,
    #[serde(default)]
    pub subtotal: Decimal,
    #[serde(default)]
    pub tax_amount: Decimal,
    #[serde(default)]
    pub shipping_amount: Decimal,
    #[serde(default)]
    pub total_amount: Decimal,
    #[serde(default, alias = "order_items")]
    pub items: Vec<OrderItem>,
    #[serde(default)]
    pub shipping_address: Option<Address>,
    #[serde(default)]
    pub notes: Option<String>,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
}

/// One stored line of a placed order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OrderItem {
    #[serde(default)]
    pub id: Option<String>,
    pub product_id: ProductId,
    #[serde(default)]
    pub product_name: Option<String>,
    pub quantity: u32,
    pub price: Decimal,
    #[serde(default)]
    pub subtotal: Option<Decimal>,
}

/// Shipment tracking for an order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderTracking {
    #[serde(default)]
    pub carrier: Option<String>,
    #[serde(default)]
    pub tracking_number: Option<String>,
    #[serde(default)]
    pub estimated_delivery: Option<DateTime<Utc>>,
    #[serde(default)]
    pub events: Vec<TrackingEvent>,
}

/// One step in a shipment's history.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TrackingEvent {
    pub status: String,
    #[serde(default)]
    pub location: Option<String>,
    #[serde(default)]
    pub timestamp: Option<DateTime<Utc>>,
    #[serde(default)]
    pub note: Option<String>,
}

/// Pagination metadata attached to list responses.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PageMeta {
    #[serde(default)]
    pub page: u32,
    #[serde(default, alias = "limit")]
    pub per_page: u32,
    #[serde(default, alias = "totalCount")]
    pub total: u64,
    #[serde(default, alias = "totalPages")]
    pub total_pages: u32,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_order_draft_mixed_casing() {
        let draft = OrderDraft {
            items: vec![OrderDraftItem {
                product_id: ProductId::new("p-1"),
                quantity: 2,
                price: Decimal::from(1250),
            }],
            shipping_address_id: AddressId::new("addr-1"),
            payment_method: PaymentMethod::Cod,
            notes: None,
        };

        let value = serde_json::to_value(&draft).expect("serialize");
        assert_eq!(value["shippingAddressId"], "addr-1");
        assert_eq!(value["paymentMethod"], "cod");
        assert_eq!(value["items"][0]["product_id"], "p-1");
        assert!(value.get("notes").is_none());
    }

    #[test]
    fn test_order_parses_order_items_alias() {
        let json = r#"{
            "id": "o-1",
            "order_number": "BH-1001",
            "status": "pending",
            "order_items": [{"product_id": "p-1", "quantity": 1, "price": "99.50"}]
        }"#;
        let order: Order = serde_json::from_str(json).expect("deserialize");
        assert_eq!(order.items.len(), 1);
        assert_eq!(order.status, OrderStatus::Pending);
    }
}

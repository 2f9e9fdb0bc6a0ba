//! Status enums for various entities.
//!
//! All of these are server-owned: the client reads them off responses and
//! renders them, it never transitions them locally. Serde spellings match
//! the backend's snake_case wire values exactly.

use serde::{Deserialize, Serialize};

/// Order lifecycle status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum OrderStatus {
    PendingPayment,
    #[default]
    Pending,
    Processing,
    Shipped,
    Delivered,
    Cancelled,
}

/// Order payment status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum PaymentStatus {
    #[default]
    Pending,
    Paid,
    Failed,
    Refunded,
}

/// Payment method chosen at checkout.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum PaymentMethod {
    /// Cash on delivery - no charge step.
    #[default]
    Cod,
    /// Card payment via the payment-intent confirmation flow.
    Card,
}

impl PaymentMethod {
    /// The wire value sent in order drafts.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Cod => "cod",
            Self::Card => "card",
        }
    }
}

/// Marketplace account role.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum UserRole {
    #[default]
    Buyer,
    Contractor,
    Supplier,
    Admin,
}

impl UserRole {
    /// The wire value, also used as the persisted jar value.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Buyer => "buyer",
            Self::Contractor => "contractor",
            Self::Supplier => "supplier",
            Self::Admin => "admin",
        }
    }
}

/// Product listing moderation status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum ProductStatus {
    Approved,
    #[default]
    Pending,
    Rejected,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_order_status_wire_spelling() {
        let json = serde_json::to_string(&OrderStatus::PendingPayment).expect("serialize");
        assert_eq!(json, "\"pending_payment\"");

        let back: OrderStatus = serde_json::from_str("\"shipped\"").expect("deserialize");
        assert_eq!(back, OrderStatus::Shipped);
    }

    #[test]
    fn test_payment_method_as_str() {
        assert_eq!(PaymentMethod::Cod.as_str(), "cod");
        assert_eq!(PaymentMethod::Card.as_str(), "card");
    }

    #[test]
    fn test_user_role_round_trip() {
        let back: UserRole = serde_json::from_str("\"contractor\"").expect("deserialize");
        assert_eq!(back, UserRole::Contractor);
    }
}

//! Shipping addresses.
//!
//! The address endpoints are asymmetric: responses come back snake_case,
//! while the create/update payload is camelCase.

use buildhive_core::{AddressId, UserId};
use serde::{Deserialize, Serialize};

/// A saved shipping address as returned by the backend.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Address {
    pub id: AddressId,
    #[serde(default)]
    pub user_id: Option<UserId>,
    pub full_name: String,
    pub address_line1: String,
    #[serde(default)]
    pub address_line2: Option<String>,
    pub city: String,
    #[serde(default)]
    pub state: Option<String>,
    #[serde(default)]
    pub postal_code: Option<String>,
    #[serde(default)]
    pub country: Option<String>,
    #[serde(default)]
    pub phone: Option<String>,
    #[serde(default)]
    pub is_default: bool,
}

/// Payload for creating or replacing an address.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NewAddress {
    pub full_name: String,
    pub address_line1: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub address_line2: Option<String>,
    pub city: String,
    pub state: String,
    pub postal_code: String,
    pub country: String,
    pub phone: String,
    pub is_default: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_address_serializes_camel_case() {
        let payload = NewAddress {
            full_name: "Mason Khan".to_string(),
            address_line1: "12-B Canal Road".to_string(),
            address_line2: None,
            city: "Lahore".to_string(),
            state: "Punjab".to_string(),
            postal_code: "54000".to_string(),
            country: "Pakistan".to_string(),
            phone: "+923001234567".to_string(),
            is_default: false,
        };

        let value = serde_json::to_value(&payload).expect("serialize");
        assert_eq!(value["fullName"], "Mason Khan");
        assert_eq!(value["addressLine1"], "12-B Canal Road");
        assert_eq!(value["postalCode"], "54000");
        assert!(value.get("addressLine2").is_none());
    }

    #[test]
    fn test_address_parses_snake_case_response() {
        let json = r#"{
            "id": "addr-1",
            "full_name": "Mason Khan",
            "address_line1": "12-B Canal Road",
            "city": "Lahore",
            "is_default": true
        }"#;
        let address: Address = serde_json::from_str(json).expect("deserialize");
        assert!(address.is_default);
        assert_eq!(address.country, None);
    }
}

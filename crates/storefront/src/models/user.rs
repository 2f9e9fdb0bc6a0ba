//! Authenticated identity as returned by the auth endpoints.

use buildhive_core::{UserId, UserRole};
use serde::{Deserialize, Serialize};

/// The authenticated user's profile.
///
/// Created from a login/register response, replaced wholesale by
/// `refresh_user`, and cleared on logout. Auth endpoints speak camelCase.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Identity {
    pub id: UserId,
    pub email: String,
    pub full_name: String,
    #[serde(default)]
    pub phone: Option<String>,
    #[serde(default)]
    pub role: UserRole,
    #[serde(default)]
    pub email_verified: bool,
    #[serde(default)]
    pub profile_image: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_identity_parses_camel_case() {
        let json = r#"{
            "id": "u-1",
            "email": "mason@example.com",
            "fullName": "Mason Khan",
            "phone": null,
            "role": "buyer",
            "emailVerified": true,
            "profileImage": null
        }"#;

        let identity: Identity = serde_json::from_str(json).expect("deserialize");
        assert_eq!(identity.full_name, "Mason Khan");
        assert_eq!(identity.role, UserRole::Buyer);
        assert!(identity.email_verified);
    }

    #[test]
    fn test_identity_tolerates_missing_optionals() {
        let json = r#"{"id": "u-2", "email": "a@b.c", "fullName": "A"}"#;
        let identity: Identity = serde_json::from_str(json).expect("deserialize");
        assert_eq!(identity.phone, None);
        assert!(!identity.email_verified);
    }
}

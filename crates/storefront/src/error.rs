//! Unified error type for callers driving the whole storefront.
//!
//! The per-module errors ([`crate::api::ApiError`],
//! [`crate::session::SessionError`], [`crate::cart::CartError`],
//! [`crate::checkout::CheckoutError`]) stay precise at the seams;
//! `StorefrontError` folds them into one type with user-presentable
//! messages for front ends that do not care which layer failed.

use thiserror::Error;

use crate::api::ApiError;
use crate::cart::CartError;
use crate::checkout::CheckoutError;
use crate::config::ConfigError;
use crate::session::SessionError;

/// Application-level error type for the storefront.
#[derive(Debug, Error)]
pub enum StorefrontError {
    /// Configuration loading failed.
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// A backend API call failed.
    #[error("{0}")]
    Api(#[from] ApiError),

    /// A session operation failed.
    #[error("{0}")]
    Session(#[from] SessionError),

    /// A cart operation failed.
    #[error("{0}")]
    Cart(#[from] CartError),

    /// A checkout operation failed.
    #[error("{0}")]
    Checkout(#[from] CheckoutError),
}

impl StorefrontError {
    /// Message safe to show a shopper.
    ///
    /// API errors already carry server-provided messages; transport-level
    /// failures are replaced with a generic line instead of leaking
    /// connection details.
    #[must_use]
    pub fn user_message(&self) -> String {
        match self {
            Self::Api(ApiError::Http(_)) => {
                "Could not reach the store. Check your connection and try again.".to_string()
            }
            Self::Api(ApiError::Unauthorized) => "Please sign in to continue.".to_string(),
            Self::Api(e) => e.most_specific_message("Something went wrong. Please try again."),
            other => other.to_string(),
        }
    }
}

/// Result type alias for `StorefrontError`.
pub type Result<T> = std::result::Result<T, StorefrontError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_user_message_for_unauthorized() {
        let err = StorefrontError::Api(ApiError::Unauthorized);
        assert_eq!(err.user_message(), "Please sign in to continue.");
    }

    #[test]
    fn test_user_message_passes_cart_errors_through() {
        let err = StorefrontError::Cart(CartError::SignInRequired);
        assert_eq!(
            err.user_message(),
            "Please sign in to add items to your cart"
        );
    }
}

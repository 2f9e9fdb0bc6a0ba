//! Authentication endpoints.

use serde::Deserialize;
use serde_json::json;
use tracing::instrument;

use crate::models::Identity;

use super::{ApiClient, ApiError};

/// Successful login/register response: the user plus a token pair.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AuthPayload {
    pub user: Identity,
    pub access_token: String,
    #[serde(default)]
    pub refresh_token: Option<String>,
}

/// Client for `/auth` endpoints.
#[derive(Debug, Clone)]
pub struct AuthApi {
    client: ApiClient,
}

impl AuthApi {
    #[must_use]
    pub const fn new(client: ApiClient) -> Self {
        Self { client }
    }

    /// Sign in with email and password.
    ///
    /// # Errors
    ///
    /// Returns an error if the credentials are rejected or the request fails.
    #[instrument(skip(self, password), fields(email = %email))]
    pub async fn login(&self, email: &str, password: &str) -> Result<AuthPayload, ApiError> {
        self.client
            .post("auth/login", &json!({"email": email, "password": password}))
            .await
    }

    /// Register a new account.
    ///
    /// # Errors
    ///
    /// Returns an error if validation fails or the email is taken.
    #[instrument(skip(self, password), fields(email = %email))]
    pub async fn register(
        &self,
        full_name: &str,
        email: &str,
        password: &str,
        phone: Option<&str>,
    ) -> Result<AuthPayload, ApiError> {
        self.client
            .post(
                "auth/register",
                &json!({
                    "fullName": full_name,
                    "email": email,
                    "password": password,
                    "phone": phone,
                }),
            )
            .await
    }

    /// Invalidate the current session server-side.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails.
    #[instrument(skip(self))]
    pub async fn logout(&self) -> Result<(), ApiError> {
        self.client.post_value("auth/logout", &json!({})).await?;
        Ok(())
    }

    /// Fetch the authenticated user's profile.
    ///
    /// # Errors
    ///
    /// Returns an error if the token is missing or expired.
    #[instrument(skip(self))]
    pub async fn me(&self) -> Result<Identity, ApiError> {
        // Some deployments wrap the profile in {"user": ...}, others return
        // it bare.
        let value = self.client.get_value("auth/me").await?;
        let user = value.get("user").cloned().unwrap_or(value);
        Ok(serde_json::from_value(user)?)
    }

    /// Exchange a refresh token for a new token pair.
    ///
    /// # Errors
    ///
    /// Returns an error if the refresh token is invalid.
    #[instrument(skip(self, refresh_token))]
    pub async fn refresh(&self, refresh_token: &str) -> Result<AuthPayload, ApiError> {
        self.client
            .post("auth/refresh", &json!({"refreshToken": refresh_token}))
            .await
    }

    /// Change the signed-in user's password.
    ///
    /// # Errors
    ///
    /// Returns an error if the current password is wrong.
    #[instrument(skip(self, current_password, new_password))]
    pub async fn change_password(
        &self,
        current_password: &str,
        new_password: &str,
    ) -> Result<(), ApiError> {
        self.client
            .put_value(
                "auth/change-password",
                &json!({
                    "currentPassword": current_password,
                    "newPassword": new_password,
                }),
            )
            .await?;
        Ok(())
    }

    /// Request a password reset email.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails.
    #[instrument(skip(self), fields(email = %email))]
    pub async fn forgot_password(&self, email: &str) -> Result<(), ApiError> {
        self.client
            .post_value("auth/forgot-password", &json!({"email": email}))
            .await?;
        Ok(())
    }

    /// Complete a password reset with the emailed token.
    ///
    /// # Errors
    ///
    /// Returns an error if the token is invalid or expired.
    #[instrument(skip(self, token, new_password))]
    pub async fn reset_password(&self, token: &str, new_password: &str) -> Result<(), ApiError> {
        self.client
            .post_value(
                "auth/reset-password",
                &json!({"token": token, "newPassword": new_password}),
            )
            .await?;
        Ok(())
    }
}

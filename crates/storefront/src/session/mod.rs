//! Authenticated session management.
//!
//! The [`SessionManager`] owns the client-side identity mirror: it signs
//! users in and out, persists the token pair in a [`store::SessionStore`]
//! jar, rehydrates on startup, and force-signs-out when any API call comes
//! back 401 (wired through the client's unauthorized hook).

pub mod store;

use std::sync::{Arc, RwLock, Weak};

use secrecy::SecretString;
use thiserror::Error;
use tracing::{debug, info, instrument, warn};

use buildhive_core::UserId;

use crate::api::{ApiClient, ApiError, AuthApi, AuthPayload};
use crate::models::Identity;

use store::{Entry, SessionStore, keys};

/// Backend rule, enforced client-side before the request goes out.
pub const MIN_PASSWORD_LENGTH: usize = 8;

/// Errors that can occur during session operations.
#[derive(Debug, Error)]
pub enum SessionError {
    /// Registration passwords do not match.
    #[error("Passwords do not match")]
    PasswordMismatch,

    /// Password is shorter than the backend accepts.
    #[error("Password must be at least {MIN_PASSWORD_LENGTH} characters")]
    WeakPassword,

    /// The backend rejected the operation.
    #[error(transparent)]
    Api(#[from] ApiError),
}

/// Read-only view of the authentication state.
///
/// The cart and checkout layers depend on this instead of the full
/// [`SessionManager`] so they can be tested with a stub.
pub trait IdentitySource: Send + Sync {
    fn is_authenticated(&self) -> bool;
    fn current_user(&self) -> Option<Identity>;
}

// =============================================================================
// SessionManager
// =============================================================================

/// Holds the signed-in identity and keeps the API client's bearer token,
/// the persisted jar, and the in-memory mirror in sync.
pub struct SessionManager {
    api: ApiClient,
    auth: AuthApi,
    store: Arc<dyn SessionStore>,
    identity: RwLock<Option<Identity>>,
}

impl SessionManager {
    /// Create a manager and register it as the client's 401 handler.
    ///
    /// Any request that comes back unauthorized clears the session, so
    /// stale tokens cannot wedge the app in a half-signed-in state.
    #[must_use]
    pub fn new(api: ApiClient, store: Arc<dyn SessionStore>) -> Arc<Self> {
        let manager = Arc::new(Self {
            auth: AuthApi::new(api.clone()),
            api,
            store,
            identity: RwLock::new(None),
        });

        let weak: Weak<Self> = Arc::downgrade(&manager);
        manager.api.set_unauthorized_hook(move || {
            if let Some(manager) = weak.upgrade() {
                warn!("received 401, clearing session");
                manager.force_sign_out();
            }
        });

        manager
    }

    /// Rehydrate from the jar, then refresh the profile from the backend.
    ///
    /// The persisted identity is kept as-is when the refresh fails, so a
    /// flaky network does not sign the user out on startup.
    #[instrument(skip(self))]
    pub async fn initialize(&self) {
        let Some(token) = self.store.get(keys::AUTH_TOKEN) else {
            debug!("no persisted session");
            return;
        };
        self.api.set_token(SecretString::from(token.value));

        if let Some(entry) = self.store.get(keys::USER_DATA) {
            match serde_json::from_str::<Identity>(&entry.value) {
                Ok(identity) => self.set_identity(Some(identity)),
                Err(e) => warn!(error = %e, "persisted user data is corrupt"),
            }
        }

        if let Err(e) = self.refresh_user().await {
            warn!(error = %e, "could not refresh profile, keeping persisted identity");
        }
    }

    /// Sign in with email and password.
    ///
    /// # Errors
    ///
    /// Returns an error if the credentials are rejected or the request
    /// fails.
    #[instrument(skip(self, password), fields(email = %email))]
    pub async fn login(&self, email: &str, password: &str) -> Result<Identity, SessionError> {
        let payload = self.auth.login(email, password).await?;
        self.establish(payload)
    }

    /// Register a new account and sign in.
    ///
    /// Password rules are checked before any network call.
    ///
    /// # Errors
    ///
    /// Returns an error if the passwords do not match, the password is too
    /// short, or the backend rejects the registration.
    #[instrument(skip(self, password, confirm_password), fields(email = %email))]
    pub async fn register(
        &self,
        full_name: &str,
        email: &str,
        password: &str,
        confirm_password: &str,
        phone: Option<&str>,
    ) -> Result<Identity, SessionError> {
        if password != confirm_password {
            return Err(SessionError::PasswordMismatch);
        }
        if password.len() < MIN_PASSWORD_LENGTH {
            return Err(SessionError::WeakPassword);
        }

        let payload = self.auth.register(full_name, email, password, phone).await?;
        self.establish(payload)
    }

    /// Sign out.
    ///
    /// The server-side logout is best-effort; local state is cleared
    /// unconditionally so the user is never stuck signed in.
    #[instrument(skip(self))]
    pub async fn logout(&self) {
        if let Err(e) = self.auth.logout().await {
            debug!(error = %e, "server-side logout failed, clearing locally anyway");
        }
        self.force_sign_out();
        info!("signed out");
    }

    /// Re-fetch the profile from the backend.
    ///
    /// On failure the last known identity is kept.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails.
    pub async fn refresh_user(&self) -> Result<Identity, SessionError> {
        let identity = self.auth.me().await?;
        self.persist_identity(&identity);
        self.set_identity(Some(identity.clone()));
        Ok(identity)
    }

    /// Change the signed-in user's password.
    ///
    /// # Errors
    ///
    /// Returns an error if the new password is too short or the current
    /// password is wrong.
    pub async fn change_password(
        &self,
        current_password: &str,
        new_password: &str,
    ) -> Result<(), SessionError> {
        if new_password.len() < MIN_PASSWORD_LENGTH {
            return Err(SessionError::WeakPassword);
        }
        self.auth
            .change_password(current_password, new_password)
            .await?;
        Ok(())
    }

    /// The signed-in user's id, if any.
    #[must_use]
    pub fn user_id(&self) -> Option<UserId> {
        self.current_user().map(|identity| identity.id)
    }

    /// Clear the token, jar, and identity mirror without a network call.
    pub fn force_sign_out(&self) {
        self.api.clear_token();
        self.store.clear();
        self.set_identity(None);
    }

    /// Install tokens and identity from a successful auth response.
    fn establish(&self, payload: AuthPayload) -> Result<Identity, SessionError> {
        self.api
            .set_token(SecretString::from(payload.access_token.clone()));

        self.store
            .set(keys::AUTH_TOKEN, Entry::new(payload.access_token));
        if let Some(refresh) = payload.refresh_token {
            self.store.set(keys::REFRESH_TOKEN, Entry::new(refresh));
        }
        self.store
            .set(keys::USER_ID, Entry::new(payload.user.id.as_str()));
        self.store
            .set(keys::USER_ROLE, Entry::new(payload.user.role.as_str()));
        self.persist_identity(&payload.user);

        self.set_identity(Some(payload.user.clone()));
        info!(user_id = %payload.user.id, "signed in");
        Ok(payload.user)
    }

    fn persist_identity(&self, identity: &Identity) {
        match serde_json::to_string(identity) {
            Ok(json) => self.store.set(keys::USER_DATA, Entry::new(json)),
            Err(e) => warn!(error = %e, "failed to serialize identity for the jar"),
        }
    }

    fn set_identity(&self, identity: Option<Identity>) {
        if let Ok(mut guard) = self.identity.write() {
            *guard = identity;
        }
    }
}

impl IdentitySource for SessionManager {
    fn is_authenticated(&self) -> bool {
        self.identity
            .read()
            .map(|guard| guard.is_some())
            .unwrap_or(false)
    }

    fn current_user(&self) -> Option<Identity> {
        self.identity.read().ok().and_then(|guard| guard.clone())
    }
}

impl std::fmt::Debug for SessionManager {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SessionManager")
            .field("authenticated", &self.is_authenticated())
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_password_mismatch_message() {
        assert_eq!(
            SessionError::PasswordMismatch.to_string(),
            "Passwords do not match"
        );
    }

    #[test]
    fn test_weak_password_message_names_minimum() {
        assert_eq!(
            SessionError::WeakPassword.to_string(),
            "Password must be at least 8 characters"
        );
    }
}

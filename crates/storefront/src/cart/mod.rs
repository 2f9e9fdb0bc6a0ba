//! Server-reconciled cart mirror.
//!
//! The backend owns the cart; [`CartSynchronizer`] keeps a local mirror of
//! the lines for instant rendering and reconciles every mutation against
//! the server. Quantity updates are optimistic: the mirror changes first
//! and is rolled back to the pre-change snapshot if the request fails.

use std::sync::{Arc, Mutex};

use buildhive_core::{CartLineId, Money};
use thiserror::Error;
use tracing::{debug, instrument, warn};

use crate::api::ApiError;
use crate::models::{CartLine, Product, ProductSnapshot};
use crate::session::IdentitySource;

/// Errors surfaced by cart operations.
#[derive(Debug, Error)]
pub enum CartError {
    /// The user must sign in before mutating the cart.
    #[error("Please sign in to add items to your cart")]
    SignInRequired,

    /// The backend rejected the operation.
    #[error(transparent)]
    Api(#[from] ApiError),
}

/// The cart operations the synchronizer needs from the backend.
///
/// Implemented by [`crate::api::CartApi`] in production and by a recording
/// fake in tests.
#[allow(async_fn_in_trait)]
pub trait CartGateway: Send + Sync {
    async fn fetch(&self) -> Result<Vec<CartLine>, ApiError>;
    async fn add(&self, product_id: &str, quantity: u32) -> Result<CartLine, ApiError>;
    async fn update_quantity(&self, line_id: &CartLineId, quantity: u32) -> Result<(), ApiError>;
    async fn remove(&self, line_id: &CartLineId) -> Result<(), ApiError>;
    async fn clear(&self) -> Result<(), ApiError>;
}

impl<G: CartGateway> CartGateway for Arc<G> {
    async fn fetch(&self) -> Result<Vec<CartLine>, ApiError> {
        self.as_ref().fetch().await
    }

    async fn add(&self, product_id: &str, quantity: u32) -> Result<CartLine, ApiError> {
        self.as_ref().add(product_id, quantity).await
    }

    async fn update_quantity(&self, line_id: &CartLineId, quantity: u32) -> Result<(), ApiError> {
        self.as_ref().update_quantity(line_id, quantity).await
    }

    async fn remove(&self, line_id: &CartLineId) -> Result<(), ApiError> {
        self.as_ref().remove(line_id).await
    }

    async fn clear(&self) -> Result<(), ApiError> {
        self.as_ref().clear().await
    }
}

// =============================================================================
// CartSynchronizer
// =============================================================================

/// Local mirror of the server-side cart.
pub struct CartSynchronizer<G: CartGateway> {
    gateway: G,
    identity: Arc<dyn IdentitySource>,
    lines: Mutex<Vec<CartLine>>,
}

impl<G: CartGateway> CartSynchronizer<G> {
    #[must_use]
    pub fn new(gateway: G, identity: Arc<dyn IdentitySource>) -> Self {
        Self {
            gateway,
            identity,
            lines: Mutex::new(Vec::new()),
        }
    }

    /// Snapshot of the mirrored lines.
    #[must_use]
    pub fn lines(&self) -> Vec<CartLine> {
        self.lines.lock().map(|lines| lines.clone()).unwrap_or_default()
    }

    /// Total units across all lines.
    #[must_use]
    pub fn total_quantity(&self) -> u32 {
        self.lines
            .lock()
            .map(|lines| lines.iter().map(|l| l.quantity).sum())
            .unwrap_or(0)
    }

    /// Sum of line totals; lines missing their product join count as zero.
    #[must_use]
    pub fn subtotal(&self) -> Money {
        self.lines
            .lock()
            .map(|lines| {
                lines
                    .iter()
                    .fold(Money::zero_pkr(), |acc, line| acc.plus(&line.line_total()))
            })
            .unwrap_or_else(|_| Money::zero_pkr())
    }

    /// Replace the mirror with the server's cart.
    ///
    /// Unauthenticated users have no server cart; the mirror is left
    /// untouched and no request is made.
    ///
    /// # Errors
    ///
    /// Returns an error if the fetch fails; the mirror keeps its previous
    /// contents.
    #[instrument(skip(self))]
    pub async fn refresh(&self) -> Result<(), CartError> {
        if !self.identity.is_authenticated() {
            debug!("skipping cart refresh while signed out");
            return Ok(());
        }
        let fetched = self.gateway.fetch().await?;
        self.replace_lines(fetched);
        Ok(())
    }

    /// React to a sign-in or sign-out.
    ///
    /// Sign-in pulls the server cart into the mirror. Sign-out leaves the
    /// mirror as-is; the next sign-in overwrites it.
    ///
    /// # Errors
    ///
    /// Returns an error if the post-sign-in fetch fails.
    pub async fn handle_auth_change(&self, signed_in: bool) -> Result<(), CartError> {
        if signed_in {
            self.refresh().await
        } else {
            Ok(())
        }
    }

    /// Add a product to the cart, merging with an existing line.
    ///
    /// One line per product: when the mirror already holds a line for this
    /// product the added amount sums into it locally, ignoring the quantity
    /// in the add response. Some backends echo the request row rather than
    /// the merged total, so the response quantity is only trusted for lines
    /// the mirror has never seen.
    ///
    /// # Errors
    ///
    /// Returns [`CartError::SignInRequired`] when signed out, or the API
    /// error when the request fails.
    #[instrument(skip(self, product), fields(product_id = %product.id, quantity))]
    pub async fn add(&self, product: &Product, quantity: u32) -> Result<(), CartError> {
        if !self.identity.is_authenticated() {
            return Err(CartError::SignInRequired);
        }

        let mut line = self.gateway.add(product.id.as_str(), quantity).await?;
        // Backfill the product join when the add response omits it, so the
        // mirror can render the line without a refetch.
        if line.product.is_none() {
            line.product = Some(ProductSnapshot::from(product));
        }

        if let Ok(mut lines) = self.lines.lock() {
            match lines.iter_mut().find(|l| l.product_id == line.product_id) {
                Some(existing) => existing.quantity += quantity,
                None => lines.push(line),
            }
        }
        Ok(())
    }

    /// Set a line's quantity, optimistically.
    ///
    /// Quantities below one and signed-out callers are silently ignored;
    /// removal goes through [`Self::remove`]. On failure the mirror is
    /// rolled back to its pre-change snapshot.
    ///
    /// # Errors
    ///
    /// Returns the API error when the server rejects the update.
    #[instrument(skip(self), fields(line_id = %line_id, quantity))]
    pub async fn update_quantity(
        &self,
        line_id: &CartLineId,
        quantity: u32,
    ) -> Result<(), CartError> {
        if quantity < 1 || !self.identity.is_authenticated() {
            return Ok(());
        }

        let snapshot = {
            let Ok(mut lines) = self.lines.lock() else {
                return Ok(());
            };
            let snapshot = lines.clone();
            match lines.iter_mut().find(|l| &l.id == line_id) {
                Some(line) => line.quantity = quantity,
                None => return Ok(()),
            }
            snapshot
        };

        if let Err(e) = self.gateway.update_quantity(line_id, quantity).await {
            warn!(error = %e, "quantity update rejected, rolling back");
            self.replace_lines(snapshot);
            return Err(e.into());
        }
        Ok(())
    }

    /// Remove a line, then refetch the whole cart.
    ///
    /// The refetch picks up any server-side side effects (stock clamps,
    /// promotions) that a local splice would miss. Signed-out callers are
    /// silently ignored; there is no server cart to remove from.
    ///
    /// # Errors
    ///
    /// Returns the API error when the delete or refetch fails.
    #[instrument(skip(self), fields(line_id = %line_id))]
    pub async fn remove(&self, line_id: &CartLineId) -> Result<(), CartError> {
        if !self.identity.is_authenticated() {
            return Ok(());
        }
        self.gateway.remove(line_id).await?;
        let fetched = self.gateway.fetch().await?;
        self.replace_lines(fetched);
        Ok(())
    }

    /// Empty the cart after asking `confirm`.
    ///
    /// Returns `Ok(false)` without touching anything when the caller is
    /// signed out or the prompt is declined.
    ///
    /// # Errors
    ///
    /// Returns the API error when the clear request fails; the mirror is
    /// left untouched in that case.
    #[instrument(skip(self, confirm))]
    pub async fn clear_with_prompt(
        &self,
        confirm: impl FnOnce() -> bool,
    ) -> Result<bool, CartError> {
        if !self.identity.is_authenticated() || !confirm() {
            return Ok(false);
        }
        self.gateway.clear().await?;
        self.replace_lines(Vec::new());
        Ok(true)
    }

    /// Empty the mirror after an order consumed the cart.
    ///
    /// The backend already cleared its side during order creation, so this
    /// is local-only and never prompts.
    pub fn clear_after_order(&self) {
        self.replace_lines(Vec::new());
    }

    fn replace_lines(&self, lines: Vec<CartLine>) {
        if let Ok(mut guard) = self.lines.lock() {
            *guard = lines;
        }
    }
}

impl<G: CartGateway> std::fmt::Debug for CartSynchronizer<G> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CartSynchronizer")
            .field("lines", &self.lines())
            .finish_non_exhaustive()
    }
}

//! Checkout and payment orchestration.
//!
//! Placing an order is a small state machine:
//!
//! ```text
//! Form --submit--> Submitting --COD-------------------> Placed
//!                      \--card--> AwaitingCardConfirmation --confirm--> Placed
//! ```
//!
//! Submit validates the form with zero network calls, saves the shipping
//! address, creates the order, and either finishes (cash on delivery) or
//! pauses with a [`PaymentSession`] for the card step. A failed card
//! confirmation keeps the session so the same order and intent can be
//! retried.

use std::sync::{Arc, Mutex};

use buildhive_core::{OrderId, PaymentIntentId, PaymentMethod, UserId};
use rust_decimal::Decimal;
use thiserror::Error;
use tracing::{info, instrument, warn};

use crate::api::{AddressApi, ApiError, OrderApi, PaymentApi};
use crate::cart::{CartGateway, CartSynchronizer};
use crate::models::{
    Address, NewAddress, Order, OrderDraft, OrderDraftItem, PaymentConfig, PaymentIntent,
    PaymentSession,
};
use crate::session::IdentitySource;

/// Flat sales tax applied at checkout.
pub const TAX_RATE: Decimal = Decimal::from_parts(5, 0, 0, false, 2);

const ORDER_FALLBACK_MESSAGE: &str = "Failed to place order. Please try again.";

/// Errors surfaced by checkout operations.
#[derive(Debug, Error)]
pub enum CheckoutError {
    /// The form failed client-side validation.
    #[error("{}", format_field_errors(.0))]
    Invalid(Vec<FormFieldError>),

    /// Nothing in the cart to order.
    #[error("Your cart is empty")]
    EmptyCart,

    /// A cart line is missing its product data or price.
    #[error("Cart data is incomplete. Please refresh the page and try again.")]
    StaleCartLine,

    /// Checkout requires a signed-in user.
    #[error("Please sign in to check out")]
    NotSignedIn,

    /// A submit is already in flight or awaiting card confirmation.
    #[error("An order is already being placed")]
    AlreadySubmitting,

    /// The payment gateway could not be initialized for the card step.
    #[error("Failed to start card payment. Please try again.")]
    CardSetupFailed,

    /// The card widget reported a decline.
    #[error("{0}")]
    CardDeclined(String),

    /// Card confirmation was requested with no payment pending.
    #[error("No payment is awaiting confirmation")]
    NoPendingPayment,

    /// The backend rejected a checkout request.
    #[error("{}", .0.most_specific_message(ORDER_FALLBACK_MESSAGE))]
    Api(#[from] ApiError),
}

/// One client-side validation failure.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FormFieldError {
    pub field: &'static str,
    pub message: &'static str,
}

fn format_field_errors(errors: &[FormFieldError]) -> String {
    if errors.is_empty() {
        return "Invalid checkout form".to_string();
    }
    errors
        .iter()
        .map(|e| e.message)
        .collect::<Vec<_>>()
        .join(", ")
}

// =============================================================================
// Gateways
// =============================================================================

/// The backend operations checkout needs.
///
/// Implemented by [`BackendCheckout`] in production and by a recording
/// fake in tests.
#[allow(async_fn_in_trait)]
pub trait CheckoutGateway: Send + Sync {
    async fn create_address(
        &self,
        user_id: &UserId,
        address: &NewAddress,
    ) -> Result<Address, ApiError>;
    async fn create_order(&self, draft: &OrderDraft) -> Result<Order, ApiError>;
    async fn payment_config(&self) -> Result<PaymentConfig, ApiError>;
    async fn create_payment_intent(&self, order_id: &OrderId) -> Result<PaymentIntent, ApiError>;
    async fn confirm_payment(&self, intent_id: &PaymentIntentId) -> Result<(), ApiError>;
}

impl<G: CheckoutGateway> CheckoutGateway for Arc<G> {
    async fn create_address(
        &self,
        user_id: &UserId,
        address: &NewAddress,
    ) -> Result<Address, ApiError> {
        self.as_ref().create_address(user_id, address).await
    }

    async fn create_order(&self, draft: &OrderDraft) -> Result<Order, ApiError> {
        self.as_ref().create_order(draft).await
    }

    async fn payment_config(&self) -> Result<PaymentConfig, ApiError> {
        self.as_ref().payment_config().await
    }

    async fn create_payment_intent(&self, order_id: &OrderId) -> Result<PaymentIntent, ApiError> {
        self.as_ref().create_payment_intent(order_id).await
    }

    async fn confirm_payment(&self, intent_id: &PaymentIntentId) -> Result<(), ApiError> {
        self.as_ref().confirm_payment(intent_id).await
    }
}

/// The card entry step, abstracted so tests can approve or decline
/// without a real gateway widget.
#[allow(async_fn_in_trait)]
pub trait CardConfirmer: Send + Sync {
    /// Collect card details and confirm against the gateway.
    ///
    /// # Errors
    ///
    /// Returns the decline message when the payment does not go through.
    async fn confirm(&self, session: &PaymentSession) -> Result<(), String>;
}

/// Production [`CheckoutGateway`] backed by the REST clients.
#[derive(Debug, Clone)]
pub struct BackendCheckout {
    addresses: AddressApi,
    orders: OrderApi,
    payments: PaymentApi,
}

impl BackendCheckout {
    #[must_use]
    pub const fn new(addresses: AddressApi, orders: OrderApi, payments: PaymentApi) -> Self {
        Self {
            addresses,
            orders,
            payments,
        }
    }
}

impl CheckoutGateway for BackendCheckout {
    async fn create_address(
        &self,
        user_id: &UserId,
        address: &NewAddress,
    ) -> Result<Address, ApiError> {
        self.addresses.create(user_id, address).await
    }

    async fn create_order(&self, draft: &OrderDraft) -> Result<Order, ApiError> {
        self.orders.create(draft).await
    }

    async fn payment_config(&self) -> Result<PaymentConfig, ApiError> {
        self.payments.config().await
    }

    async fn create_payment_intent(&self, order_id: &OrderId) -> Result<PaymentIntent, ApiError> {
        self.payments.create_intent(order_id).await
    }

    async fn confirm_payment(&self, intent_id: &PaymentIntentId) -> Result<(), ApiError> {
        self.payments.confirm(intent_id).await
    }
}

// =============================================================================
// Form
// =============================================================================

/// Shipping and payment details collected before submit.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CheckoutForm {
    pub full_name: String,
    pub phone: String,
    pub address_line1: String,
    pub address_line2: Option<String>,
    pub city: String,
    pub state: String,
    pub postal_code: String,
    pub country: String,
    pub notes: Option<String>,
    pub payment_method: PaymentMethod,
}

impl Default for CheckoutForm {
    fn default() -> Self {
        Self {
            full_name: String::new(),
            phone: String::new(),
            address_line1: String::new(),
            address_line2: None,
            city: String::new(),
            state: String::new(),
            postal_code: String::new(),
            country: "Pakistan".to_string(),
            notes: None,
            payment_method: PaymentMethod::Cod,
        }
    }
}

impl CheckoutForm {
    /// Validate required fields without touching the network.
    #[must_use]
    pub fn validate(&self) -> Vec<FormFieldError> {
        let mut errors = Vec::new();
        let mut require = |field: &'static str, value: &str, message: &'static str| {
            if value.trim().is_empty() {
                errors.push(FormFieldError { field, message });
            }
        };

        require("full_name", &self.full_name, "Full name is required");
        require("phone", &self.phone, "Phone number is required");
        require("address_line1", &self.address_line1, "Address is required");
        require("city", &self.city, "City is required");
        require("state", &self.state, "State is required");
        require("postal_code", &self.postal_code, "Postal code is required");
        errors
    }

    fn to_new_address(&self) -> NewAddress {
        NewAddress {
            full_name: self.full_name.trim().to_string(),
            address_line1: self.address_line1.trim().to_string(),
            address_line2: self
                .address_line2
                .as_deref()
                .map(str::trim)
                .filter(|s| !s.is_empty())
                .map(str::to_string),
            city: self.city.trim().to_string(),
            state: self.state.trim().to_string(),
            postal_code: self.postal_code.trim().to_string(),
            country: self.country.trim().to_string(),
            phone: self.phone.trim().to_string(),
            is_default: false,
        }
    }
}

// =============================================================================
// Totals
// =============================================================================

/// Display totals for the review step. The backend recomputes these
/// authoritatively at order creation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CheckoutTotals {
    pub subtotal: Decimal,
    pub tax: Decimal,
    pub total: Decimal,
}

impl CheckoutTotals {
    /// Apply the flat tax rate to a cart subtotal.
    #[must_use]
    pub fn from_subtotal(subtotal: Decimal) -> Self {
        let tax = subtotal * TAX_RATE;
        Self {
            subtotal,
            tax,
            total: subtotal + tax,
        }
    }
}

// =============================================================================
// Orchestrator
// =============================================================================

/// Where a checkout attempt currently stands.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum CheckoutState {
    #[default]
    Form,
    Submitting,
    AwaitingCardConfirmation(PaymentSession),
    Placed {
        order_number: String,
    },
}

/// Outcome of a successful submit.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SubmitOutcome {
    /// The order is placed and paid for (or payable on delivery).
    Placed { order_number: String },
    /// The order exists; card entry must finish the payment.
    CardConfirmationRequired(PaymentSession),
}

/// Drives a checkout attempt through the state machine.
pub struct CheckoutOrchestrator<G: CheckoutGateway> {
    gateway: G,
    identity: Arc<dyn IdentitySource>,
    state: Mutex<CheckoutState>,
}

impl<G: CheckoutGateway> CheckoutOrchestrator<G> {
    #[must_use]
    pub fn new(gateway: G, identity: Arc<dyn IdentitySource>) -> Self {
        Self {
            gateway,
            identity,
            state: Mutex::new(CheckoutState::Form),
        }
    }

    /// Current state of the attempt.
    #[must_use]
    pub fn state(&self) -> CheckoutState {
        self.state.lock().map(|s| s.clone()).unwrap_or_default()
    }

    /// Abandon the attempt and return to the form.
    pub fn reset(&self) {
        self.set_state(CheckoutState::Form);
    }

    /// Place an order from the form and the mirrored cart.
    ///
    /// # Errors
    ///
    /// Validation, empty-cart, and stale-line failures are reported before
    /// any network call. Backend failures during address or order creation
    /// return the attempt to the form; a failure while setting up the card
    /// step also returns to the form, with the already-created order left
    /// unpaid server-side.
    #[instrument(skip(self, form, cart), fields(payment_method = form.payment_method.as_str()))]
    pub async fn submit<CG: CartGateway>(
        &self,
        form: &CheckoutForm,
        cart: &CartSynchronizer<CG>,
    ) -> Result<SubmitOutcome, CheckoutError> {
        self.begin_submit()?;

        match self.place_order(form, cart).await {
            Ok(outcome) => Ok(outcome),
            Err(e) => {
                self.set_state(CheckoutState::Form);
                Err(e)
            }
        }
    }

    /// Run the card step for an order awaiting confirmation.
    ///
    /// On decline or backend failure the session is kept so the same
    /// order and intent can be retried.
    ///
    /// # Errors
    ///
    /// Returns [`CheckoutError::NoPendingPayment`] when nothing is
    /// awaiting confirmation, [`CheckoutError::CardDeclined`] on decline,
    /// or the API error when backend verification fails.
    #[instrument(skip(self, confirmer, cart))]
    pub async fn confirm_card<C: CardConfirmer, CG: CartGateway>(
        &self,
        confirmer: &C,
        cart: &CartSynchronizer<CG>,
    ) -> Result<String, CheckoutError> {
        let session = match self.state() {
            CheckoutState::AwaitingCardConfirmation(session) => session,
            _ => return Err(CheckoutError::NoPendingPayment),
        };

        if let Err(decline) = confirmer.confirm(&session).await {
            warn!(order_id = %session.order_id, "card declined");
            return Err(CheckoutError::CardDeclined(decline));
        }

        self.gateway.confirm_payment(&session.intent_id).await?;

        cart.clear_after_order();
        info!(order_number = %session.order_number, "card payment confirmed");
        self.set_state(CheckoutState::Placed {
            order_number: session.order_number.clone(),
        });
        Ok(session.order_number)
    }

    /// Claim the Submitting slot, rejecting re-entrant submits.
    fn begin_submit(&self) -> Result<(), CheckoutError> {
        let Ok(mut state) = self.state.lock() else {
            return Err(CheckoutError::AlreadySubmitting);
        };
        match *state {
            CheckoutState::Form | CheckoutState::Placed { .. } => {
                *state = CheckoutState::Submitting;
                Ok(())
            }
            CheckoutState::Submitting | CheckoutState::AwaitingCardConfirmation(_) => {
                Err(CheckoutError::AlreadySubmitting)
            }
        }
    }

    async fn place_order<CG: CartGateway>(
        &self,
        form: &CheckoutForm,
        cart: &CartSynchronizer<CG>,
    ) -> Result<SubmitOutcome, CheckoutError> {
        let Some(user) = self.identity.current_user() else {
            return Err(CheckoutError::NotSignedIn);
        };

        let errors = form.validate();
        if !errors.is_empty() {
            return Err(CheckoutError::Invalid(errors));
        }

        let lines = cart.lines();
        if lines.is_empty() {
            return Err(CheckoutError::EmptyCart);
        }

        let mut items = Vec::with_capacity(lines.len());
        for line in &lines {
            let price = line
                .product
                .as_ref()
                .map(|p| p.price)
                .filter(|p| !p.is_zero())
                .ok_or(CheckoutError::StaleCartLine)?;
            items.push(OrderDraftItem {
                product_id: line.product_id.clone(),
                quantity: line.quantity,
                price,
            });
        }

        let address = self
            .gateway
            .create_address(&user.id, &form.to_new_address())
            .await?;

        let draft = OrderDraft {
            items,
            shipping_address_id: address.id,
            payment_method: form.payment_method,
            notes: form.notes.clone().filter(|n| !n.trim().is_empty()),
        };
        let order = self.gateway.create_order(&draft).await?;
        info!(order_number = %order.order_number, "order created");

        match form.payment_method {
            PaymentMethod::Cod => {
                cart.clear_after_order();
                self.set_state(CheckoutState::Placed {
                    order_number: order.order_number.clone(),
                });
                Ok(SubmitOutcome::Placed {
                    order_number: order.order_number,
                })
            }
            PaymentMethod::Card => {
                let session = self.start_card_payment(&order).await?;
                self.set_state(CheckoutState::AwaitingCardConfirmation(session.clone()));
                Ok(SubmitOutcome::CardConfirmationRequired(session))
            }
        }
    }

    /// Fetch gateway config and create the payment intent.
    ///
    /// Any failure here maps to [`CheckoutError::CardSetupFailed`]; the
    /// order already exists server-side and stays pending payment.
    async fn start_card_payment(&self, order: &Order) -> Result<PaymentSession, CheckoutError> {
        let config = self.gateway.payment_config().await.map_err(|e| {
            warn!(error = %e, "could not load payment config");
            CheckoutError::CardSetupFailed
        })?;
        let intent = self
            .gateway
            .create_payment_intent(&order.id)
            .await
            .map_err(|e| {
                warn!(error = %e, order_id = %order.id, "could not create payment intent");
                CheckoutError::CardSetupFailed
            })?;

        if config.publishable_key.trim().is_empty() || intent.client_secret.trim().is_empty() {
            warn!(order_id = %order.id, "payment gateway returned unusable data");
            return Err(CheckoutError::CardSetupFailed);
        }

        Ok(PaymentSession {
            publishable_key: config.publishable_key,
            client_secret: intent.client_secret,
            intent_id: intent.payment_intent_id,
            order_id: order.id.clone(),
            order_number: order.order_number.clone(),
        })
    }

    fn set_state(&self, state: CheckoutState) {
        if let Ok(mut guard) = self.state.lock() {
            *guard = state;
        }
    }
}

impl<G: CheckoutGateway> std::fmt::Debug for CheckoutOrchestrator<G> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CheckoutOrchestrator")
            .field("state", &self.state())
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_totals_apply_five_percent_tax() {
        let totals = CheckoutTotals::from_subtotal(Decimal::from(1000));
        assert_eq!(totals.tax, Decimal::from(50));
        assert_eq!(totals.total, Decimal::from(1050));
    }

    #[test]
    fn test_form_defaults_to_pakistan_cod() {
        let form = CheckoutForm::default();
        assert_eq!(form.country, "Pakistan");
        assert_eq!(form.payment_method, PaymentMethod::Cod);
    }

    #[test]
    fn test_validate_reports_all_missing_fields() {
        let form = CheckoutForm {
            full_name: "Mason Khan".to_string(),
            ..CheckoutForm::default()
        };
        let errors = form.validate();
        let fields: Vec<_> = errors.iter().map(|e| e.field).collect();
        assert!(fields.contains(&"phone"));
        assert!(fields.contains(&"address_line1"));
        assert!(!fields.contains(&"full_name"));
    }

    #[test]
    fn test_invalid_error_joins_messages() {
        let err = CheckoutError::Invalid(vec![
            FormFieldError {
                field: "phone",
                message: "Phone number is required",
            },
            FormFieldError {
                field: "city",
                message: "City is required",
            },
        ]);
        assert_eq!(
            err.to_string(),
            "Phone number is required, City is required"
        );
    }

    #[test]
    fn test_api_error_display_prefers_server_detail() {
        let err = CheckoutError::Api(ApiError::Api {
            status: 409,
            message: Some("Product out of stock".to_string()),
            field_errors: Vec::new(),
        });
        assert_eq!(err.to_string(), "Product out of stock");

        let fallback = CheckoutError::Api(ApiError::Unauthorized);
        assert_eq!(fallback.to_string(), "Failed to place order. Please try again.");
    }
}

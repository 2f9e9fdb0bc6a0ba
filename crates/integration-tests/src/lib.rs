//! Test doubles for the storefront's gateway seams.
//!
//! The cart synchronizer and checkout orchestrator talk to the backend
//! only through [`buildhive_storefront::cart::CartGateway`] and
//! [`buildhive_storefront::checkout::CheckoutGateway`]. The recording
//! fakes here implement those traits over in-memory state and keep a call
//! log, so the tests in `tests/` can assert both the observable behavior
//! and the exact requests that went out.

#![cfg_attr(not(test), forbid(unsafe_code))]

use std::sync::Mutex;
use std::sync::atomic::{AtomicBool, Ordering};

use rust_decimal::Decimal;
use uuid::Uuid;

use buildhive_core::{CartLineId, OrderId, PaymentIntentId, ProductId, UserId, UserRole};
use buildhive_storefront::api::ApiError;
use buildhive_storefront::cart::CartGateway;
use buildhive_storefront::checkout::{CardConfirmer, CheckoutGateway};
use buildhive_storefront::models::{
    Address, CartLine, Identity, NewAddress, Order, OrderDraft, PaymentConfig, PaymentIntent,
    PaymentSession, Product, ProductSnapshot,
};
use buildhive_storefront::session::IdentitySource;

// =============================================================================
// Builders
// =============================================================================

/// A minimal catalog product for cart tests.
#[must_use]
pub fn product(id: &str, price: i64, stock: i64) -> Product {
    serde_json::from_value(serde_json::json!({
        "id": id,
        "name": format!("Product {id}"),
        "slug": id,
        "price": price.to_string(),
        "quantity": stock,
        "is_active": true,
    }))
    .expect("product fixture")
}

/// A cart line with its product join populated.
#[must_use]
pub fn cart_line(line_id: &str, product_id: &str, quantity: u32, price: i64) -> CartLine {
    CartLine {
        id: CartLineId::new(line_id),
        user_id: Some(UserId::new("u-test")),
        product_id: ProductId::new(product_id),
        quantity,
        product: Some(ProductSnapshot {
            id: ProductId::new(product_id),
            name: format!("Product {product_id}"),
            slug: Some(product_id.to_string()),
            price: Decimal::from(price),
            compare_at_price: None,
            quantity: 100,
            business_name: None,
            image_url: None,
        }),
    }
}

/// A cart line whose product join is missing, as stale carts have.
#[must_use]
pub fn stale_cart_line(line_id: &str, product_id: &str, quantity: u32) -> CartLine {
    CartLine {
        id: CartLineId::new(line_id),
        user_id: Some(UserId::new("u-test")),
        product_id: ProductId::new(product_id),
        quantity,
        product: None,
    }
}

// =============================================================================
// StubIdentity
// =============================================================================

/// An [`IdentitySource`] the test flips between signed in and out.
pub struct StubIdentity {
    signed_in: AtomicBool,
}

impl StubIdentity {
    #[must_use]
    pub const fn signed_in() -> Self {
        Self {
            signed_in: AtomicBool::new(true),
        }
    }

    #[must_use]
    pub const fn signed_out() -> Self {
        Self {
            signed_in: AtomicBool::new(false),
        }
    }

    pub fn set_signed_in(&self, signed_in: bool) {
        self.signed_in.store(signed_in, Ordering::SeqCst);
    }
}

impl IdentitySource for StubIdentity {
    fn is_authenticated(&self) -> bool {
        self.signed_in.load(Ordering::SeqCst)
    }

    fn current_user(&self) -> Option<Identity> {
        self.is_authenticated().then(|| Identity {
            id: UserId::new("u-test"),
            email: "buyer@example.com".to_string(),
            full_name: "Test Buyer".to_string(),
            phone: None,
            role: UserRole::Buyer,
            email_verified: true,
            profile_image: None,
        })
    }
}

// =============================================================================
// RecordingCartGateway
// =============================================================================

fn server_error() -> ApiError {
    ApiError::Api {
        status: 500,
        message: Some("simulated failure".to_string()),
        field_errors: Vec::new(),
    }
}

/// In-memory cart backend that logs every call.
#[derive(Default)]
pub struct RecordingCartGateway {
    pub calls: Mutex<Vec<String>>,
    pub server_lines: Mutex<Vec<CartLine>>,
    pub fail_update: AtomicBool,
    pub fail_clear: AtomicBool,
}

impl RecordingCartGateway {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with_lines(lines: Vec<CartLine>) -> Self {
        let gateway = Self::default();
        *gateway.server_lines.lock().expect("lock") = lines;
        gateway
    }

    fn record(&self, call: String) {
        self.calls.lock().expect("lock").push(call);
    }

    /// The calls made so far, in order.
    #[must_use]
    pub fn call_log(&self) -> Vec<String> {
        self.calls.lock().expect("lock").clone()
    }
}

impl CartGateway for RecordingCartGateway {
    async fn fetch(&self) -> Result<Vec<CartLine>, ApiError> {
        self.record("fetch".to_string());
        Ok(self.server_lines.lock().expect("lock").clone())
    }

    async fn add(&self, product_id: &str, quantity: u32) -> Result<CartLine, ApiError> {
        self.record(format!("add {product_id} x{quantity}"));
        let mut lines = self.server_lines.lock().expect("lock");
        if let Some(existing) = lines
            .iter_mut()
            .find(|l| l.product_id.as_str() == product_id)
        {
            existing.quantity += quantity;
            // The real endpoint echoes the added row, not the merged
            // total; callers must sum locally.
            let mut echoed = existing.clone();
            echoed.quantity = quantity;
            return Ok(echoed);
        }
        // Like the real endpoint, the created line comes back without its
        // product join; the synchronizer backfills it.
        let line = stale_cart_line(&format!("line-{}", Uuid::new_v4()), product_id, quantity);
        lines.push(line.clone());
        Ok(line)
    }

    async fn update_quantity(&self, line_id: &CartLineId, quantity: u32) -> Result<(), ApiError> {
        self.record(format!("update {line_id} -> {quantity}"));
        if self.fail_update.load(Ordering::SeqCst) {
            return Err(server_error());
        }
        let mut lines = self.server_lines.lock().expect("lock");
        if let Some(line) = lines.iter_mut().find(|l| &l.id == line_id) {
            line.quantity = quantity;
        }
        Ok(())
    }

    async fn remove(&self, line_id: &CartLineId) -> Result<(), ApiError> {
        self.record(format!("remove {line_id}"));
        self.server_lines
            .lock()
            .expect("lock")
            .retain(|l| &l.id != line_id);
        Ok(())
    }

    async fn clear(&self) -> Result<(), ApiError> {
        self.record("clear".to_string());
        if self.fail_clear.load(Ordering::SeqCst) {
            return Err(server_error());
        }
        self.server_lines.lock().expect("lock").clear();
        Ok(())
    }
}

// =============================================================================
// RecordingCheckoutGateway
// =============================================================================

/// In-memory checkout backend that logs every call and can be told to
/// fail at each step.
#[derive(Default)]
pub struct RecordingCheckoutGateway {
    pub calls: Mutex<Vec<String>>,
    pub fail_create_order: AtomicBool,
    pub fail_intent: AtomicBool,
    pub fail_confirm: AtomicBool,
    pub order_error_message: Mutex<Option<String>>,
}

impl RecordingCheckoutGateway {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    fn record(&self, call: String) {
        self.calls.lock().expect("lock").push(call);
    }

    /// The calls made so far, in order.
    #[must_use]
    pub fn call_log(&self) -> Vec<String> {
        self.calls.lock().expect("lock").clone()
    }
}

impl CheckoutGateway for RecordingCheckoutGateway {
    async fn create_address(
        &self,
        user_id: &UserId,
        address: &NewAddress,
    ) -> Result<Address, ApiError> {
        self.record(format!("create_address {user_id}"));
        Ok(serde_json::from_value(serde_json::json!({
            "id": "addr-test",
            "user_id": user_id,
            "full_name": address.full_name,
            "address_line1": address.address_line1,
            "city": address.city,
            "is_default": address.is_default,
        }))
        .expect("address fixture"))
    }

    async fn create_order(&self, draft: &OrderDraft) -> Result<Order, ApiError> {
        self.record(format!(
            "create_order {} lines via {}",
            draft.items.len(),
            draft.payment_method.as_str()
        ));
        if self.fail_create_order.load(Ordering::SeqCst) {
            let message = self.order_error_message.lock().expect("lock").clone();
            return Err(ApiError::Api {
                status: 400,
                message,
                field_errors: Vec::new(),
            });
        }
        Ok(serde_json::from_value(serde_json::json!({
            "id": "o-test",
            "order_number": "BH-1001",
            "status": "pending",
            "payment_method": draft.payment_method,
        }))
        .expect("order fixture"))
    }

    async fn payment_config(&self) -> Result<PaymentConfig, ApiError> {
        self.record("payment_config".to_string());
        Ok(PaymentConfig {
            publishable_key: "pk_test_fixture".to_string(),
            mode: Some("test".to_string()),
        })
    }

    async fn create_payment_intent(&self, order_id: &OrderId) -> Result<PaymentIntent, ApiError> {
        self.record(format!("create_intent {order_id}"));
        if self.fail_intent.load(Ordering::SeqCst) {
            return Err(server_error());
        }
        Ok(PaymentIntent {
            client_secret: "cs_test_fixture".to_string(),
            payment_intent_id: PaymentIntentId::new("pi_test"),
        })
    }

    async fn confirm_payment(&self, intent_id: &PaymentIntentId) -> Result<(), ApiError> {
        self.record(format!("confirm_payment {intent_id}"));
        if self.fail_confirm.load(Ordering::SeqCst) {
            return Err(server_error());
        }
        Ok(())
    }
}

// =============================================================================
// Card confirmers
// =============================================================================

/// Card step that always succeeds.
pub struct ApprovingCard;

impl CardConfirmer for ApprovingCard {
    async fn confirm(&self, _session: &PaymentSession) -> Result<(), String> {
        Ok(())
    }
}

/// Card step that declines with a fixed message.
pub struct DecliningCard(pub &'static str);

impl CardConfirmer for DecliningCard {
    async fn confirm(&self, _session: &PaymentSession) -> Result<(), String> {
        Err(self.0.to_string())
    }
}

/// A filled-in checkout form that passes validation.
#[must_use]
pub fn valid_form() -> buildhive_storefront::checkout::CheckoutForm {
    buildhive_storefront::checkout::CheckoutForm {
        full_name: "Test Buyer".to_string(),
        phone: "+923001234567".to_string(),
        address_line1: "12-B Canal Road".to_string(),
        address_line2: None,
        city: "Lahore".to_string(),
        state: "Punjab".to_string(),
        postal_code: "54000".to_string(),
        country: "Pakistan".to_string(),
        notes: None,
        payment_method: buildhive_core::PaymentMethod::Cod,
    }
}

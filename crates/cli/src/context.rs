//! Shared wiring for every command: config, session, clients, cart.

use std::sync::Arc;

use buildhive_storefront::api::{
    AddressApi, ApiClient, CartApi, CategoryApi, OrderApi, PaymentApi, ProductApi,
};
use buildhive_storefront::cart::CartSynchronizer;
use buildhive_storefront::checkout::{BackendCheckout, CheckoutOrchestrator};
use buildhive_storefront::config::StorefrontConfig;
use buildhive_storefront::error::Result;
use buildhive_storefront::session::store::FileStore;
use buildhive_storefront::session::SessionManager;

/// Everything a command needs, wired once per invocation.
pub struct AppContext {
    pub session: Arc<SessionManager>,
    pub products: ProductApi,
    pub categories: CategoryApi,
    pub orders: OrderApi,
    pub cart: CartSynchronizer<CartApi>,
    pub checkout: CheckoutOrchestrator<BackendCheckout>,
}

impl AppContext {
    /// Load configuration, rehydrate the persisted session, and build the
    /// clients.
    ///
    /// # Errors
    ///
    /// Returns an error if configuration is missing or the HTTP client
    /// cannot be built.
    pub async fn init() -> Result<Self> {
        let config = StorefrontConfig::from_env()?;
        let api = ApiClient::new(config.api_base_url.clone(), config.http_timeout)?;

        let store = Arc::new(FileStore::open(config.session_file.clone()));
        let session = SessionManager::new(api.clone(), store);
        session.initialize().await;

        let identity: Arc<SessionManager> = Arc::clone(&session);
        let cart = CartSynchronizer::new(CartApi::new(api.clone()), identity.clone());
        let checkout = CheckoutOrchestrator::new(
            BackendCheckout::new(
                AddressApi::new(api.clone()),
                OrderApi::new(api.clone()),
                PaymentApi::new(api.clone()),
            ),
            identity,
        );

        Ok(Self {
            session,
            products: ProductApi::new(api.clone()),
            categories: CategoryApi::new(api.clone()),
            orders: OrderApi::new(api),
            cart,
            checkout,
        })
    }
}

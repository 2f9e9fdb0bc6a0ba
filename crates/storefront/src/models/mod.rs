//! Domain models exchanged with the backend API.
//!
//! Field spellings mirror the wire format: catalog/cart/order resources use
//! snake_case, while auth responses and a handful of request payloads use
//! camelCase. Known shape variants are tolerated with `#[serde(alias)]` so
//! the tolerance lives here at the boundary instead of leaking into the
//! cart/checkout logic.

pub mod address;
pub mod cart;
pub mod catalog;
pub mod order;
pub mod payment;
pub mod user;

pub use address::{Address, NewAddress};
pub use cart::{CartLine, CartSummary, ProductSnapshot};
pub use catalog::{Category, Product, ProductImage, ProductPage};
pub use order::{Order, OrderDraft, OrderDraftItem, OrderItem, OrderTracking, PageMeta};
pub use payment::{PaymentConfig, PaymentIntent, PaymentSession};
pub use user::Identity;

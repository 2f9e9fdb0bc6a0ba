//! BuildHive Storefront library.
//!
//! The customer-facing half of the BuildHive construction-materials
//! marketplace: typed REST clients over the backend API, an authenticated
//! session holder with cookie-style persistence, a server-reconciled cart
//! mirror, and the checkout/payment orchestration.
//!
//! # Architecture
//!
//! - The backend is the source of truth for catalog, cart, orders, and
//!   payments; this crate composes REST calls and holds the client-side
//!   mirrors (identity, cart lines).
//! - The cart synchronizer and checkout orchestrator depend on narrow trait
//!   seams ([`cart::CartGateway`], [`checkout::CheckoutGateway`],
//!   [`session::IdentitySource`]) so the reconciliation logic is testable
//!   without HTTP.
//! - Catalog reads are cached in-memory via `moka` (5 minute TTL); mutable
//!   cart state is never cached.

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod api;
pub mod cart;
pub mod checkout;
pub mod config;
pub mod error;
pub mod models;
pub mod session;

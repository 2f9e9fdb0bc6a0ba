//! BuildHive Core - Shared types library.
//!
//! This crate provides common types used across all BuildHive components:
//! - `storefront` - Customer-facing storefront library
//! - `cli` - Command-line presentation layer
//!
//! # Architecture
//!
//! The core crate contains only types - no I/O, no HTTP clients. The backend
//! assigns every entity ID, so IDs here are opaque string newtypes rather
//! than locally generated values.
//!
//! # Modules
//!
//! - [`types`] - Newtype wrappers for type-safe IDs, money, and statuses

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod types;

pub use types::*;

//! Command implementations, one module per command group.

pub mod cart;
pub mod catalog;
pub mod checkout;
pub mod orders;
pub mod session;

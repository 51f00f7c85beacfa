//! Canteen
//!
//! Canteen is the ordering core of a campus canteen: a cart ledger priced against
//! a menu snapshot, and a two-phase checkout that places the order before taking
//! payment.

pub mod backends;
pub mod cart;
pub mod catalog;
pub mod checkout;
pub mod config;
pub mod orders;
pub mod payments;
pub mod prelude;
pub mod pricing;
pub mod receipt;
pub mod session;

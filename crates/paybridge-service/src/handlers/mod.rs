//! API handlers.

pub mod checkout;
pub mod health;
pub mod webhooks;

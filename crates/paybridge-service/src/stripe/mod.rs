//! Stripe integration.
//!
//! Stripe handles:
//! - Hosted Checkout sessions for subscriptions
//! - Signed webhook deliveries for billing lifecycle events

pub mod client;
pub mod types;

pub use client::{StripeClient, StripeError, API_VERSION, DEFAULT_BASE_URL};
pub use types::*;

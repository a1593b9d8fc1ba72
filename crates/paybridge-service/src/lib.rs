//! Paybridge HTTP API Service.
//!
//! This crate bridges a frontend to Stripe subscriptions:
//!
//! - `POST /create-checkout-session` - resolve a tier and open a hosted checkout
//! - `POST /webhook` - verify and dispatch Stripe event notifications
//! - `GET /health` - liveness probe
//!
//! # Provider boundary
//!
//! All Stripe traffic goes through the [`BillingProvider`] trait so the
//! handlers can be exercised against a fake without network access.

#![forbid(unsafe_code)]
#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::missing_errors_doc)] // Axum handlers all return Result

pub mod checkout;
pub mod config;
pub mod dispatch;
pub mod error;
pub mod handlers;
pub mod provider;
pub mod routes;
pub mod state;
pub mod stripe;

pub use checkout::{CheckoutInitiator, CheckoutMode, CheckoutSessionRequest, LineItem};
pub use config::{ConfigError, ServiceConfig};
pub use dispatch::{Ack, EventDispatcher};
pub use error::ApiError;
pub use provider::BillingProvider;
pub use routes::create_router;
pub use state::AppState;
pub use stripe::{CheckoutSession, StripeClient, StripeError};

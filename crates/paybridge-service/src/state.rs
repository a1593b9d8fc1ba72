//! Application state.

use std::sync::Arc;
use std::time::Duration;

use crate::checkout::CheckoutInitiator;
use crate::config::ServiceConfig;
use crate::dispatch::EventDispatcher;
use crate::provider::BillingProvider;
use crate::stripe::{StripeClient, StripeError};

/// Application state shared across handlers.
///
/// Nothing in here is mutated after startup.
#[derive(Clone)]
pub struct AppState {
    /// Service configuration.
    pub config: ServiceConfig,

    /// Billing provider (Stripe in production).
    pub provider: Arc<dyn BillingProvider>,

    /// Checkout session initiator.
    pub checkout: CheckoutInitiator,

    /// Webhook event dispatcher.
    pub dispatcher: EventDispatcher,
}

impl AppState {
    /// Create application state backed by the real Stripe API.
    pub fn new(config: ServiceConfig) -> Result<Self, StripeError> {
        let stripe = StripeClient::new(
            config.stripe_secret_key.clone(),
            config.stripe_webhook_secret.clone(),
            Duration::from_secs(config.provider_timeout_seconds),
        )?
        .with_base_url(config.stripe_api_base.clone())
        .with_tolerance(config.webhook_tolerance_seconds);

        tracing::info!(
            base_url = %config.stripe_api_base,
            tiers = ?config.prices.tiers().collect::<Vec<_>>(),
            variant = ?config.checkout_variant,
            "Stripe integration enabled"
        );

        Ok(Self::with_provider(config, Arc::new(stripe)))
    }

    /// Create application state around any provider implementation.
    #[must_use]
    pub fn with_provider(config: ServiceConfig, provider: Arc<dyn BillingProvider>) -> Self {
        let checkout = CheckoutInitiator::new(
            Arc::clone(&provider),
            &config.frontend_url,
            Duration::from_secs(config.provider_timeout_seconds),
        );

        Self {
            config,
            provider,
            checkout,
            dispatcher: EventDispatcher::new(),
        }
    }
}

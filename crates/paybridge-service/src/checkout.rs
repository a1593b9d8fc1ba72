//! Checkout session construction and initiation.

use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use serde::Serialize;

use paybridge_core::{BillingError, PriceId};

use crate::provider::BillingProvider;
use crate::stripe::CheckoutSession;

/// Placeholder Stripe replaces with the session id in the success URL.
pub const SESSION_ID_PLACEHOLDER: &str = "{CHECKOUT_SESSION_ID}";

/// Checkout session mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum CheckoutMode {
    /// Recurring subscription.
    Subscription,
}

impl CheckoutMode {
    /// Wire value.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Subscription => "subscription",
        }
    }
}

impl fmt::Display for CheckoutMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A single checkout line item referencing an existing price.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LineItem {
    /// Provider price id.
    pub price: PriceId,
    /// Quantity.
    pub quantity: u32,
}

/// Parameters for a hosted checkout session.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CheckoutSessionRequest {
    /// Session mode.
    pub mode: CheckoutMode,
    /// Allowed payment method types.
    pub payment_method_types: Vec<String>,
    /// Items being purchased.
    pub line_items: Vec<LineItem>,
    /// Redirect target after payment; contains [`SESSION_ID_PLACEHOLDER`].
    pub success_url: String,
    /// Redirect target when the user backs out.
    pub cancel_url: String,
}

impl CheckoutSessionRequest {
    /// Card-only subscription for one unit of `price`.
    #[must_use]
    pub fn subscription(price: PriceId, frontend_url: &str) -> Self {
        let base = frontend_url.trim_end_matches('/');
        Self {
            mode: CheckoutMode::Subscription,
            payment_method_types: vec!["card".to_string()],
            line_items: vec![LineItem { price, quantity: 1 }],
            success_url: format!(
                "{base}/success?session_id={placeholder}",
                placeholder = SESSION_ID_PLACEHOLDER
            ),
            cancel_url: format!("{base}/cancel"),
        }
    }

    /// Flatten into Stripe's bracketed form encoding.
    #[must_use]
    pub fn to_form_params(&self) -> Vec<(String, String)> {
        let mut params = vec![
            ("mode".to_string(), self.mode.to_string()),
            ("success_url".to_string(), self.success_url.clone()),
            ("cancel_url".to_string(), self.cancel_url.clone()),
        ];
        for (i, method) in self.payment_method_types.iter().enumerate() {
            params.push((format!("payment_method_types[{i}]"), method.clone()));
        }
        for (i, item) in self.line_items.iter().enumerate() {
            params.push((format!("line_items[{i}][price]"), item.price.to_string()));
            params.push((format!("line_items[{i}][quantity]"), item.quantity.to_string()));
        }
        params
    }
}

/// Opens checkout sessions through a [`BillingProvider`].
#[derive(Clone)]
pub struct CheckoutInitiator {
    provider: Arc<dyn BillingProvider>,
    frontend_url: String,
    timeout: Duration,
}

impl CheckoutInitiator {
    /// Create an initiator redirecting back to `frontend_url`.
    #[must_use]
    pub fn new(provider: Arc<dyn BillingProvider>, frontend_url: &str, timeout: Duration) -> Self {
        Self {
            provider,
            frontend_url: frontend_url.trim_end_matches('/').to_string(),
            timeout,
        }
    }

    /// Create a subscription checkout session for `price`.
    ///
    /// Each call creates a new provider-side session; callers should not
    /// retry blindly on timeout.
    ///
    /// # Errors
    ///
    /// Returns [`BillingError::ProviderUnavailable`] when the provider call
    /// fails or does not finish within the configured timeout.
    pub async fn create_session(&self, price: PriceId) -> Result<CheckoutSession, BillingError> {
        let request = CheckoutSessionRequest::subscription(price.clone(), &self.frontend_url);

        let outcome = tokio::time::timeout(
            self.timeout,
            self.provider.create_checkout_session(&request),
        )
        .await;

        match outcome {
            Ok(Ok(session)) => {
                tracing::info!(session_id = %session.id, price = %price, "Checkout session created");
                Ok(session)
            }
            Ok(Err(e)) => Err(BillingError::provider(e)),
            Err(_) => Err(BillingError::provider(format!(
                "checkout session request timed out after {}s",
                self.timeout.as_secs()
            ))),
        }
    }
}

impl fmt::Debug for CheckoutInitiator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CheckoutInitiator")
            .field("frontend_url", &self.frontend_url)
            .field("timeout", &self.timeout)
            .finish_non_exhaustive()
    }
}

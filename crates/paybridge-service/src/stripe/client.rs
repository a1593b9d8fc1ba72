//! Stripe API client implementation.

use std::fmt;
use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;

use paybridge_core::{webhook, VerifiedEvent, WebhookError, DEFAULT_TOLERANCE_SECONDS};

use super::types::{CheckoutSession, StripeErrorResponse};
use crate::checkout::CheckoutSessionRequest;
use crate::provider::BillingProvider;

/// Stripe API base URL.
pub const DEFAULT_BASE_URL: &str = "https://api.stripe.com/v1";

/// Pinned Stripe API version.
pub const API_VERSION: &str = "2023-08-16";

/// Error type for Stripe operations.
#[derive(Debug, thiserror::Error)]
pub enum StripeError {
    /// HTTP request failed (connect, timeout, body decode).
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// Stripe API returned an error.
    #[error("Stripe API error ({status}): {error_type} - {message}")]
    Api {
        /// HTTP status code.
        status: u16,
        /// Error type.
        error_type: String,
        /// Error message.
        message: String,
        /// Error code.
        code: Option<String>,
    },

    /// Configuration error.
    #[error("Configuration error: {0}")]
    Configuration(String),
}

/// Stripe API client.
#[derive(Clone)]
pub struct StripeClient {
    client: Client,
    api_key: String,
    webhook_secret: String,
    base_url: String,
    tolerance_seconds: u64,
}

impl StripeClient {
    /// Create a new Stripe client.
    ///
    /// # Arguments
    ///
    /// * `api_key` - Stripe secret API key (`sk_test_...` or `sk_live_...`)
    /// * `webhook_secret` - Webhook signing secret (`whsec_...`)
    /// * `timeout` - Per-request timeout for API calls
    pub fn new(
        api_key: impl Into<String>,
        webhook_secret: impl Into<String>,
        timeout: Duration,
    ) -> Result<Self, StripeError> {
        let api_key = api_key.into();
        let webhook_secret = webhook_secret.into();
        if api_key.is_empty() {
            return Err(StripeError::Configuration("API key is empty".into()));
        }
        if webhook_secret.is_empty() {
            return Err(StripeError::Configuration("webhook secret is empty".into()));
        }

        let client = Client::builder().timeout(timeout).build()?;

        Ok(Self {
            client,
            api_key,
            webhook_secret,
            base_url: DEFAULT_BASE_URL.to_string(),
            tolerance_seconds: DEFAULT_TOLERANCE_SECONDS,
        })
    }

    /// Point the client at a different API host (e.g. a local mock).
    #[must_use]
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into().trim_end_matches('/').to_string();
        self
    }

    /// Set the allowed webhook timestamp skew.
    #[must_use]
    pub fn with_tolerance(mut self, tolerance_seconds: u64) -> Self {
        self.tolerance_seconds = tolerance_seconds;
        self
    }

    /// Handle API response and convert errors.
    async fn handle_response<T: serde::de::DeserializeOwned>(
        response: reqwest::Response,
    ) -> Result<T, StripeError> {
        let status = response.status();

        if status.is_success() {
            return Ok(response.json().await?);
        }

        // Try to parse error response
        let error_body: Result<StripeErrorResponse, _> = response.json().await;

        match error_body {
            Ok(stripe_error) => Err(StripeError::Api {
                status: status.as_u16(),
                error_type: stripe_error.error.error_type,
                message: stripe_error.error.message,
                code: stripe_error.error.code,
            }),
            Err(_) => Err(StripeError::Api {
                status: status.as_u16(),
                error_type: "unknown".to_string(),
                message: format!("HTTP {status}"),
                code: None,
            }),
        }
    }
}

#[async_trait]
impl BillingProvider for StripeClient {
    async fn create_checkout_session(
        &self,
        request: &CheckoutSessionRequest,
    ) -> Result<CheckoutSession, StripeError> {
        let params = request.to_form_params();

        tracing::debug!(
            mode = %request.mode,
            line_items = request.line_items.len(),
            "Creating Stripe checkout session"
        );

        let response = self
            .client
            .post(format!("{}/checkout/sessions", self.base_url))
            .basic_auth(&self.api_key, Option::<&str>::None)
            .header("Stripe-Version", API_VERSION)
            .form(&params)
            .send()
            .await?;

        Self::handle_response(response).await
    }

    fn verify_webhook_signature(
        &self,
        payload: &[u8],
        signature: &str,
    ) -> Result<VerifiedEvent, WebhookError> {
        webhook::verify(payload, signature, &self.webhook_secret, self.tolerance_seconds)
    }
}

impl fmt::Debug for StripeClient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StripeClient")
            .field("base_url", &self.base_url)
            .field("tolerance_seconds", &self.tolerance_seconds)
            .finish_non_exhaustive()
    }
}

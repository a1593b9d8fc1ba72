//! Billing provider boundary.

use async_trait::async_trait;

use paybridge_core::{VerifiedEvent, WebhookError};

use crate::checkout::CheckoutSessionRequest;
use crate::stripe::{CheckoutSession, StripeError};

/// The two provider operations the service depends on.
///
/// [`crate::StripeClient`] is the production implementation. Tests plug in
/// a fake that records checkout requests and signs with a known secret.
#[async_trait]
pub trait BillingProvider: Send + Sync {
    /// Create a hosted checkout session. One network call, not idempotent.
    async fn create_checkout_session(
        &self,
        request: &CheckoutSessionRequest,
    ) -> Result<CheckoutSession, StripeError>;

    /// Check a webhook delivery's signature and decode the event.
    ///
    /// `payload` must be the raw request body.
    fn verify_webhook_signature(
        &self,
        payload: &[u8],
        signature: &str,
    ) -> Result<VerifiedEvent, WebhookError>;
}

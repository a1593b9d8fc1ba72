//! API error types and responses.
//!
//! Response bodies are fixed strings. Causes that may carry provider
//! details are logged here and never echoed to the client.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Serialize;

use paybridge_core::{BillingError, WebhookError};

/// API error type.
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    /// Unknown or unconfigured tier.
    #[error("invalid tier")]
    InvalidTier,

    /// No price identifier in the request.
    #[error("missing price id")]
    MissingPriceId,

    /// Price identifier is not well formed.
    #[error("invalid price id: {0}")]
    InvalidPriceId(String),

    /// The billing provider call failed.
    #[error("provider unavailable: {0}")]
    ProviderUnavailable(String),

    /// Request body exceeds the configured limit.
    #[error("payload too large")]
    PayloadTooLarge,

    /// Webhook delivery failed verification.
    #[error("webhook rejected: {0}")]
    Webhook(#[from] WebhookError),
}

/// JSON error response body.
#[derive(Debug, Serialize)]
struct ErrorResponse {
    error: &'static str,
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            Self::InvalidTier => (StatusCode::BAD_REQUEST, "Invalid tier"),
            Self::MissingPriceId => (StatusCode::BAD_REQUEST, "Missing priceId"),
            Self::InvalidPriceId(reason) => {
                tracing::debug!(reason = %reason, "Rejected malformed price id");
                (StatusCode::BAD_REQUEST, "Invalid priceId")
            }
            Self::PayloadTooLarge => (StatusCode::PAYLOAD_TOO_LARGE, "Payload too large"),
            Self::ProviderUnavailable(cause) => {
                tracing::error!(error = %cause, "Failed to create checkout session");
                (StatusCode::INTERNAL_SERVER_ERROR, "Failed to create session")
            }
            Self::Webhook(e) => {
                tracing::warn!(error = %e, "Webhook signature verification failed");
                return (StatusCode::BAD_REQUEST, format!("Webhook Error: {e}")).into_response();
            }
        };

        (status, Json(ErrorResponse { error: message })).into_response()
    }
}

impl From<BillingError> for ApiError {
    fn from(err: BillingError) -> Self {
        match err {
            BillingError::InvalidTier { .. } => Self::InvalidTier,
            BillingError::MissingPriceId => Self::MissingPriceId,
            BillingError::InvalidId(e) => Self::InvalidPriceId(e.to_string()),
            BillingError::ProviderUnavailable { message } => Self::ProviderUnavailable(message),
        }
    }
}

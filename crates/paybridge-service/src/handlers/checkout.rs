//! Checkout session handler.

use std::sync::Arc;

use axum::extract::rejection::JsonRejection;
use axum::extract::State;
use axum::http::StatusCode;
use axum::Json;
use serde::{Deserialize, Serialize};

use paybridge_core::{CheckoutVariant, SessionId};

use crate::error::ApiError;
use crate::state::AppState;

/// Checkout request body.
///
/// Only the field matching the deployment's [`CheckoutVariant`] is read.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CheckoutRequest {
    /// Tier name (`starter`, `pro`, `enterprise`).
    #[serde(default)]
    pub tier: Option<String>,
    /// Provider price id.
    #[serde(default)]
    pub price_id: Option<String>,
}

impl CheckoutRequest {
    /// The value to resolve under `variant`, empty when absent.
    #[must_use]
    pub fn input(&self, variant: CheckoutVariant) -> &str {
        let field = match variant {
            CheckoutVariant::Tier => &self.tier,
            CheckoutVariant::PriceId => &self.price_id,
        };
        field.as_deref().unwrap_or_default()
    }
}

/// Checkout response body: the session id and nothing else.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CheckoutResponse {
    /// Provider session id for the frontend redirect.
    pub session_id: SessionId,
}

/// Create a hosted subscription checkout session.
///
/// A body that is not valid JSON is treated as one without the expected
/// field, so callers get the same `400` either way. Bodies over the size
/// limit answer `413`.
pub async fn create_checkout_session(
    State(state): State<Arc<AppState>>,
    payload: Result<Json<CheckoutRequest>, JsonRejection>,
) -> Result<Json<CheckoutResponse>, ApiError> {
    let request = match payload {
        Ok(Json(request)) => request,
        Err(rejection) if rejection.status() == StatusCode::PAYLOAD_TOO_LARGE => {
            return Err(ApiError::PayloadTooLarge);
        }
        Err(rejection) => {
            tracing::debug!(error = %rejection, "Unreadable checkout request body");
            CheckoutRequest::default()
        }
    };

    let variant = state.config.checkout_variant;
    let price = state.config.prices.resolve(variant, request.input(variant))?;

    let session = state.checkout.create_session(price).await?;

    Ok(Json(CheckoutResponse {
        session_id: session.id,
    }))
}

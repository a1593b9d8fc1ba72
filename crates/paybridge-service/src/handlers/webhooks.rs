//! Stripe webhook handler.

use std::sync::Arc;

use axum::body::Bytes;
use axum::extract::State;
use axum::http::HeaderMap;
use axum::Json;
use serde::Serialize;

use crate::error::ApiError;
use crate::state::AppState;

/// Header carrying the Stripe signature.
pub const SIGNATURE_HEADER: &str = "stripe-signature";

/// Webhook response.
#[derive(Debug, Serialize)]
pub struct WebhookResponse {
    /// Whether the webhook was accepted.
    pub received: bool,
}

/// Handle Stripe webhooks.
///
/// The body is taken as raw bytes; it is only decoded after the signature
/// check passes. Verification failures answer `400` so Stripe retries.
pub async fn stripe_webhook(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    body: Bytes,
) -> Result<Json<WebhookResponse>, ApiError> {
    let signature = headers
        .get(SIGNATURE_HEADER)
        .and_then(|v| v.to_str().ok())
        .unwrap_or_default();

    let event = state.provider.verify_webhook_signature(&body, signature)?;

    tracing::info!(
        event_id = %event.id(),
        event_type = %event.event_type(),
        livemode = event.livemode(),
        "Received Stripe webhook"
    );

    let ack = state.dispatcher.dispatch(&event);
    tracing::debug!(event_id = %event.id(), ack = ?ack, "Webhook dispatched");

    Ok(Json(WebhookResponse { received: true }))
}

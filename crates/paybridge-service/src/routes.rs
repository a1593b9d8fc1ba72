//! Router configuration.
//!
//! This module sets up the Axum router with all routes and middleware.

use std::sync::Arc;
use std::time::Duration;

use axum::http::{HeaderValue, Method};
use axum::routing::{get, post};
use axum::Router;
use tower_http::cors::{AllowHeaders, AllowOrigin, CorsLayer};
use tower_http::limit::RequestBodyLimitLayer;
use tower_http::timeout::TimeoutLayer;
use tower_http::trace::TraceLayer;

use crate::handlers::{checkout, health, webhooks};
use crate::state::AppState;

/// Create the service router with all routes and middleware.
///
/// # Routes
///
/// - `GET /health` - Health check
/// - `POST /create-checkout-session` - Open a hosted subscription checkout
/// - `POST /webhook` - Stripe webhooks (signature verification)
///
/// Middleware runs outermost first: timeout, body limit, CORS, tracing.
/// All of it sits in front of the handlers' body extractors.
pub fn create_router(state: AppState) -> Router {
    // Extract config values before moving state
    let cors = build_cors_layer(&state.config.cors_origins);
    let max_body_bytes = state.config.max_body_bytes;
    let request_timeout_seconds = state.config.request_timeout_seconds;

    let state = Arc::new(state);

    Router::new()
        .route("/health", get(health::health))
        .route(
            "/create-checkout-session",
            post(checkout::create_checkout_session),
        )
        .route("/webhook", post(webhooks::stripe_webhook))
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .layer(RequestBodyLimitLayer::new(max_body_bytes))
        .layer(TimeoutLayer::new(Duration::from_secs(request_timeout_seconds)))
        .with_state(state)
}

/// Build the CORS layer from configured origins.
///
/// Credentials are allowed, which rules out wildcard origins; a `*` entry
/// is skipped with a warning.
fn build_cors_layer(origins: &[String]) -> CorsLayer {
    let origins: Vec<HeaderValue> = origins
        .iter()
        .filter_map(|o| {
            if o == "*" {
                tracing::warn!("Wildcard CORS origin ignored (credentials are allowed)");
                return None;
            }
            match o.parse() {
                Ok(value) => Some(value),
                Err(_) => {
                    tracing::warn!(origin = %o, "Ignoring invalid CORS origin");
                    None
                }
            }
        })
        .collect();

    CorsLayer::new()
        .allow_origin(AllowOrigin::list(origins))
        .allow_methods([Method::GET, Method::POST])
        .allow_headers(AllowHeaders::mirror_request())
        .allow_credentials(true)
}

//! Liveness probe.
//!
//! Never calls Stripe; it only reports that the process is serving.

use axum::Json;
use serde::Serialize;

/// Health check response.
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    /// Service status.
    pub status: String,
    /// Service name.
    pub service: String,
    /// Service version.
    pub version: String,
}

/// `GET /health`: process is up and serving requests.
pub async fn health() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok".to_string(),
        service: "paybridge".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
    })
}

//! Health and readiness endpoints.

use axum::{Json, extract::State};
use serde::Serialize;

use crate::error::Result;
use crate::state::AppState;

/// Health check response body.
#[derive(Debug, Serialize)]
pub struct HealthBody {
    pub status: &'static str,
}

/// Liveness check.
///
/// GET /health
pub async fn live() -> Json<HealthBody> {
    Json(HealthBody { status: "ok" })
}

/// Readiness check: verifies the document store's data directory is still
/// writable.
///
/// GET /health/ready
///
/// # Errors
///
/// Returns 503 if the data directory cannot be written.
pub async fn ready(State(state): State<AppState>) -> Result<Json<HealthBody>> {
    state.store().ping().await?;
    Ok(Json(HealthBody { status: "ready" }))
}

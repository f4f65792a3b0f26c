//! Customer profile route handlers.

use axum::{
    Json,
    extract::{Path, State},
};

use brightspoke_core::CustomerId;

use crate::error::Result;
use crate::state::AppState;
use crate::store::CustomerProfile;

/// Fetch a customer profile by id.
///
/// GET /customers/{id}
///
/// # Errors
///
/// Returns 404 if no profile has this id.
pub async fn show(
    State(state): State<AppState>,
    Path(id): Path<CustomerId>,
) -> Result<Json<CustomerProfile>> {
    let profile = state.store().customers().get(id).await?;
    Ok(Json(profile))
}

//! Cart route handlers.

use axum::{
    Json,
    extract::{Path, State},
};

use brightspoke_core::CartId;

use crate::error::Result;
use crate::state::AppState;
use crate::store::Cart;

/// Fetch a cart by id.
///
/// GET /carts/{id}
///
/// # Errors
///
/// Returns 404 if no cart has this id.
pub async fn show(State(state): State<AppState>, Path(id): Path<CartId>) -> Result<Json<Cart>> {
    let cart = state.store().carts().get(id).await?;
    Ok(Json(cart))
}

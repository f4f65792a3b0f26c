//! HTTP route handlers for the storefront backend.
//!
//! # Route Structure
//!
//! ```text
//! GET  /health                 - Liveness check
//! GET  /health/ready           - Readiness check (probes the store)
//!
//! # Auth (rate limited)
//! POST /auth/register          - Register a customer (account + profile + cart)
//! POST /auth/login             - Login, minting a session token
//!
//! # Reads
//! GET  /customers/{id}         - Customer profile by id
//! GET  /carts/{id}             - Cart by id
//! ```

pub mod auth;
pub mod carts;
pub mod customers;
pub mod health;

use axum::{
    Router,
    routing::{get, post},
};

use crate::middleware::auth_rate_limiter;
use crate::state::AppState;

/// Create the auth routes router.
pub fn auth_routes() -> Router<AppState> {
    Router::new()
        .route("/register", post(auth::register))
        .route("/login", post(auth::login))
        .layer(auth_rate_limiter())
}

/// Create the customer routes router.
pub fn customer_routes() -> Router<AppState> {
    Router::new().route("/{id}", get(customers::show))
}

/// Create the cart routes router.
pub fn cart_routes() -> Router<AppState> {
    Router::new().route("/{id}", get(carts::show))
}

/// Create all routes for the API.
pub fn routes() -> Router<AppState> {
    Router::new()
        // Health checks
        .route("/health", get(health::live))
        .route("/health/ready", get(health::ready))
        // Auth routes
        .nest("/auth", auth_routes())
        // Read routes
        .nest("/customers", customer_routes())
        .nest("/carts", cart_routes())
}

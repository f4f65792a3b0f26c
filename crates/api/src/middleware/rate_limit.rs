//! Rate limiting middleware using governor and `tower_governor`.
//!
//! Only the authentication endpoints are limited; reads stay unthrottled.

use std::sync::Arc;

use governor::clock::QuantaInstant;
use governor::middleware::NoOpMiddleware;
use tower_governor::{
    GovernorLayer, governor::GovernorConfigBuilder, key_extractor::SmartIpKeyExtractor,
};

/// Rate limiter layer type for Axum.
///
/// `SmartIpKeyExtractor` reads standard proxy headers and falls back to the
/// peer address, so the router must be served with
/// `into_make_service_with_connect_info::<SocketAddr>()`.
pub type RateLimiterLayer =
    GovernorLayer<SmartIpKeyExtractor, NoOpMiddleware<QuantaInstant>, axum::body::Body>;

/// Create rate limiter for auth endpoints: ~30 requests per minute per IP.
///
/// Configuration: 1 token every 2 seconds (replenish), burst of 20. This
/// slows down credential stuffing while leaving room for a frontend that
/// registers or logs in several customers in quick succession.
///
/// # Panics
///
/// This function will not panic. The configuration uses only valid positive
/// integers (`per_second(2)` and `burst_size(20)`), which are always accepted
/// by `GovernorConfigBuilder`.
#[must_use]
pub fn auth_rate_limiter() -> RateLimiterLayer {
    let config = GovernorConfigBuilder::default()
        .key_extractor(SmartIpKeyExtractor)
        .per_second(2) // Replenish 1 token every 2 seconds (~30/minute)
        .burst_size(20) // Allow burst of 20 requests
        .finish()
        .expect("rate limiter config with per_second(2) and burst_size(20) is valid");
    GovernorLayer::new(Arc::new(config))
}

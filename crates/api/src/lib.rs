//! Brightspoke storefront backend library.
//!
//! This crate provides the API as a library so the router can be embedded
//! by the CLI and exercised directly by integration tests.

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod config;
pub mod error;
pub mod middleware;
pub mod routes;
pub mod services;
pub mod state;
pub mod store;

use axum::Router;
use axum::http::{HeaderValue, Method, header};
use tower_http::cors::CorsLayer;
use tower_http::trace::{DefaultOnResponse, OnResponse, TraceLayer};
use tracing::Span;

use crate::config::ApiConfig;
pub use crate::state::AppState;

/// Build the full application router: routes plus tracing, request ID,
/// CORS, and Sentry layers.
///
/// Serve the result with
/// `into_make_service_with_connect_info::<SocketAddr>()` so the rate
/// limiter can fall back to peer addresses.
#[must_use]
pub fn app(state: AppState) -> Router {
    let cors = cors_layer(state.config());

    routes::routes()
        .layer(axum::middleware::from_fn(
            middleware::request_id_middleware,
        ))
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(|request: &axum::http::Request<_>| {
                    tracing::info_span!(
                        "http_request",
                        method = %request.method(),
                        uri = %request.uri(),
                        request_id = tracing::field::Empty,
                        status = tracing::field::Empty,
                        latency_ms = tracing::field::Empty,
                    )
                })
                .on_response(
                    |response: &axum::http::Response<_>,
                     latency: std::time::Duration,
                     span: &Span| {
                        span.record("status", response.status().as_u16());
                        span.record("latency_ms", latency.as_millis() as u64);
                        DefaultOnResponse::default().on_response(response, latency, span);
                    },
                ),
        )
        .with_state(state)
        .layer(cors)
        // Sentry layers (outermost for full request coverage)
        .layer(sentry_tower::NewSentryLayer::new_from_top())
        .layer(sentry_tower::SentryHttpLayer::new().enable_transaction())
}

/// CORS layer for the configured frontend origin.
///
/// With no origin configured (local development) the layer is permissive;
/// with one configured, only that origin may make cross-origin requests.
fn cors_layer(config: &ApiConfig) -> CorsLayer {
    let Some(origin) = config.allowed_origin.as_deref() else {
        return CorsLayer::permissive();
    };

    match HeaderValue::from_str(origin) {
        Ok(origin) => CorsLayer::new()
            .allow_origin(origin)
            .allow_methods([Method::GET, Method::POST])
            .allow_headers([header::CONTENT_TYPE]),
        Err(error) => {
            // Config validation normalizes origins to ASCII, so this only
            // triggers for hand-built configs. Deny rather than open up.
            tracing::warn!(error = %error, "allowed origin is not a valid header value");
            CorsLayer::new()
        }
    }
}

//! Request ID middleware for request tracing and correlation.
//!
//! Every request gets an id that shows up in the request span, on the
//! Sentry scope, and in the response headers. Upstream proxies may supply
//! one; anything unusable is replaced with a fresh UUID v4.

use axum::{extract::Request, http::HeaderValue, middleware::Next, response::Response};
use tracing::Span;
use uuid::Uuid;

/// The HTTP header name for request IDs.
pub const REQUEST_ID_HEADER: &str = "x-request-id";

/// Longest upstream id we are willing to echo into logs and headers.
const MAX_REQUEST_ID_LEN: usize = 64;

/// Middleware that ensures every request has a unique request ID.
///
/// An `x-request-id` header from an upstream proxy or load balancer is kept
/// when it passes [`usable_id`]; otherwise a new UUID v4 is minted. Either
/// way the id is recorded in the request span, tagged on the Sentry scope,
/// and returned in the response headers.
pub async fn request_id_middleware(request: Request, next: Next) -> Response {
    let request_id = request
        .headers()
        .get(REQUEST_ID_HEADER)
        .and_then(|h| h.to_str().ok())
        .filter(|v| usable_id(v))
        .map_or_else(|| Uuid::new_v4().to_string(), String::from);

    Span::current().record("request_id", &request_id);

    sentry::configure_scope(|scope| {
        scope.set_tag("request_id", &request_id);
    });

    let mut response = next.run(request).await;

    if let Ok(value) = HeaderValue::from_str(&request_id) {
        response.headers_mut().insert(REQUEST_ID_HEADER, value);
    }

    response
}

/// An upstream id is kept only when it is non-empty, short, and printable
/// ASCII; everything else would pollute logs rather than correlate them.
fn usable_id(value: &str) -> bool {
    !value.is_empty()
        && value.len() <= MAX_REQUEST_ID_LEN
        && value.bytes().all(|b| b.is_ascii_graphic())
}

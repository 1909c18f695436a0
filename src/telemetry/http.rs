//! HTTP request span helpers.
//!
//! Plugged into `tower_http::trace::TraceLayer` so every request gets a
//! span carrying its method and route, and a status field filled in on
//! response.

use std::time::Duration;

use axum::extract::MatchedPath;
use axum::http::{Request, Response};
use tracing::Span;

/// Start a span for an incoming request.
///
/// Uses the matched route template (`/api/instructions/{id}`) when there is
/// one so that ids do not end up in span names.
pub fn make_request_span<B>(request: &Request<B>) -> Span {
    let route = request
        .extensions()
        .get::<MatchedPath>()
        .map(|p| p.as_str().to_string())
        .unwrap_or_else(|| request.uri().path().to_string());
    tracing::info_span!(
        "http.request",
        "http.request.method" = %request.method(),
        "http.route" = route,
        "http.response.status_code" = tracing::field::Empty,
    )
}

/// Record the response status on the request span.
pub fn record_response<B>(response: &Response<B>, latency: Duration, span: &Span) {
    let status = response.status().as_u16();
    span.record("http.response.status_code", status);
    tracing::debug!(parent: span, status, latency_ms = latency.as_millis() as u64, "response");
}

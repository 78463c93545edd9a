// ABOUTME: Request tracking middleware recording per-route HTTP metrics and access logs
// ABOUTME: Labels requests with the matched route template so ids do not explode cardinality

use std::sync::Arc;
use std::time::Instant;

use axum::extract::{MatchedPath, Request, State};
use axum::middleware::Next;
use axum::response::Response;
use tracing::Span;

use crate::logging::AppLogger;
use crate::metrics::MetricsSink;

/// Endpoint label for requests that matched no route
pub const UNMATCHED_ENDPOINT: &str = "unmatched";

/// Record method, matched route, status, and latency for every request
pub async fn track_requests(
    State(metrics): State<Arc<dyn MetricsSink>>,
    request: Request,
    next: Next,
) -> Response {
    let started = Instant::now();
    let method = request.method().as_str().to_owned();
    let endpoint = request
        .extensions()
        .get::<MatchedPath>()
        .map_or_else(|| UNMATCHED_ENDPOINT.to_owned(), |p| p.as_str().to_owned());

    let response = next.run(request).await;

    let elapsed = started.elapsed();
    let status = response.status().as_u16();
    metrics.record_http_request(&method, &endpoint, status, elapsed);
    AppLogger::log_api_request(
        &method,
        &endpoint,
        status,
        u64::try_from(elapsed.as_millis()).unwrap_or(u64::MAX),
    );
    response
}

/// Create a tracing span for HTTP requests
pub fn create_request_span(method: &str, path: &str, request_id: &str) -> Span {
    tracing::info_span!(
        "http_request",
        method = %method,
        path = %path,
        request_id = %request_id,
        user_id = tracing::field::Empty,
        status_code = tracing::field::Empty,
    )
}

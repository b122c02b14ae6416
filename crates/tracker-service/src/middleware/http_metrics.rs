//! HTTP metrics middleware.
//!
//! Sits outside the router so it sees every response, including the ones
//! produced before a handler runs:
//! - 404 for unknown paths (fallback)
//! - 405 for a known path with the wrong method
//! - 408 from the request timeout layer

use axum::{extract::Request, middleware::Next, response::Response};
use std::time::Instant;

use crate::observability::metrics::record_http_request;

/// Record method, normalized path, status and duration of each request.
pub async fn http_metrics_middleware(request: Request, next: Next) -> Response {
    let start = Instant::now();
    let method = request.method().to_string();
    let path = request.uri().path().to_string();

    let response = next.run(request).await;

    record_http_request(&method, &path, response.status().as_u16(), start.elapsed());

    response
}

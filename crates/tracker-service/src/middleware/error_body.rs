//! JSON bodies for responses produced outside the handlers.
//!
//! The method router answers a wrong method with an empty 405 and the
//! timeout layer answers with an empty 408. This rewrites both into the
//! same `{"error": {"code", "message"}}` shape the handlers return.

use axum::{
    http::{header, StatusCode},
    response::{IntoResponse, Response},
};

use crate::errors::TrackerError;

/// Replace the empty body of a framework 405 or 408 with a JSON error.
///
/// Responses that already carry a content type are passed through.
pub async fn json_error_body(response: Response) -> Response {
    if response.headers().contains_key(header::CONTENT_TYPE) {
        return response;
    }

    let error = match response.status() {
        StatusCode::METHOD_NOT_ALLOWED => TrackerError::MethodNotAllowed,
        StatusCode::REQUEST_TIMEOUT => TrackerError::Timeout,
        _ => return response,
    };

    let allow = response.headers().get(header::ALLOW).cloned();
    let mut rendered = error.into_response();
    if let Some(allow) = allow {
        rendered.headers_mut().insert(header::ALLOW, allow);
    }
    rendered
}

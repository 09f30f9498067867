//! Request ID middleware for log correlation.
//!
//! Every request runs inside a tracing span carrying its id, so engine and
//! handler logs emitted while serving it can be grouped together.

use axum::{
    extract::Request,
    http::{HeaderMap, HeaderValue},
    middleware::Next,
    response::Response,
};
use tracing::Instrument;
use uuid::Uuid;

/// Header name for request ID
pub const REQUEST_ID_HEADER: &str = "x-request-id";

/// Longest client-supplied id that is echoed back
const MAX_REQUEST_ID_LEN: usize = 64;

/// Reuse a well-formed client id, otherwise generate a fresh one
fn get_or_generate_request_id(headers: &HeaderMap) -> String {
    headers
        .get(REQUEST_ID_HEADER)
        .and_then(|v| v.to_str().ok())
        .filter(|id| is_acceptable(id))
        .map(str::to_string)
        .unwrap_or_else(|| Uuid::new_v4().to_string())
}

fn is_acceptable(id: &str) -> bool {
    !id.is_empty()
        && id.len() <= MAX_REQUEST_ID_LEN
        && id
            .bytes()
            .all(|b| b.is_ascii_alphanumeric() || b == b'-' || b == b'_')
}

/// Middleware to add request ID to all requests and responses
///
/// This middleware:
/// 1. Extracts an existing request ID from the header or generates a new one
/// 2. Runs the rest of the stack inside a span tagged with it
/// 3. Echoes it in the response headers
pub async fn request_id_middleware(request: Request, next: Next) -> Response {
    let request_id = get_or_generate_request_id(request.headers());

    let span = tracing::info_span!("request", request_id = %request_id);
    tracing::info!(
        parent: &span,
        method = %request.method(),
        uri = %request.uri(),
        "Request started"
    );

    let mut response = next.run(request).instrument(span.clone()).await;

    if let Ok(header_value) = HeaderValue::from_str(&request_id) {
        response.headers_mut().insert(REQUEST_ID_HEADER, header_value);
    }

    tracing::info!(parent: &span, status = %response.status(), "Request completed");

    response
}

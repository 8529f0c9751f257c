// src/logging_middleware.rs
//! Debug-level logging of JSON request and response bodies

use axum::body::to_bytes;
use axum::{
    body::Body,
    extract::Request,
    http::{header, HeaderMap, StatusCode},
    middleware::Next,
    response::Response,
};
use tracing::{debug, enabled, Level};

/// JSON bodies above this size are passed through without logging.
const MAX_LOGGED_BODY_BYTES: usize = 64 * 1024;

fn is_json(headers: &HeaderMap) -> bool {
    headers
        .get(header::CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .map(|v| v.starts_with("application/json"))
        .unwrap_or(false)
}

/// Only bodies with a declared length under the limit are buffered.
fn fits_log_limit(headers: &HeaderMap) -> bool {
    headers
        .get(header::CONTENT_LENGTH)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.parse::<usize>().ok())
        .map(|len| len <= MAX_LOGGED_BODY_BYTES)
        .unwrap_or(false)
}

/// Logs JSON bodies when debug logging is on. Multipart uploads and file
/// downloads are never buffered.
pub async fn log_request_response(request: Request, next: Next) -> Result<Response, StatusCode> {
    if !enabled!(Level::DEBUG) {
        return Ok(next.run(request).await);
    }

    let request = if is_json(request.headers()) && fits_log_limit(request.headers()) {
        let (parts, body) = request.into_parts();
        let bytes = to_bytes(body, MAX_LOGGED_BODY_BYTES)
            .await
            .map_err(|_| StatusCode::BAD_REQUEST)?;
        if !bytes.is_empty() {
            debug!(
                method = %parts.method,
                uri = %parts.uri,
                request_body = %String::from_utf8_lossy(&bytes),
                "Request"
            );
        }
        Request::from_parts(parts, Body::from(bytes))
    } else {
        request
    };

    let response = next.run(request).await;

    if !is_json(response.headers()) {
        return Ok(response);
    }

    let (parts, body) = response.into_parts();
    let bytes = to_bytes(body, usize::MAX)
        .await
        .map_err(|_| StatusCode::INTERNAL_SERVER_ERROR)?;
    if !bytes.is_empty() {
        debug!(
            status = %parts.status,
            response_body = %String::from_utf8_lossy(&bytes),
            "Response"
        );
    }

    Ok(Response::from_parts(parts, Body::from(bytes)))
}

//! Request identification.
//!
//! # Responsibilities
//! - Assign every request an `x-request-id` (UUID v4 unless the client sent one)
//! - Echo the id on the response
//! - Expose the id to handlers as the GraphQL query id
//!
//! # Design Decisions
//! - Request ID added as early as possible so trace spans carry it

use axum::http::HeaderMap;
use tower_http::request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer};

/// Header carrying the request id.
pub const X_REQUEST_ID: &str = "x-request-id";

/// Layer that assigns a request id when missing.
pub fn set_request_id_layer() -> SetRequestIdLayer<MakeRequestUuid> {
    SetRequestIdLayer::x_request_id(MakeRequestUuid)
}

/// Layer that copies the request id onto the response.
pub fn propagate_request_id_layer() -> PropagateRequestIdLayer {
    PropagateRequestIdLayer::x_request_id()
}

/// Read the request id from headers, if present and valid UTF-8.
pub fn request_id(headers: &HeaderMap) -> Option<String> {
    headers
        .get(X_REQUEST_ID)
        .and_then(|v| v.to_str().ok())
        .filter(|v| !v.is_empty())
        .map(str::to_owned)
}

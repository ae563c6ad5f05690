//! Response shaping.
//!
//! # Responsibilities
//! - Turn a handler `Outcome` into the client response
//! - Tag 200 responses with `X-Cache-Status`
//! - Map upstream and storage failures to 503 / 500
//! - Answer single byte ranges of cached objects with 206 / 416
//!
//! # Design Decisions
//! - One exhaustive match; every non-200 response has an empty body
//! - `X-Cache-Status` is only present on object responses (200, 206, 416)
//! - Conditional requests are not evaluated; there are no validators to compare

use axum::{
    body::Body,
    http::{HeaderName, HeaderValue, StatusCode, header},
    response::{IntoResponse, Response},
};
use bytes::Bytes;

use crate::http::range::{byte_range, ByteRange};
use crate::proxy::{extension::content_type, Outcome};

/// Diagnostic header telling whether the object came from the store.
pub const X_CACHE_STATUS: HeaderName = HeaderName::from_static("x-cache-status");

/// Build the client response for `outcome`.
///
/// `key` picks the content type; `range` is the request's `Range` header.
pub fn render(outcome: Outcome, key: &str, range: Option<&HeaderValue>) -> Response {
    match outcome {
        Outcome::Hit(body) => object(body, key, "HIT", range),
        Outcome::Populated(body) => object(body, key, "MISS", range),
        Outcome::Redirect { status, location } => match location {
            Some(location) => (status, [(header::LOCATION, location)]).into_response(),
            None => status.into_response(),
        },
        Outcome::PassThrough(status) => status.into_response(),
        Outcome::Rejected => StatusCode::NOT_FOUND.into_response(),
        Outcome::TransportError => StatusCode::SERVICE_UNAVAILABLE.into_response(),
        Outcome::ProcessingError => StatusCode::INTERNAL_SERVER_ERROR.into_response(),
    }
}

fn object(
    body: Bytes,
    key: &str,
    cache_status: &'static str,
    range: Option<&HeaderValue>,
) -> Response {
    let headers = [
        (X_CACHE_STATUS, HeaderValue::from_static(cache_status)),
        (header::CONTENT_TYPE, HeaderValue::from_static(content_type(key))),
        (header::ACCEPT_RANGES, HeaderValue::from_static("bytes")),
    ];
    let len = body.len();

    match byte_range(range, len) {
        ByteRange::Full => (StatusCode::OK, headers, Body::from(body)).into_response(),
        ByteRange::Partial(bytes) => {
            let content_range = format!("bytes {}-{}/{}", bytes.start, bytes.end - 1, len);
            (
                StatusCode::PARTIAL_CONTENT,
                headers,
                [(header::CONTENT_RANGE, content_range)],
                Body::from(body.slice(bytes)),
            )
                .into_response()
        }
        ByteRange::Unsatisfiable => (
            StatusCode::RANGE_NOT_SATISFIABLE,
            headers,
            [(header::CONTENT_RANGE, format!("bytes */{}", len))],
        )
            .into_response(),
    }
}

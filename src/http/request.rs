//! Request identification and outbound request preparation.
//!
//! # Responsibilities
//! - Generate unique request ID (UUID v4) for log correlation
//! - Open the per-request tracing span
//! - Build the outbound header set from the inbound request
//!
//! # Design Decisions
//! - Request ID added as early as possible for tracing
//! - The ID stays local: it is neither forwarded upstream nor echoed back
//! - Only Accept, Accept-Encoding and Accept-Language are ever forwarded

use axum::http::{header, HeaderMap, HeaderName, HeaderValue, Request};
use tower_http::request_id::{MakeRequestId, RequestId};
use tracing::Span;
use uuid::Uuid;

/// Header carrying the request ID.
pub const X_REQUEST_ID: &str = "x-request-id";

/// Inbound headers copied upstream, with the value used when absent.
const NEGOTIATION_HEADERS: [(HeaderName, &str); 3] = [
    (header::ACCEPT, "*/*"),
    (header::ACCEPT_ENCODING, "gzip, deflate"),
    (header::ACCEPT_LANGUAGE, "en-US,en;q=0.9"),
];

/// Generates UUID v4 request IDs.
#[derive(Debug, Clone, Copy, Default)]
pub struct UuidRequestId;

impl MakeRequestId for UuidRequestId {
    fn make_request_id<B>(&mut self, _request: &Request<B>) -> Option<RequestId> {
        let id = Uuid::new_v4().to_string();
        HeaderValue::from_str(&id).ok().map(RequestId::new)
    }
}

/// Span wrapping one inbound request.
pub fn request_span<B>(request: &Request<B>) -> Span {
    let request_id = request
        .extensions()
        .get::<RequestId>()
        .and_then(|id| id.header_value().to_str().ok())
        .unwrap_or("unknown");

    tracing::info_span!(
        "request",
        request_id = %request_id,
        method = %request.method(),
        path = %request.uri().path(),
    )
}

/// Outbound headers: the fixed `User-Agent` plus content negotiation
/// headers taken from the caller or defaulted.
pub fn outbound_headers(inbound: &HeaderMap, user_agent: HeaderValue) -> HeaderMap {
    let mut headers = HeaderMap::with_capacity(NEGOTIATION_HEADERS.len() + 1);
    headers.insert(header::USER_AGENT, user_agent);

    for (name, default) in NEGOTIATION_HEADERS {
        let value = inbound
            .get(&name)
            .filter(|v| !v.is_empty())
            .cloned()
            .unwrap_or_else(|| HeaderValue::from_static(default));
        headers.insert(name, value);
    }
    headers
}

//! Response construction and header shaping.
//!
//! # Responsibilities
//! - Attach the fixed CORS header set to every response
//! - Build plain-text responses for every locally generated status
//! - Reduce upstream headers to the pass-through allow-list
//!
//! # Design Decisions
//! - Upstream bodies are never touched here; only header maps are rebuilt
//! - CORS values overwrite anything with the same name from upstream
//! - Empty upstream header values are treated as absent

use axum::body::Body;
use axum::http::{header, HeaderMap, HeaderName, HeaderValue, Response, StatusCode};

/// Methods the proxy answers; used for both CORS and `Allow`.
pub const ALLOWED_METHODS: &str = "GET, HEAD, OPTIONS";

/// Cache policy applied when the upstream sends none.
pub const DEFAULT_CACHE_CONTROL: &str = "public, max-age=3600";

/// Preflight cache lifetime in seconds.
pub const PREFLIGHT_MAX_AGE: &str = "86400";

pub const X_PROXIED_BY: HeaderName = HeaderName::from_static("x-proxied-by");
pub const X_PROXY_SOURCE: HeaderName = HeaderName::from_static("x-proxy-source");

const TEXT_PLAIN_UTF8: &str = "text/plain; charset=utf-8";

/// Upstream response headers copied through to the caller.
pub const FORWARDED_RESPONSE_HEADERS: [HeaderName; 8] = [
    header::CONTENT_TYPE,
    header::CONTENT_LENGTH,
    header::CONTENT_ENCODING,
    header::CONTENT_DISPOSITION,
    header::LAST_MODIFIED,
    header::ETAG,
    header::EXPIRES,
    header::CACHE_CONTROL,
];

/// Insert the CORS header set, replacing existing values.
pub fn apply_cors(headers: &mut HeaderMap) {
    headers.insert(
        header::ACCESS_CONTROL_ALLOW_ORIGIN,
        HeaderValue::from_static("*"),
    );
    headers.insert(
        header::ACCESS_CONTROL_ALLOW_METHODS,
        HeaderValue::from_static(ALLOWED_METHODS),
    );
    headers.insert(
        header::ACCESS_CONTROL_ALLOW_HEADERS,
        HeaderValue::from_static("Content-Type"),
    );
}

/// A response with the given status and body plus CORS headers.
pub fn cors_response(status: StatusCode, body: Body) -> Response<Body> {
    let mut response = Response::new(body);
    *response.status_mut() = status;
    apply_cors(response.headers_mut());
    response
}

/// A `text/plain` response with CORS headers.
pub fn text_response(status: StatusCode, body: impl Into<String>) -> Response<Body> {
    let mut response = cors_response(status, Body::from(body.into()));
    response.headers_mut().insert(
        header::CONTENT_TYPE,
        HeaderValue::from_static(TEXT_PLAIN_UTF8),
    );
    response
}

/// Copy only the allow-listed headers out of an upstream response.
pub fn filter_upstream_headers(upstream: &HeaderMap) -> HeaderMap {
    let mut headers = HeaderMap::new();
    for name in FORWARDED_RESPONSE_HEADERS {
        for value in upstream.get_all(&name) {
            if !value.is_empty() {
                headers.append(name.clone(), value.clone());
            }
        }
    }
    headers
}

//! The proxy decision table.
//!
//! Every inbound request walks the same ordered checks: path prefix, CORS
//! preflight, method, then the single upstream call. Each check is an early
//! return, and every failure becomes a well-formed response with CORS headers.
//!
//! The prefix gate runs on the normalized path (dot segments resolved,
//! including percent-encoded ones), and that same normalized path is what
//! gets forwarded.

use std::sync::Arc;

use axum::body::Body;
use axum::http::header::InvalidHeaderValue;
use axum::http::request::Parts;
use axum::http::uri::InvalidUri;
use axum::http::{header, HeaderValue, Method, Request, Response, StatusCode, Uri};
use hyper::ext::ReasonPhrase;
use thiserror::Error;
use url::Url;

use crate::config::ProxyConfig;
use crate::http::request::outbound_headers;
use crate::http::response::{
    apply_cors, cors_response, filter_upstream_headers, text_response, ALLOWED_METHODS,
    DEFAULT_CACHE_CONTROL, PREFLIGHT_MAX_AGE, X_PROXIED_BY, X_PROXY_SOURCE,
};
use crate::upstream::{Upstream, UpstreamError, UpstreamRequest};

/// Failures while forwarding; all of them surface as 500.
#[derive(Debug, Error)]
pub enum ProxyError {
    #[error("invalid upstream URL: {0}")]
    InvalidUrl(#[from] url::ParseError),

    #[error("invalid upstream URL: {0}")]
    InvalidTarget(#[from] InvalidUri),

    #[error("invalid header value: {0}")]
    InvalidHeader(#[from] InvalidHeaderValue),

    #[error(transparent)]
    Upstream(#[from] UpstreamError),
}

/// Stateless request handler. Safe to share across any number of tasks.
#[derive(Clone)]
pub struct ProxyHandler {
    config: Arc<ProxyConfig>,
    upstream: Arc<dyn Upstream>,
}

impl ProxyHandler {
    pub fn new(config: Arc<ProxyConfig>, upstream: Arc<dyn Upstream>) -> Self {
        Self { config, upstream }
    }

    pub fn config(&self) -> &ProxyConfig {
        &self.config
    }

    /// Map any inbound request to a response. Never fails.
    pub async fn handle(&self, request: Request<Body>) -> Response<Body> {
        // Only GET/HEAD are forwarded and never with a body.
        let (parts, _) = request.into_parts();

        match self.dispatch(&parts).await {
            Ok(response) => response,
            Err(e) => {
                tracing::error!(error = %e, path = %parts.uri.path(), "Proxy error");
                text_response(
                    StatusCode::INTERNAL_SERVER_ERROR,
                    format!("Proxy error: {}", e),
                )
            }
        }
    }

    async fn dispatch(&self, parts: &Parts) -> Result<Response<Body>, ProxyError> {
        let target = self.target_url(&parts.uri)?;

        if !self.config.routes.is_allowed(target.path()) {
            tracing::debug!(
                path = %parts.uri.path(),
                normalized = %target.path(),
                "Path outside allowed prefixes"
            );
            return Ok(text_response(StatusCode::NOT_FOUND, self.not_found_message()));
        }

        if parts.method == Method::OPTIONS {
            let mut response = cors_response(StatusCode::OK, Body::empty());
            response.headers_mut().insert(
                header::ACCESS_CONTROL_MAX_AGE,
                HeaderValue::from_static(PREFLIGHT_MAX_AGE),
            );
            return Ok(response);
        }

        if parts.method != Method::GET && parts.method != Method::HEAD {
            let mut response = cors_response(
                StatusCode::METHOD_NOT_ALLOWED,
                Body::from("Method Not Allowed"),
            );
            response
                .headers_mut()
                .insert(header::ALLOW, HeaderValue::from_static(ALLOWED_METHODS));
            return Ok(response);
        }

        self.forward(parts, target).await
    }

    /// Resolve the inbound path and query against the upstream origin.
    ///
    /// Only the path and query are applied, so an inbound path such as
    /// `//other.host/x` can never change the host.
    fn target_url(&self, uri: &Uri) -> Result<Url, ProxyError> {
        let mut url = Url::parse(&format!("https://{}/", self.config.upstream.host))?;
        url.set_path(uri.path());
        url.set_query(uri.query().filter(|q| !q.is_empty()));
        Ok(url)
    }

    async fn forward(&self, parts: &Parts, target: Url) -> Result<Response<Body>, ProxyError> {
        let upstream_host = &self.config.upstream.host;
        let uri: Uri = target.as_str().parse()?;

        let user_agent = HeaderValue::from_str(&self.config.upstream.user_agent)?;
        let outbound = UpstreamRequest {
            method: parts.method.clone(),
            uri,
            headers: outbound_headers(&parts.headers, user_agent),
        };

        tracing::debug!(method = %outbound.method, uri = %outbound.uri, "Forwarding request");
        let upstream = self.upstream.send(outbound).await?;
        let status = upstream.status();

        if !status.is_success() {
            let reason = reason_phrase(&upstream);
            tracing::debug!(status = %status, reason = %reason, "Upstream returned failure status");
            let message = format!("Source server error: {} {}", status.as_u16(), reason);
            return Ok(text_response(status, message.trim_end()));
        }

        let (upstream_parts, body) = upstream.into_parts();
        let mut headers = filter_upstream_headers(&upstream_parts.headers);
        apply_cors(&mut headers);
        if !headers.contains_key(header::CACHE_CONTROL) {
            headers.insert(
                header::CACHE_CONTROL,
                HeaderValue::from_static(DEFAULT_CACHE_CONTROL),
            );
        }
        headers.insert(
            X_PROXIED_BY,
            HeaderValue::from_str(&self.config.upstream.proxied_by)?,
        );
        headers.insert(X_PROXY_SOURCE, HeaderValue::from_str(upstream_host)?);

        let mut response = Response::new(body);
        *response.status_mut() = status;
        *response.headers_mut() = headers;
        if let Some(reason) = upstream_parts.extensions.get::<ReasonPhrase>() {
            response.extensions_mut().insert(reason.clone());
        }
        Ok(response)
    }

    fn not_found_message(&self) -> String {
        let prefixes = &self.config.routes.allowed_prefixes;
        let listed = match prefixes.split_last() {
            Some((last, rest)) if !rest.is_empty() => {
                format!("{} and {}", rest.join(", "), last)
            }
            Some((last, _)) => last.clone(),
            None => String::new(),
        };
        format!("Not Found - This proxy only handles {} paths", listed)
    }
}

/// The upstream's own reason phrase, or the canonical one for the status.
fn reason_phrase<B>(response: &Response<B>) -> String {
    response
        .extensions()
        .get::<ReasonPhrase>()
        .map(|reason| String::from_utf8_lossy(reason.as_bytes()).into_owned())
        .unwrap_or_else(|| {
            response
                .status()
                .canonical_reason()
                .unwrap_or_default()
                .to_string()
        })
}

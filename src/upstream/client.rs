//! Upstream HTTP client with timeout and error handling.
//!
//! # Responsibilities
//! - Own the pooled HTTPS client used for every outbound call
//! - Enforce connect and response-header timeouts
//! - Expose upstream bodies as streams without buffering

use std::error::Error as _;
use std::time::Duration;

use async_trait::async_trait;
use axum::body::Body;
use axum::http::Response;
use futures_util::TryStreamExt;
use hyper::ext::ReasonPhrase;
use tokio::time::timeout;

use crate::config::TimeoutConfig;
use crate::upstream::{Upstream, UpstreamError, UpstreamRequest};

/// Production [`Upstream`] backed by a shared `reqwest::Client`.
#[derive(Clone)]
pub struct HttpUpstream {
    client: reqwest::Client,
    response_timeout: Duration,
}

impl HttpUpstream {
    /// Build a client honouring the configured timeouts.
    pub fn new(timeouts: &TimeoutConfig) -> Result<Self, UpstreamError> {
        let client = reqwest::Client::builder()
            .connect_timeout(Duration::from_secs(timeouts.connect_secs))
            .build()
            .map_err(|e| UpstreamError::Transport(e.to_string()))?;

        Ok(Self::with_client(client, timeouts))
    }

    /// Wrap a pre-configured client.
    pub fn with_client(client: reqwest::Client, timeouts: &TimeoutConfig) -> Self {
        Self {
            client,
            response_timeout: Duration::from_secs(timeouts.response_secs),
        }
    }
}

#[async_trait]
impl Upstream for HttpUpstream {
    async fn send(&self, request: UpstreamRequest) -> Result<Response<Body>, UpstreamError> {
        let uri = request.uri.to_string();
        let pending = self
            .client
            .request(request.method, uri.as_str())
            .headers(request.headers)
            .send();

        let upstream = match timeout(self.response_timeout, pending).await {
            Ok(Ok(response)) => response,
            Ok(Err(e)) => return Err(UpstreamError::Transport(describe(&e))),
            Err(_) => return Err(UpstreamError::Timeout(self.response_timeout)),
        };

        tracing::debug!(
            uri = %uri,
            status = %upstream.status(),
            "Upstream responded"
        );

        let mut builder = Response::builder().status(upstream.status());
        if let Some(headers) = builder.headers_mut() {
            *headers = upstream.headers().clone();
        }
        // Present only when the upstream sent a non-canonical reason.
        if let Some(reason) = upstream.extensions().get::<ReasonPhrase>() {
            builder = builder.extension(reason.clone());
        }

        let stream = upstream.bytes_stream().inspect_err(move |e| {
            tracing::warn!(uri = %uri, error = %e, "Upstream body stream failed");
        });

        builder
            .body(Body::from_stream(stream))
            .map_err(|e| UpstreamError::Transport(e.to_string()))
    }
}

/// Flatten a reqwest error and its sources into one line.
fn describe(error: &reqwest::Error) -> String {
    let mut message = error.to_string();
    let mut source = error.source();
    while let Some(cause) = source {
        message.push_str(": ");
        message.push_str(&cause.to_string());
        source = cause.source();
    }
    message
}

//! Outbound transport subsystem.
//!
//! # Data Flow
//! ```text
//! ProxyHandler
//!     → UpstreamRequest (method, absolute https URI, explicit headers)
//!     → Upstream::send (client.rs: pooled reqwest client)
//!     → Response<Body> with a lazily streamed body
//! ```
//!
//! # Design Decisions
//! - The handler only sees the `Upstream` trait, so tests swap in stubs
//! - Connection pooling belongs to the transport, never to the handler
//! - Response bodies are streams; nothing here buffers a full body

pub mod client;

use std::time::Duration;

use async_trait::async_trait;
use axum::body::Body;
use axum::http::{HeaderMap, Method, Response, Uri};
use thiserror::Error;

pub use client::HttpUpstream;

/// A fully resolved outbound request. Never carries a body.
#[derive(Debug, Clone)]
pub struct UpstreamRequest {
    pub method: Method,
    pub uri: Uri,
    pub headers: HeaderMap,
}

/// Errors raised while issuing the outbound call.
#[derive(Debug, Error)]
pub enum UpstreamError {
    /// DNS, connect, TLS or protocol failure.
    #[error("{0}")]
    Transport(String),

    /// Response headers did not arrive in time.
    #[error("upstream did not respond within {} seconds", .0.as_secs())]
    Timeout(Duration),
}

/// The outbound HTTP collaborator.
#[async_trait]
pub trait Upstream: Send + Sync {
    /// Issue `request` and return the upstream response as soon as its
    /// headers are available.
    async fn send(&self, request: UpstreamRequest) -> Result<Response<Body>, UpstreamError>;
}

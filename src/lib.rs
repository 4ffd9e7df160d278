//! Minimal CORS-enabled forwarding proxy for a single upstream.

pub mod config;
pub mod http;
pub mod lifecycle;
pub mod observability;
pub mod upstream;

pub use config::ProxyConfig;
pub use http::{HttpServer, ProxyHandler};
pub use lifecycle::Shutdown;
pub use upstream::{HttpUpstream, Upstream, UpstreamError, UpstreamRequest};

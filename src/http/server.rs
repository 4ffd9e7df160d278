//! HTTP server setup and configuration.
//!
//! # Responsibilities
//! - Create Axum Router routing every method and path to the proxy handler
//! - Wire up middleware (request ID, tracing)
//! - Serve on a bound listener until shutdown is signalled

use std::sync::Arc;

use axum::{
    body::Body,
    extract::State,
    http::Request,
    response::Response,
    Router,
};
use tokio::net::TcpListener;
use tokio::sync::broadcast;
use tower::ServiceBuilder;
use tower_http::{request_id::SetRequestIdLayer, trace::TraceLayer};

use crate::config::ProxyConfig;
use crate::http::handler::ProxyHandler;
use crate::http::request::{request_span, UuidRequestId, X_REQUEST_ID};
use crate::upstream::Upstream;

/// HTTP server for the proxy.
pub struct HttpServer {
    router: Router,
    config: Arc<ProxyConfig>,
}

impl HttpServer {
    /// Create a new HTTP server forwarding through `upstream`.
    pub fn new(config: Arc<ProxyConfig>, upstream: Arc<dyn Upstream>) -> Self {
        let handler = Arc::new(ProxyHandler::new(config.clone(), upstream));
        let router = Self::build_router(handler);
        Self { router, config }
    }

    /// Build the Axum router with all middleware layers.
    fn build_router(handler: Arc<ProxyHandler>) -> Router {
        let middleware = ServiceBuilder::new()
            .layer(SetRequestIdLayer::new(
                axum::http::HeaderName::from_static(X_REQUEST_ID),
                UuidRequestId,
            ))
            .layer(
                TraceLayer::new_for_http()
                    .make_span_with(request_span::<Body>)
                    // The handler logs its own failures; upstream 5xx are passed through.
                    .on_failure(()),
            );

        Router::new()
            .fallback(proxy_handler)
            .with_state(handler)
            .layer(middleware)
    }

    /// The fully layered router, for embedding or in-process testing.
    pub fn router(&self) -> Router {
        self.router.clone()
    }

    /// Get a reference to the config.
    pub fn config(&self) -> &ProxyConfig {
        &self.config
    }

    /// Run the server, accepting connections on the given listener until
    /// the shutdown broadcast fires.
    pub async fn run(
        self,
        listener: TcpListener,
        mut shutdown: broadcast::Receiver<()>,
    ) -> Result<(), std::io::Error> {
        let addr = listener.local_addr()?;
        tracing::info!(
            address = %addr,
            upstream = %self.config.upstream.host,
            "HTTP server starting"
        );

        axum::serve(listener, self.router)
            .with_graceful_shutdown(async move {
                let _ = shutdown.recv().await;
                tracing::info!("Shutdown signal received");
            })
            .await?;

        tracing::info!("HTTP server stopped");
        Ok(())
    }
}

/// Fallback handler: every request goes through the decision table.
async fn proxy_handler(
    State(handler): State<Arc<ProxyHandler>>,
    request: Request<Body>,
) -> Response {
    handler.handle(request).await
}

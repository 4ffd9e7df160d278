//! HTTP protocol handling subsystem.
//!
//! # Data Flow
//! ```text
//! TCP connection
//!     → server.rs (Axum setup, request ID, trace span)
//!     → handler.rs (prefix / preflight / method checks, upstream call)
//!     → request.rs (outbound header set)
//!     → response.rs (header allow-list, CORS, defaults)
//!     → Send to client
//! ```

pub mod handler;
pub mod request;
pub mod response;
pub mod server;

pub use handler::{ProxyError, ProxyHandler};
pub use request::{UuidRequestId, X_REQUEST_ID};
pub use server::HttpServer;

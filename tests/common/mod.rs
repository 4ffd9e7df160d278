//! Shared utilities for integration testing.

#![allow(dead_code)]

use std::net::SocketAddr;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use axum::body::Body;
use axum::http::{Request, Response, StatusCode};
use axum::Router;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::{TcpListener, TcpStream};
use tokio::sync::Notify;

use domains_proxy::config::ProxyConfig;
use domains_proxy::{HttpServer, Upstream, UpstreamError, UpstreamRequest};

type Reply = Box<dyn Fn() -> Result<Response<Body>, UpstreamError> + Send + Sync>;

/// In-process upstream that records every call and answers from a closure.
pub struct StubUpstream {
    calls: AtomicUsize,
    requests: Mutex<Vec<UpstreamRequest>>,
    reply: Reply,
}

impl StubUpstream {
    pub fn new<F>(reply: F) -> Arc<Self>
    where
        F: Fn() -> Result<Response<Body>, UpstreamError> + Send + Sync + 'static,
    {
        Arc::new(Self {
            calls: AtomicUsize::new(0),
            requests: Mutex::new(Vec::new()),
            reply: Box::new(reply),
        })
    }

    /// Upstream answering 200 with the given headers and body.
    pub fn ok(headers: &[(&'static str, &'static str)], body: &'static str) -> Arc<Self> {
        let headers = headers.to_vec();
        Self::new(move || {
            let mut builder = Response::builder().status(StatusCode::OK);
            for (name, value) in &headers {
                builder = builder.header(*name, *value);
            }
            Ok(builder.body(Body::from(body)).unwrap())
        })
    }

    /// Upstream answering with a bare status.
    pub fn status(status: StatusCode, body: &'static str) -> Arc<Self> {
        Self::new(move || {
            Ok(Response::builder()
                .status(status)
                .header("content-type", "text/html")
                .body(Body::from(body))
                .unwrap())
        })
    }

    /// Upstream whose transport always fails.
    pub fn failing(message: &'static str) -> Arc<Self> {
        Self::new(move || Err(UpstreamError::Transport(message.to_string())))
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    pub fn last_request(&self) -> Option<UpstreamRequest> {
        self.requests.lock().unwrap().last().cloned()
    }
}

#[async_trait]
impl Upstream for StubUpstream {
    async fn send(&self, request: UpstreamRequest) -> Result<Response<Body>, UpstreamError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.requests.lock().unwrap().push(request);
        (self.reply)()
    }
}

/// Router with default configuration in front of `upstream`.
pub fn proxy_router(upstream: Arc<StubUpstream>) -> Router {
    proxy_router_with(ProxyConfig::default(), upstream)
}

pub fn proxy_router_with(config: ProxyConfig, upstream: Arc<StubUpstream>) -> Router {
    HttpServer::new(Arc::new(config), upstream).router()
}

pub fn request(method: &str, uri: &str) -> Request<Body> {
    Request::builder()
        .method(method)
        .uri(uri)
        .body(Body::empty())
        .unwrap()
}

pub async fn body_string(response: Response<Body>) -> String {
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    String::from_utf8(bytes.to_vec()).unwrap()
}

/// Read until the end of the request head so closing the socket is clean.
async fn read_request_head(socket: &mut TcpStream) {
    let mut buf = Vec::new();
    let mut chunk = [0u8; 1024];
    while !buf.windows(4).any(|w| w == b"\r\n\r\n") {
        match socket.read(&mut chunk).await {
            Ok(0) | Err(_) => return,
            Ok(n) => buf.extend_from_slice(&chunk[..n]),
        }
    }
}

/// Start a raw TCP backend that writes `response` verbatim to every client.
pub async fn start_mock_backend(response: String) -> SocketAddr {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let response = Arc::new(response);

    tokio::spawn(async move {
        while let Ok((mut socket, _)) = listener.accept().await {
            let response = response.clone();
            tokio::spawn(async move {
                read_request_head(&mut socket).await;
                let _ = socket.write_all(response.as_bytes()).await;
                let _ = socket.shutdown().await;
                tokio::time::sleep(Duration::from_millis(10)).await;
            });
        }
    });

    addr
}

/// Start a chunked backend that sends `first`, waits for `release`, then
/// sends `second` and finishes the body.
pub async fn start_chunked_backend(
    first: &'static str,
    second: &'static str,
    release: Arc<Notify>,
) -> SocketAddr {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();

    tokio::spawn(async move {
        if let Ok((mut socket, _)) = listener.accept().await {
            read_request_head(&mut socket).await;
            let head = "HTTP/1.1 200 OK\r\nContent-Type: text/plain\r\nTransfer-Encoding: chunked\r\nConnection: close\r\n\r\n";
            let _ = socket.write_all(head.as_bytes()).await;
            let _ = socket
                .write_all(format!("{:x}\r\n{}\r\n", first.len(), first).as_bytes())
                .await;
            let _ = socket.flush().await;

            release.notified().await;

            let _ = socket
                .write_all(format!("{:x}\r\n{}\r\n0\r\n\r\n", second.len(), second).as_bytes())
                .await;
            let _ = socket.shutdown().await;
        }
    });

    addr
}

/// Start a backend that accepts connections and never answers.
pub async fn start_silent_backend() -> SocketAddr {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();

    tokio::spawn(async move {
        let mut held = Vec::new();
        while let Ok((socket, _)) = listener.accept().await {
            held.push(socket);
        }
    });

    addr
}

//! domains-proxy
//!
//! Forwards `GET`/`HEAD` requests under a fixed set of path prefixes to one
//! https upstream and relays the response with a reduced header set and
//! permissive CORS headers.
//!
//! ```text
//!   client ──▶ listener ──▶ request id + trace ──▶ ProxyHandler ──▶ upstream (https)
//!   client ◀── header allow-list + CORS + cache defaults ◀── streamed body ◀──┘
//! ```

use std::path::PathBuf;
use std::sync::Arc;

use clap::Parser;
use tokio::net::TcpListener;

use domains_proxy::config::{load_config, validate_config, ConfigError, ProxyConfig};
use domains_proxy::lifecycle::{wait_for_signal, Shutdown};
use domains_proxy::observability::init_logging;
use domains_proxy::{HttpServer, HttpUpstream};

#[derive(Parser)]
#[command(name = "domains-proxy")]
#[command(about = "CORS-enabled forwarding proxy for a single upstream", long_about = None)]
struct Cli {
    /// TOML configuration file; built-in defaults are used when omitted.
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Override the listener bind address.
    #[arg(short, long)]
    bind: Option<String>,

    /// Override the upstream host.
    #[arg(short, long)]
    upstream: Option<String>,
}

impl Cli {
    fn resolve_config(&self) -> Result<ProxyConfig, ConfigError> {
        let mut config = match &self.config {
            Some(path) => load_config(path)?,
            None => ProxyConfig::default(),
        };

        if let Some(bind) = &self.bind {
            config.listener.bind_address = bind.clone();
        }
        if let Some(upstream) = &self.upstream {
            config.upstream.host = upstream.clone();
        }

        validate_config(&config).map_err(ConfigError::Validation)?;
        Ok(config)
    }
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    let config = cli.resolve_config()?;

    init_logging(&config.observability.log_level);

    tracing::info!(
        version = env!("CARGO_PKG_VERSION"),
        bind_address = %config.listener.bind_address,
        upstream = %config.upstream.host,
        allowed_prefixes = ?config.routes.allowed_prefixes,
        "Configuration loaded"
    );

    let upstream = Arc::new(HttpUpstream::new(&config.timeouts)?);

    let listener = TcpListener::bind(&config.listener.bind_address).await?;
    tracing::info!(address = %listener.local_addr()?, "Listening for connections");

    let shutdown = Shutdown::new();
    let server_shutdown = shutdown.subscribe();
    tokio::spawn(async move {
        wait_for_signal().await;
        shutdown.trigger();
    });

    let server = HttpServer::new(Arc::new(config), upstream);
    server.run(listener, server_shutdown).await?;

    tracing::info!("Shutdown complete");
    Ok(())
}

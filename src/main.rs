//! auth-relay
//!
//! Same-origin reverse proxy between a browser frontend and its API.
//!
//! ```text
//!     Browser ──▶ relay (/api/*, /verify) ──▶ upstream API
//!     Browser ◀── reissued Set-Cookie  ◀──── upstream Set-Cookie
//! ```
//!
//! Startup: config file → RELAY_* env → CLI flags → validate → logging
//! → metrics → signal handler → serve (plain or TLS).

use clap::Parser;
use std::net::SocketAddr;
use std::path::PathBuf;
use tokio::net::TcpListener;

use auth_relay::config::{self, validation::validate_config, ConfigError};
use auth_relay::cookies::EnvironmentMode;
use auth_relay::lifecycle::{signals, Shutdown};
use auth_relay::net::load_tls_config;
use auth_relay::observability::{logging, metrics};
use auth_relay::HttpServer;

#[derive(Parser, Debug)]
#[command(name = "auth-relay", version, about = "Same-origin API relay with cookie reissuing")]
struct Cli {
    /// Path to a TOML configuration file.
    #[arg(short, long, env = "RELAY_CONFIG")]
    config: Option<PathBuf>,

    /// Listen address, e.g. 127.0.0.1:3000.
    #[arg(long)]
    bind: Option<String>,

    /// Upstream API base URL.
    #[arg(long)]
    upstream: Option<String>,

    /// development or production.
    #[arg(long)]
    environment: Option<EnvironmentMode>,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    let mut config = config::load(cli.config.as_deref())?;
    if let Some(bind) = cli.bind {
        config.listener.bind_address = bind;
    }
    if let Some(upstream) = cli.upstream {
        config.upstream.base_url = upstream;
    }
    if let Some(environment) = cli.environment {
        config.environment = environment;
    }
    validate_config(&config).map_err(ConfigError::Validation)?;

    logging::init(&config.observability, config.environment);
    tracing::info!(version = env!("CARGO_PKG_VERSION"), "auth-relay starting");
    if config.environment.is_development() {
        tracing::warn!("Development mode: cookies are reissued without Domain or Secure");
    }

    if config.observability.metrics_enabled {
        let addr: SocketAddr = config.observability.metrics_address.parse()?;
        metrics::init_metrics(addr);
    }

    let shutdown = Shutdown::new();
    signals::spawn_signal_handler(shutdown.clone());

    let tls = config.listener.tls.clone();
    let bind_address = config.listener.bind_address.clone();
    let server = HttpServer::new(config)?;

    match tls {
        Some(tls) => {
            let tls_config = load_tls_config(&tls).await?;
            let addr: SocketAddr = bind_address.parse()?;
            server.run_tls(addr, tls_config, shutdown.subscribe()).await?;
        }
        None => {
            let listener = TcpListener::bind(&bind_address).await?;
            server.run(listener, shutdown.subscribe()).await?;
        }
    }

    tracing::info!("Shutdown complete");
    Ok(())
}

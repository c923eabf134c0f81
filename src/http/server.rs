//! HTTP server setup and configuration.
//!
//! # Responsibilities
//! - Create Axum Router with the API prefix, verify route and fallback
//! - Wire up middleware (tracing, body limit, request ID)
//! - Build the single upstream HTTP client
//! - Bind server to listener (plain or TLS) with graceful shutdown

use axum::{
    body::Body,
    http::StatusCode,
    response::IntoResponse,
    routing::{any, get},
    Router,
};
use axum_server::tls_rustls::RustlsConfig;
use hyper_util::{
    client::legacy::{connect::HttpConnector, Client},
    rt::TokioExecutor,
};
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;
use tokio::net::TcpListener;
use tokio::sync::broadcast;
use tower::ServiceBuilder;
use tower_http::{
    limit::RequestBodyLimitLayer,
    request_id::{PropagateRequestIdLayer, SetRequestIdLayer},
    trace::TraceLayer,
};

use crate::config::{ConfigError, RelayConfig, VerifyConfig};
use crate::config::validation::ValidationError;
use crate::cookies::EnvironmentMode;
use crate::http::forward::{forward_handler, Upstream};
use crate::http::request::{MakeRelayRequestId, X_REQUEST_ID};
use crate::http::verify::verify_handler;

/// Application state injected into handlers.
#[derive(Clone)]
pub struct AppState {
    pub client: Client<HttpConnector, Body>,
    pub upstream: Arc<Upstream>,
    pub verify: Arc<VerifyConfig>,
    pub mode: EnvironmentMode,
    pub request_timeout: Duration,
    pub max_body_size: usize,
    pub max_response_size: usize,
    /// Scheme the relay itself is served on, for X-Forwarded-Proto.
    pub scheme: &'static str,
}

/// HTTP server for the auth relay.
pub struct HttpServer {
    router: Router,
    config: RelayConfig,
}

impl HttpServer {
    /// Create a new HTTP server from a validated configuration.
    pub fn new(config: RelayConfig) -> Result<Self, ConfigError> {
        let upstream = Upstream::from_config(&config.upstream).map_err(|_| {
            ConfigError::Validation(vec![ValidationError::UpstreamUrl(config.upstream.base_url.clone())])
        })?;

        let mut connector = HttpConnector::new();
        connector.set_connect_timeout(Some(config.connect_timeout()));
        let client = Client::builder(TokioExecutor::new()).build(connector);

        let state = AppState {
            client,
            upstream: Arc::new(upstream),
            verify: Arc::new(config.verify.clone()),
            mode: config.environment,
            request_timeout: config.request_timeout(),
            max_body_size: config.security.max_body_size,
            max_response_size: config.security.max_response_size,
            scheme: if config.listener.tls.is_some() { "https" } else { "http" },
        };

        let router = Self::build_router(&config, state);
        Ok(Self { router, config })
    }

    /// Build the Axum router with all middleware layers.
    fn build_router(config: &RelayConfig, state: AppState) -> Router {
        let prefix = config.upstream.path_prefix.as_str();
        let mut router = if prefix == "/" {
            Router::new()
                .route("/", any(forward_handler))
                .route("/{*path}", any(forward_handler))
        } else {
            Router::new()
                .route(prefix, any(forward_handler))
                .route(&format!("{prefix}/{{*path}}"), any(forward_handler))
        };

        if config.verify.enabled {
            router = router.route(&config.verify.route, get(verify_handler));
        }

        router
            .fallback(not_found)
            .with_state(state)
            .layer(
                ServiceBuilder::new()
                    .layer(SetRequestIdLayer::new(X_REQUEST_ID, MakeRelayRequestId))
                    .layer(TraceLayer::new_for_http())
                    .layer(PropagateRequestIdLayer::new(X_REQUEST_ID))
                    .layer(RequestBodyLimitLayer::new(config.security.max_body_size)),
            )
    }

    /// Run the server, accepting connections on the given listener until
    /// `shutdown` fires.
    pub async fn run(
        self,
        listener: TcpListener,
        mut shutdown: broadcast::Receiver<()>,
    ) -> Result<(), std::io::Error> {
        let addr = listener.local_addr()?;
        self.log_start(addr);

        let app = self.router.into_make_service_with_connect_info::<SocketAddr>();
        axum::serve(listener, app)
            .with_graceful_shutdown(async move {
                let _ = shutdown.recv().await;
                tracing::info!("Shutdown signal received");
            })
            .await?;

        tracing::info!("HTTP server stopped");
        Ok(())
    }

    /// Run the server over TLS on `addr`.
    pub async fn run_tls(
        self,
        addr: SocketAddr,
        tls: RustlsConfig,
        mut shutdown: broadcast::Receiver<()>,
    ) -> Result<(), std::io::Error> {
        self.log_start(addr);

        let handle = axum_server::Handle::new();
        let signal = handle.clone();
        tokio::spawn(async move {
            let _ = shutdown.recv().await;
            tracing::info!("Shutdown signal received");
            signal.graceful_shutdown(Some(Duration::from_secs(10)));
        });

        axum_server::bind_rustls(addr, tls)
            .handle(handle)
            .serve(self.router.into_make_service_with_connect_info::<SocketAddr>())
            .await?;

        tracing::info!("HTTP server stopped");
        Ok(())
    }

    fn log_start(&self, addr: SocketAddr) {
        tracing::info!(
            address = %addr,
            upstream = %self.config.upstream.base_url,
            path_prefix = %self.config.upstream.path_prefix,
            environment = %self.config.environment,
            "HTTP server starting"
        );
    }
}

async fn not_found() -> impl IntoResponse {
    (StatusCode::NOT_FOUND, "No matching route found")
}

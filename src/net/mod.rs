//! Network layer subsystem.
//!
//! The relay accepts plain TCP through `tokio::net::TcpListener` or TLS
//! through `axum-server`; tls.rs loads the certificate material for the latter.

pub mod tls;

pub use tls::load_tls_config;

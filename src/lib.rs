//! Auth relay: a same-origin reverse proxy that reissues upstream cookies
//! for the browser's origin.

pub mod config;
pub mod cookies;
pub mod http;
pub mod lifecycle;
pub mod net;
pub mod observability;
pub mod security;

pub use config::RelayConfig;
pub use cookies::EnvironmentMode;
pub use http::HttpServer;
pub use lifecycle::Shutdown;

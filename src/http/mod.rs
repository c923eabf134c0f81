//! HTTP protocol handling subsystem.
//!
//! # Data Flow
//! ```text
//! TCP/TLS connection
//!     → server.rs (Axum setup, request ID, tracing, body limit)
//!     → forward.rs (API prefix: rewrite, single upstream attempt)
//!       or verify.rs (magic-link token exchange, redirects)
//!     → cookies (Set-Cookie reissued for the environment)
//!     → response.rs (error mapping)
//!     → Send to client
//! ```

pub mod forward;
pub mod request;
pub mod response;
pub mod server;
pub mod verify;

pub use request::X_REQUEST_ID;
pub use response::RelayError;
pub use server::{AppState, HttpServer};

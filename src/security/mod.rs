//! Security subsystem.
//!
//! # Data Flow
//! ```text
//! Inbound request:
//!     → tower-http body limit (413 on oversize bodies)
//!     → headers.rs (strip hop-by-hop, add X-Forwarded-*)
//!     → Forward to upstream
//!
//! Upstream response:
//!     → headers.rs (strip hop-by-hop)
//! ```

pub mod headers;

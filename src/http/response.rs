//! Response handling and error mapping.
//!
//! # Responsibilities
//! - Map relay failures to fixed HTTP responses
//! - Build redirects
//!
//! # Design Decisions
//! - Raw transport errors are logged, never sent to the caller
//! - Unreachable upstream results in 502 Bad Gateway
//! - Expired deadline results in 504 Gateway Timeout

use axum::http::header::{HeaderValue, LOCATION};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use http_body_util::LengthLimitError;
use std::error::Error as _;
use std::time::Duration;
use thiserror::Error;

/// Failures while relaying a request.
#[derive(Debug, Error)]
pub enum RelayError {
    #[error("upstream unreachable: {0}")]
    UpstreamUnreachable(#[source] hyper_util::client::legacy::Error),

    #[error("failed to read upstream response body: {0}")]
    UpstreamBody(#[source] axum::Error),

    #[error("upstream did not respond within {0:?}")]
    UpstreamTimeout(Duration),

    #[error("failed to read request body: {0}")]
    RequestBody(#[source] axum::Error),

    #[error("request body exceeds the size limit")]
    RequestTooLarge(#[source] axum::Error),

    #[error("invalid upstream target: {0}")]
    InvalidTarget(String),
}

impl RelayError {
    /// Classify a failed inbound body read.
    pub fn request_body(err: axum::Error) -> Self {
        if exceeds_limit(&err) {
            RelayError::RequestTooLarge(err)
        } else {
            RelayError::RequestBody(err)
        }
    }

    pub fn status(&self) -> StatusCode {
        match self {
            RelayError::UpstreamUnreachable(_)
            | RelayError::UpstreamBody(_)
            | RelayError::InvalidTarget(_) => StatusCode::BAD_GATEWAY,
            RelayError::UpstreamTimeout(_) => StatusCode::GATEWAY_TIMEOUT,
            RelayError::RequestBody(_) => StatusCode::BAD_REQUEST,
            RelayError::RequestTooLarge(_) => StatusCode::PAYLOAD_TOO_LARGE,
        }
    }

    /// Short label for metrics.
    pub fn kind(&self) -> &'static str {
        match self {
            RelayError::UpstreamUnreachable(_) => "unreachable",
            RelayError::UpstreamBody(_) => "upstream_body",
            RelayError::UpstreamTimeout(_) => "timeout",
            RelayError::RequestBody(_) => "request_body",
            RelayError::RequestTooLarge(_) => "request_too_large",
            RelayError::InvalidTarget(_) => "invalid_target",
        }
    }

    fn public_message(&self) -> &'static str {
        match self {
            RelayError::UpstreamTimeout(_) => "Upstream request timed out",
            RelayError::RequestBody(_) => "Failed to read request body",
            RelayError::RequestTooLarge(_) => "Request body too large",
            _ => "Upstream request failed",
        }
    }
}

fn exceeds_limit(err: &axum::Error) -> bool {
    let mut source = err.source();
    while let Some(e) = source {
        if e.is::<LengthLimitError>() {
            return true;
        }
        source = e.source();
    }
    false
}

impl IntoResponse for RelayError {
    fn into_response(self) -> Response {
        (self.status(), self.public_message()).into_response()
    }
}

/// `302 Found` to `location`.
pub fn found(location: &str) -> Response {
    match HeaderValue::from_str(location) {
        Ok(location) => (StatusCode::FOUND, [(LOCATION, location)]).into_response(),
        Err(_) => {
            tracing::error!(location = %location, "Redirect target is not a valid header value");
            StatusCode::INTERNAL_SERVER_ERROR.into_response()
        }
    }
}

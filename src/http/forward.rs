//! Request forwarding to the upstream API.
//!
//! # Responsibilities
//! - Rewrite inbound requests onto the configured upstream origin
//! - Send exactly one upstream request per inbound request
//! - Relay status and body verbatim; reissue cookies when present
//!
//! # Design Decisions
//! - Never retried: login-link issuance and similar calls are not idempotent
//! - The inbound body and the full upstream response are buffered inside one
//!   deadline, so a partial response is never forwarded
//! - Dropping the handler future (client disconnect, deadline) drops the
//!   in-flight upstream request with it

use axum::{
    body::{Body, Bytes},
    extract::{ConnectInfo, State},
    http::{header::{HOST, SET_COOKIE}, HeaderMap, Method, Request, StatusCode, Uri},
    response::{IntoResponse, Response},
};
use hyper_util::client::legacy::{connect::HttpConnector, Client};
use std::net::SocketAddr;
use std::time::Instant;
use url::{Position, Url};

use crate::config::UpstreamConfig;
use crate::cookies::{relay_set_cookies, EnvironmentMode, RelayReport};
use crate::http::request::request_id;
use crate::http::response::RelayError;
use crate::http::server::AppState;
use crate::observability::metrics;
use crate::security::headers::{add_forwarded, strip_hop_by_hop};

/// The upstream origin and how inbound paths map onto it.
#[derive(Debug, Clone)]
pub struct Upstream {
    base: Url,
    path_prefix: String,
    strip_prefix: bool,
    forwarded_headers: bool,
}

impl Upstream {
    pub fn from_config(config: &UpstreamConfig) -> Result<Self, url::ParseError> {
        Ok(Self {
            base: Url::parse(&config.base_url)?,
            path_prefix: config.path_prefix.clone(),
            strip_prefix: config.strip_prefix,
            forwarded_headers: config.forwarded_headers,
        })
    }

    pub fn forwarded_headers(&self) -> bool {
        self.forwarded_headers
    }

    /// Upstream URI for an inbound path and query. Only the path and query
    /// change; scheme and authority come from the base URL.
    pub fn target(&self, path: &str, query: Option<&str>) -> Result<Uri, RelayError> {
        let path = if self.strip_prefix {
            path.strip_prefix(self.path_prefix.as_str()).unwrap_or(path)
        } else {
            path
        };

        let mut target = String::from(&self.base[..Position::BeforePath]);
        target.push_str(self.base.path().trim_end_matches('/'));
        if !path.starts_with('/') {
            target.push('/');
        }
        target.push_str(path);
        if let Some(query) = query {
            target.push('?');
            target.push_str(query);
        }

        target
            .parse()
            .map_err(|e: axum::http::uri::InvalidUri| RelayError::InvalidTarget(e.to_string()))
    }

    /// Upstream URI for a fixed endpoint with URL-encoded query pairs.
    pub fn endpoint(&self, path: &str, query: &[(&str, &str)]) -> Result<Uri, RelayError> {
        let mut url = self.base.clone();
        url.set_path(&format!("{}{}", self.base.path().trim_end_matches('/'), path));
        if !query.is_empty() {
            url.query_pairs_mut().extend_pairs(query.iter().copied());
        }
        url.as_str()
            .parse()
            .map_err(|e: axum::http::uri::InvalidUri| RelayError::InvalidTarget(e.to_string()))
    }
}

/// A request on its way upstream.
#[derive(Debug, Clone)]
pub struct ForwardedRequest {
    pub method: Method,
    pub uri: Uri,
    pub headers: HeaderMap,
    pub body: Bytes,
}

impl ForwardedRequest {
    fn into_request(self) -> Request<Body> {
        let mut request = Request::new(Body::from(self.body));
        *request.method_mut() = self.method;
        *request.uri_mut() = self.uri;
        *request.headers_mut() = self.headers;
        request
    }
}

/// A fully buffered upstream response.
#[derive(Debug, Clone)]
pub struct ForwardedResponse {
    pub status: StatusCode,
    pub headers: HeaderMap,
    pub body: Bytes,
}

impl ForwardedResponse {
    pub fn has_set_cookie(&self) -> bool {
        self.headers.contains_key(SET_COOKIE)
    }

    /// Convert to the caller's response. Hop-by-hop headers are dropped and
    /// cookies, if any, are reissued for `mode`; status and body are untouched.
    pub fn into_relayed(mut self, mode: EnvironmentMode) -> (Response, RelayReport) {
        strip_hop_by_hop(&mut self.headers);
        let report = if self.has_set_cookie() {
            relay_set_cookies(&mut self.headers, mode)
        } else {
            RelayReport::default()
        };

        let mut response = Response::new(Body::from(self.body));
        *response.status_mut() = self.status;
        *response.headers_mut() = self.headers;
        (response, report)
    }
}

/// Send one request upstream and buffer up to `limit` bytes of the response.
/// Single attempt.
pub async fn send(
    client: &Client<HttpConnector, Body>,
    request: ForwardedRequest,
    limit: usize,
) -> Result<ForwardedResponse, RelayError> {
    let response = client
        .request(request.into_request())
        .await
        .map_err(RelayError::UpstreamUnreachable)?;

    let (parts, body) = response.into_parts();
    let body = axum::body::to_bytes(Body::new(body), limit)
        .await
        .map_err(RelayError::UpstreamBody)?;

    Ok(ForwardedResponse {
        status: parts.status,
        headers: parts.headers,
        body,
    })
}

/// Handler for every request under the API prefix.
pub async fn forward_handler(
    State(state): State<AppState>,
    ConnectInfo(peer): ConnectInfo<SocketAddr>,
    request: Request<Body>,
) -> Response {
    let start = Instant::now();
    let request_id = request_id(request.headers());
    let method = request.method().clone();
    let path = request.uri().path().to_string();

    tracing::debug!(
        request_id = %request_id,
        method = %method,
        path = %path,
        "Proxying request"
    );

    let outcome = tokio::time::timeout(state.request_timeout, relay(&state, peer, request)).await;
    let response = match outcome {
        Ok(Ok(response)) => response,
        Ok(Err(e)) => {
            tracing::error!(request_id = %request_id, path = %path, error = %e, "Upstream error");
            metrics::record_upstream_error(e.kind());
            e.into_response()
        }
        Err(_) => {
            let e = RelayError::UpstreamTimeout(state.request_timeout);
            tracing::error!(request_id = %request_id, path = %path, error = %e, "Upstream timeout");
            metrics::record_upstream_error(e.kind());
            e.into_response()
        }
    };

    metrics::record_request(method.as_str(), response.status().as_u16(), start);
    response
}

async fn relay(state: &AppState, peer: SocketAddr, request: Request<Body>) -> Result<Response, RelayError> {
    let (parts, body) = request.into_parts();
    let body = axum::body::to_bytes(body, state.max_body_size)
        .await
        .map_err(RelayError::request_body)?;

    let uri = state.upstream.target(parts.uri.path(), parts.uri.query())?;

    let mut headers = parts.headers;
    strip_hop_by_hop(&mut headers);
    if state.upstream.forwarded_headers() {
        add_forwarded(&mut headers, peer.ip(), state.scheme);
    }
    // The client sets Host from the target URI.
    headers.remove(HOST);

    let upstream = send(
        &state.client,
        ForwardedRequest {
            method: parts.method,
            uri,
            headers,
            body,
        },
        state.max_response_size,
    )
    .await?;

    let status = upstream.status;
    let (response, report) = upstream.into_relayed(state.mode);
    if report != RelayReport::default() {
        tracing::info!(
            status = %status,
            reissued = report.reissued,
            skipped = report.skipped,
            environment = %state.mode,
            "Reissued upstream cookies"
        );
    }
    Ok(response)
}

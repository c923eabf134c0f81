//! Magic-link verification.
//!
//! The login email links to `{route}?token=...` on the frontend origin. The
//! relay exchanges the token with the upstream API and moves the session
//! cookies it returns onto the frontend origin before redirecting.

use axum::{
    body::Bytes,
    extract::{Query, State},
    http::{header::{COOKIE, SET_COOKIE}, HeaderMap, Method},
    response::{IntoResponse, Response},
};
use serde::Deserialize;
use std::time::Instant;

use crate::cookies::relay_set_cookies;
use crate::http::forward::{send, ForwardedRequest};
use crate::http::request::{request_id, X_REQUEST_ID};
use crate::http::response::{found, RelayError};
use crate::http::server::AppState;
use crate::observability::metrics;

#[derive(Debug, Deserialize)]
pub struct VerifyParams {
    token: Option<String>,
}

pub async fn verify_handler(
    State(state): State<AppState>,
    Query(params): Query<VerifyParams>,
    headers: HeaderMap,
) -> Response {
    let start = Instant::now();
    let request_id = request_id(&headers);

    let token = match params.token.as_deref().map(str::trim) {
        Some(token) if !token.is_empty() => token.to_string(),
        _ => {
            tracing::debug!(request_id = %request_id, "Verification without token");
            return found(&state.verify.missing_token_redirect);
        }
    };

    let outcome = tokio::time::timeout(state.request_timeout, verify(&state, &token, &headers)).await;
    let response = match outcome {
        Ok(Ok(response)) => response,
        Ok(Err(e)) => {
            tracing::error!(request_id = %request_id, error = %e, "Verification upstream error");
            metrics::record_upstream_error(e.kind());
            e.into_response()
        }
        Err(_) => {
            let e = RelayError::UpstreamTimeout(state.request_timeout);
            tracing::error!(request_id = %request_id, error = %e, "Verification upstream timeout");
            metrics::record_upstream_error(e.kind());
            e.into_response()
        }
    };

    metrics::record_request(Method::GET.as_str(), response.status().as_u16(), start);
    response
}

async fn verify(state: &AppState, token: &str, inbound: &HeaderMap) -> Result<Response, RelayError> {
    let uri = state
        .upstream
        .endpoint(&state.verify.upstream_path, &[("token", token)])?;

    let mut headers = HeaderMap::new();
    for name in [COOKIE, X_REQUEST_ID] {
        for value in inbound.get_all(&name) {
            headers.append(name.clone(), value.clone());
        }
    }

    let upstream = send(
        &state.client,
        ForwardedRequest {
            method: Method::GET,
            uri,
            headers,
            body: Bytes::new(),
        },
        state.max_response_size,
    )
    .await?;

    if !upstream.status.is_success() {
        tracing::info!(status = %upstream.status, "Verification rejected by upstream");
        return Ok(found(&state.verify.failure_redirect));
    }

    let mut cookies = HeaderMap::new();
    for value in upstream.headers.get_all(SET_COOKIE) {
        cookies.append(SET_COOKIE, value.clone());
    }
    let report = relay_set_cookies(&mut cookies, state.mode);
    tracing::info!(
        reissued = report.reissued,
        skipped = report.skipped,
        environment = %state.mode,
        "Verification accepted"
    );

    let mut response = found(&state.verify.success_redirect);
    for value in cookies.get_all(SET_COOKIE) {
        response.headers_mut().append(SET_COOKIE, value.clone());
    }
    Ok(response)
}

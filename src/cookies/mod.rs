//! Cookie relay subsystem.
//!
//! # Data Flow
//! ```text
//! upstream Set-Cookie value(s)
//!     → splitter.rs (one raw string per instruction, folded or not)
//!     → parser.rs (CookieDescriptor, malformed instructions skipped)
//!     → policy.rs (environment rules → ReissuedCookie)
//!     → reissue.rs (one Set-Cookie line on the outbound response)
//! ```
//!
//! # Design Decisions
//! - Every stage is a pure function; only the last one touches headers
//! - One outbound line per upstream instruction, order preserved
//! - Failures are per cookie: a bad instruction never aborts the response

pub mod descriptor;
pub mod parser;
pub mod policy;
pub mod reissue;
pub mod splitter;

use axum::http::header::SET_COOKIE;
use axum::http::HeaderMap;

pub use descriptor::{CookieAttributes, CookieDescriptor, SameSite};
pub use parser::{parse_set_cookie, CookieParseError};
pub use policy::{apply_policy, EnvironmentMode, ReissuedCookie};
pub use splitter::split_set_cookie;

use crate::observability::metrics;

/// Outcome of relaying one response's cookies.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RelayReport {
    pub reissued: usize,
    pub skipped: usize,
}

/// Replace every `Set-Cookie` header in `headers` with its reissued form.
///
/// Headers other than `Set-Cookie` are left alone. Returns how many cookies
/// were written and how many were skipped as malformed.
pub fn relay_set_cookies(headers: &mut HeaderMap, mode: EnvironmentMode) -> RelayReport {
    let mut report = RelayReport::default();

    let mut raw_values = Vec::new();
    for value in headers.get_all(SET_COOKIE) {
        match value.to_str() {
            Ok(v) => raw_values.push(v.to_string()),
            Err(_) => {
                tracing::warn!("Skipping non-ASCII Set-Cookie header");
                report.skipped += 1;
                metrics::record_cookie_skipped("encoding");
            }
        }
    }
    headers.remove(SET_COOKIE);

    for raw in split_set_cookie(&raw_values) {
        let descriptor = match parse_set_cookie(&raw) {
            Ok(d) => d,
            Err(e) => {
                tracing::warn!(error = %e, "Skipping malformed Set-Cookie instruction");
                report.skipped += 1;
                metrics::record_cookie_skipped("malformed");
                continue;
            }
        };

        let reissued = apply_policy(&descriptor, mode);
        match reissue::append_set_cookie(headers, &reissued) {
            Ok(()) => {
                report.reissued += 1;
                metrics::record_cookie_reissued(mode);
            }
            Err(e) => {
                tracing::warn!(cookie = %reissued.name, error = %e, "Reissued cookie is not a valid header value");
                report.skipped += 1;
                metrics::record_cookie_skipped("header_value");
            }
        }
    }

    report
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::header::{CONTENT_TYPE, HeaderValue};

    fn outbound(headers: &HeaderMap) -> Vec<CookieDescriptor> {
        headers
            .get_all(SET_COOKIE)
            .iter()
            .map(|v| parse_set_cookie(v.to_str().unwrap()).unwrap())
            .collect()
    }

    #[test]
    fn relays_multi_value_headers_in_order() {
        let mut headers = HeaderMap::new();
        headers.append(SET_COOKIE, HeaderValue::from_static("a=1; Secure; Domain=api.example.com"));
        headers.append(SET_COOKIE, HeaderValue::from_static("b=2; Expires=Wed, 21 Oct 2015 07:28:00 GMT"));
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));

        let report = relay_set_cookies(&mut headers, EnvironmentMode::Development);
        assert_eq!(report, RelayReport { reissued: 2, skipped: 0 });

        let cookies = outbound(&headers);
        assert_eq!(cookies.len(), 2);
        assert_eq!(cookies[0].name(), "a");
        assert_eq!(cookies[0].attributes().domain, None);
        assert!(!cookies[0].attributes().secure);
        assert_eq!(cookies[1].name(), "b");
        assert!(cookies[1].attributes().expires.is_some());
        assert_eq!(headers.get(CONTENT_TYPE).unwrap(), "application/json");
    }

    #[test]
    fn relays_folded_header() {
        let mut headers = HeaderMap::new();
        headers.insert(
            SET_COOKIE,
            HeaderValue::from_static("a=1; Expires=Wed, 21 Oct 2015 07:28:00 GMT, b=2; Path=/"),
        );

        let report = relay_set_cookies(&mut headers, EnvironmentMode::Production);
        assert_eq!(report.reissued, 2);

        let cookies = outbound(&headers);
        assert_eq!(cookies[0].name(), "a");
        assert!(cookies[0].attributes().expires.is_some());
        assert_eq!(cookies[1].name(), "b");
    }

    #[test]
    fn folded_rfc850_expires_is_kept() {
        let mut headers = HeaderMap::new();
        headers.insert(
            SET_COOKIE,
            HeaderValue::from_static("a=1; Expires=Sunday, 06-Nov-94 08:49:37 GMT, b=2"),
        );

        let report = relay_set_cookies(&mut headers, EnvironmentMode::Production);
        assert_eq!(report.reissued, 2);

        let cookies = outbound(&headers);
        assert_eq!(
            cookies[0].attributes().expires,
            Some(time::macros::datetime!(1994-11-06 08:49:37 UTC))
        );
        assert_eq!(cookies[1].name(), "b");
    }

    #[test]
    fn malformed_instruction_only_skips_itself() {
        let mut headers = HeaderMap::new();
        headers.append(SET_COOKIE, HeaderValue::from_static("good=1"));
        headers.append(SET_COOKIE, HeaderValue::from_static("HttpOnly; Path=/"));
        headers.append(SET_COOKIE, HeaderValue::from_static("also_good=2; Max-Age=nope"));

        let report = relay_set_cookies(&mut headers, EnvironmentMode::Production);
        assert_eq!(report, RelayReport { reissued: 2, skipped: 1 });

        let cookies = outbound(&headers);
        assert_eq!(cookies[0].name(), "good");
        assert_eq!(cookies[1].name(), "also_good");
        assert_eq!(cookies[1].attributes().max_age, None);
    }

    #[test]
    fn no_set_cookie_leaves_headers_untouched() {
        let mut headers = HeaderMap::new();
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("text/plain"));
        let before = headers.clone();

        let report = relay_set_cookies(&mut headers, EnvironmentMode::Development);
        assert_eq!(report, RelayReport::default());
        assert_eq!(headers, before);
    }
}

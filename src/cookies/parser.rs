//! Set-Cookie attribute parsing.
//!
//! # Responsibilities
//! - Parse one `name=value; attr=val; flag` instruction into a [`CookieDescriptor`]
//! - Interpret the recognized attributes; keep unknown ones verbatim
//!
//! # Design Decisions
//! - A missing `=` in the leading segment (or an empty name) rejects the whole
//!   instruction
//! - A malformed attribute value (non-integer `Max-Age`, unknown `SameSite`
//!   literal, unreadable `Expires` date) drops only that attribute
//! - Values are split on the first `=` only; cookie values may contain `=`

use cookie::Cookie;
use thiserror::Error;
use time::macros::format_description;
use time::{OffsetDateTime, PrimitiveDateTime};

use crate::cookies::descriptor::{AttributeKey, CookieAttributes, CookieDescriptor, SameSite};

/// A cookie-setting instruction that can't be reissued at all.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CookieParseError {
    /// No `=` before the first `;`.
    #[error("missing '=' in cookie pair: {0:?}")]
    MissingPair(String),

    #[error("empty cookie name: {0:?}")]
    EmptyName(String),
}

/// Parse a single `Set-Cookie` instruction.
pub fn parse_set_cookie(raw: &str) -> Result<CookieDescriptor, CookieParseError> {
    let mut segments = raw.split(';');
    // split always yields at least one segment
    let pair = segments.next().unwrap_or_default();

    let (name, value) = pair
        .split_once('=')
        .ok_or_else(|| CookieParseError::MissingPair(raw.to_string()))?;
    let name = name.trim();
    if name.is_empty() {
        return Err(CookieParseError::EmptyName(raw.to_string()));
    }

    let mut attributes = CookieAttributes::default();
    for segment in segments {
        let segment = segment.trim();
        if segment.is_empty() {
            continue;
        }
        let (key, value) = match segment.split_once('=') {
            Some((k, v)) => (k.trim(), Some(v.trim())),
            None => (segment, None),
        };
        apply_attribute(&mut attributes, name, key, value);
    }

    Ok(CookieDescriptor::new(name, value.trim(), attributes))
}

fn apply_attribute(attributes: &mut CookieAttributes, cookie: &str, key: &str, value: Option<&str>) {
    let Some(known) = AttributeKey::lookup(key) else {
        attributes
            .extensions
            .push((key.to_string(), value.map(str::to_string)));
        return;
    };

    match known {
        // Flags: presence means true, whatever follows an `=`.
        AttributeKey::HttpOnly => attributes.http_only = true,
        AttributeKey::Secure => attributes.secure = true,
        AttributeKey::Partitioned => attributes.partitioned = true,
        AttributeKey::Domain => attributes.domain = non_empty(value),
        AttributeKey::Path => attributes.path = non_empty(value),
        AttributeKey::MaxAge => match value.map(str::parse::<i64>) {
            Some(Ok(seconds)) => attributes.max_age = Some(seconds),
            _ => drop_attribute(cookie, key, value),
        },
        AttributeKey::SameSite => match value.map(str::parse::<SameSite>) {
            Some(Ok(same_site)) => attributes.same_site = Some(same_site),
            _ => drop_attribute(cookie, key, value),
        },
        AttributeKey::Expires => match value.and_then(parse_http_date) {
            Some(expires) => attributes.expires = Some(expires),
            None => drop_attribute(cookie, key, value),
        },
    }
}

fn drop_attribute(cookie: &str, key: &str, value: Option<&str>) {
    tracing::debug!(
        cookie = %cookie,
        attribute = %key,
        value = ?value,
        "Dropping malformed cookie attribute"
    );
}

fn non_empty(value: Option<&str>) -> Option<String> {
    value.filter(|v| !v.is_empty()).map(str::to_string)
}

/// Parse an `Expires` date.
///
/// IMF-fixdate, RFC 850 and asctime are read by the `cookie` crate, including
/// the common `21-Oct-2015` variant. An IMF-fixdate whose weekday disagrees with
/// the date is still accepted, as browsers do.
pub fn parse_http_date(value: &str) -> Option<OffsetDateTime> {
    Cookie::parse(format!("x=; Expires={value}"))
        .ok()
        .and_then(|cookie| cookie.expires_datetime())
        .or_else(|| parse_ignoring_weekday(value))
}

fn parse_ignoring_weekday(value: &str) -> Option<OffsetDateTime> {
    let date = match value.split_once(',') {
        Some((_, rest)) => rest,
        None => value,
    };
    let date = date.trim();
    let date = date
        .strip_suffix("GMT")
        .or_else(|| date.strip_suffix("UTC"))
        .unwrap_or(date)
        .trim();

    let format = format_description!(
        "[day] [month repr:short case_sensitive:false] [year] [hour]:[minute]:[second]"
    );
    PrimitiveDateTime::parse(date, format)
        .ok()
        .map(PrimitiveDateTime::assume_utc)
}

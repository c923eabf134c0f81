//! Structured representation of a single `Set-Cookie` instruction.
//!
//! A [`CookieDescriptor`] is an immutable record of what upstream actually
//! sent. The environment policy never edits one; it derives a fresh
//! [`ReissuedCookie`](crate::cookies::policy::ReissuedCookie) instead.

use std::fmt;
use std::str::FromStr;
use time::OffsetDateTime;

/// The `SameSite` attribute, normalized.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SameSite {
    None,
    Lax,
    Strict,
}

impl FromStr for SameSite {
    type Err = ();

    /// Case-insensitive. Any literal other than `none`, `lax` or `strict` is rejected.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "none" => Ok(SameSite::None),
            "lax" => Ok(SameSite::Lax),
            "strict" => Ok(SameSite::Strict),
            _ => Err(()),
        }
    }
}

impl fmt::Display for SameSite {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SameSite::None => write!(f, "None"),
            SameSite::Lax => write!(f, "Lax"),
            SameSite::Strict => write!(f, "Strict"),
        }
    }
}

/// Attribute keys the relay interprets.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AttributeKey {
    Domain,
    Path,
    Expires,
    MaxAge,
    HttpOnly,
    Secure,
    SameSite,
    Partitioned,
}

impl AttributeKey {
    /// Look up an attribute key, ignoring case. Both the wire spelling
    /// (`HttpOnly`, `SameSite`) and the hyphenated one (`http-only`) are accepted.
    pub fn lookup(key: &str) -> Option<Self> {
        match key.trim().to_ascii_lowercase().as_str() {
            "domain" => Some(AttributeKey::Domain),
            "path" => Some(AttributeKey::Path),
            "expires" => Some(AttributeKey::Expires),
            "max-age" | "maxage" => Some(AttributeKey::MaxAge),
            "httponly" | "http-only" => Some(AttributeKey::HttpOnly),
            "secure" => Some(AttributeKey::Secure),
            "samesite" | "same-site" => Some(AttributeKey::SameSite),
            "partitioned" => Some(AttributeKey::Partitioned),
            _ => None,
        }
    }
}

/// Parsed cookie attributes. Every field is independently optional.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CookieAttributes {
    pub domain: Option<String>,
    pub path: Option<String>,
    pub expires: Option<OffsetDateTime>,
    pub max_age: Option<i64>,
    pub http_only: bool,
    pub secure: bool,
    pub same_site: Option<SameSite>,
    pub partitioned: bool,
    /// Unrecognized attributes, key and value verbatim. Kept for diagnostics,
    /// never written downstream.
    pub extensions: Vec<(String, Option<String>)>,
}

/// One cookie-setting instruction as received from upstream.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CookieDescriptor {
    name: String,
    value: String,
    attributes: CookieAttributes,
}

impl CookieDescriptor {
    pub fn new(name: impl Into<String>, value: impl Into<String>, attributes: CookieAttributes) -> Self {
        Self {
            name: name.into(),
            value: value.into(),
            attributes,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn value(&self) -> &str {
        &self.value
    }

    pub fn attributes(&self) -> &CookieAttributes {
        &self.attributes
    }
}

//! Environment-aware cookie attribute policy.
//!
//! # Responsibilities
//! - Decide the final attribute set for a reissued cookie
//! - Make cross-origin session cookies usable on plain-HTTP `localhost`
//!   in development
//!
//! # Rules
//! ```text
//! attribute      development              production
//! domain         omitted (host-only)      upstream, verbatim
//! secure         false                    upstream
//! same_site      Lax                      upstream (normalized) or absent
//! path           upstream, default "/"    upstream, default "/"
//! others         upstream                 upstream
//! ```

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use time::OffsetDateTime;

use crate::cookies::descriptor::{CookieDescriptor, SameSite};

/// Deployment mode, resolved once at startup.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum EnvironmentMode {
    Development,
    #[default]
    Production,
}

impl EnvironmentMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            EnvironmentMode::Development => "development",
            EnvironmentMode::Production => "production",
        }
    }

    pub fn is_development(&self) -> bool {
        matches!(self, EnvironmentMode::Development)
    }
}

impl fmt::Display for EnvironmentMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error for an unrecognized environment name.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown environment {0:?} (expected \"development\" or \"production\")")]
pub struct UnknownEnvironment(pub String);

impl FromStr for EnvironmentMode {
    type Err = UnknownEnvironment;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "development" | "dev" => Ok(EnvironmentMode::Development),
            "production" | "prod" => Ok(EnvironmentMode::Production),
            _ => Err(UnknownEnvironment(s.to_string())),
        }
    }
}

/// The final form of a cookie, ready to be written to the browser.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReissuedCookie {
    pub name: String,
    pub value: String,
    pub domain: Option<String>,
    pub path: String,
    pub expires: Option<OffsetDateTime>,
    pub max_age: Option<i64>,
    pub http_only: bool,
    pub secure: bool,
    pub same_site: Option<SameSite>,
    pub partitioned: bool,
}

/// Apply the environment policy to a parsed cookie. Pure; the descriptor is not touched.
pub fn apply_policy(cookie: &CookieDescriptor, mode: EnvironmentMode) -> ReissuedCookie {
    let attrs = cookie.attributes();

    let (domain, secure, same_site) = match mode {
        EnvironmentMode::Development => (None, false, Some(SameSite::Lax)),
        EnvironmentMode::Production => (attrs.domain.clone(), attrs.secure, attrs.same_site),
    };

    ReissuedCookie {
        name: cookie.name().to_string(),
        value: cookie.value().to_string(),
        domain,
        path: attrs.path.clone().unwrap_or_else(|| "/".to_string()),
        expires: attrs.expires,
        max_age: attrs.max_age,
        http_only: attrs.http_only,
        secure,
        same_site,
        partitioned: attrs.partitioned,
    }
}

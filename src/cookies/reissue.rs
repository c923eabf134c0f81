//! Writing reissued cookies onto the outbound response.

use axum::http::header::{InvalidHeaderValue, SET_COOKIE};
use axum::http::{HeaderMap, HeaderValue};
use cookie::Cookie;

use crate::cookies::descriptor::SameSite;
use crate::cookies::policy::ReissuedCookie;

/// Build the `cookie` crate representation. `Secure`, `HttpOnly` and
/// `Partitioned` are always set explicitly so nothing is implied on output.
/// A leading `.` on the domain is not written; browsers ignore it anyway.
pub fn to_cookie(reissued: &ReissuedCookie) -> Cookie<'static> {
    let mut builder = Cookie::build((reissued.name.clone(), reissued.value.clone()))
        .path(reissued.path.clone())
        .http_only(reissued.http_only)
        .secure(reissued.secure)
        .partitioned(reissued.partitioned);

    if let Some(domain) = &reissued.domain {
        builder = builder.domain(domain.clone());
    }
    if let Some(same_site) = reissued.same_site {
        builder = builder.same_site(match same_site {
            SameSite::None => cookie::SameSite::None,
            SameSite::Lax => cookie::SameSite::Lax,
            SameSite::Strict => cookie::SameSite::Strict,
        });
    }
    if let Some(seconds) = reissued.max_age {
        builder = builder.max_age(time::Duration::seconds(seconds));
    }
    if let Some(expires) = reissued.expires {
        builder = builder.expires(expires);
    }

    builder.build()
}

/// The `Set-Cookie` header value for a reissued cookie.
pub fn set_cookie_value(reissued: &ReissuedCookie) -> String {
    to_cookie(reissued).to_string()
}

/// Append exactly one `Set-Cookie` line for `reissued`.
pub fn append_set_cookie(headers: &mut HeaderMap, reissued: &ReissuedCookie) -> Result<(), InvalidHeaderValue> {
    let value = HeaderValue::from_str(&set_cookie_value(reissued))?;
    headers.append(SET_COOKIE, value);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cookies::parser::parse_set_cookie;
    use crate::cookies::policy::{apply_policy, EnvironmentMode};

    fn reissue(raw: &str, mode: EnvironmentMode) -> String {
        set_cookie_value(&apply_policy(&parse_set_cookie(raw).unwrap(), mode))
    }

    #[test]
    fn production_round_trip_preserves_cookie() {
        let raw = "session=abc123; Domain=example.com; Path=/app; Max-Age=3600; \
                   Expires=Wed, 21 Oct 2015 07:28:00 GMT; HttpOnly; Secure; SameSite=Strict; Partitioned";
        let original = parse_set_cookie(raw).unwrap();
        let written = reissue(raw, EnvironmentMode::Production);
        let reparsed = parse_set_cookie(&written).unwrap();

        assert_eq!(reparsed.name(), original.name());
        assert_eq!(reparsed.value(), original.value());
        assert_eq!(reparsed.attributes(), original.attributes());
    }

    #[test]
    fn production_policy_is_idempotent() {
        let raw = "id=42; Path=/; HttpOnly; Secure; SameSite=Lax; Max-Age=60";
        let once = apply_policy(&parse_set_cookie(raw).unwrap(), EnvironmentMode::Production);
        let twice = apply_policy(
            &parse_set_cookie(&set_cookie_value(&once)).unwrap(),
            EnvironmentMode::Production,
        );
        assert_eq!(once, twice);
    }

    #[test]
    fn development_output_drops_domain_and_secure() {
        let written = reissue(
            "session=abc123; HttpOnly; Secure; SameSite=None; Domain=api.example.com; Path=/",
            EnvironmentMode::Development,
        );
        assert!(written.starts_with("session=abc123"));
        assert!(!written.contains("Domain"));
        assert!(!written.contains("Secure"));

        let reparsed = parse_set_cookie(&written).unwrap();
        let attrs = reparsed.attributes();
        assert!(attrs.http_only);
        assert_eq!(attrs.same_site, Some(SameSite::Lax));
        assert_eq!(attrs.path.as_deref(), Some("/"));
        assert_eq!(attrs.domain, None);
        assert!(!attrs.secure);
    }

    #[test]
    fn secure_is_not_implied_by_same_site_none() {
        let written = reissue("a=1; SameSite=None", EnvironmentMode::Production);
        let reparsed = parse_set_cookie(&written).unwrap();
        assert_eq!(reparsed.attributes().same_site, Some(SameSite::None));
        assert!(!reparsed.attributes().secure);
    }

    #[test]
    fn leading_dot_in_domain_is_dropped() {
        let written = reissue("s=1; Domain=.example.com; Path=/", EnvironmentMode::Production);
        let reparsed = parse_set_cookie(&written).unwrap();
        assert_eq!(reparsed.attributes().domain.as_deref(), Some("example.com"));
    }

    #[test]
    fn unknown_attributes_are_not_written() {
        let written = reissue("a=1; Priority=High", EnvironmentMode::Production);
        assert!(!written.contains("Priority"));
    }

    #[test]
    fn appends_one_line_per_cookie_in_order() {
        let mut headers = HeaderMap::new();
        for raw in ["first=1", "second=2", "third=3"] {
            let cookie = apply_policy(&parse_set_cookie(raw).unwrap(), EnvironmentMode::Production);
            append_set_cookie(&mut headers, &cookie).unwrap();
        }
        let names: Vec<_> = headers
            .get_all(SET_COOKIE)
            .iter()
            .map(|v| parse_set_cookie(v.to_str().unwrap()).unwrap().name().to_string())
            .collect();
        assert_eq!(names, ["first", "second", "third"]);
    }
}

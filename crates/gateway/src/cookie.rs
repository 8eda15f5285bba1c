//! The `session_token` cookie.
//!
//! The browser never sees the bearer token outside this `HttpOnly` cookie;
//! the proxy reads it back and turns it into an `Authorization` header.

use axum::http::header::COOKIE;
use axum::http::{HeaderMap, HeaderValue};

pub const SESSION_COOKIE: &str = "session_token";

/// Cookie lifetime when a login response carries no `expires_in`.
pub const LOGIN_DEFAULT_MAX_AGE_SECS: i64 = 30 * 24 * 60 * 60;

/// Cookie lifetime when a refresh response carries no `expires_in`.
pub const REFRESH_DEFAULT_MAX_AGE_SECS: i64 = 7 * 24 * 60 * 60;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SameSite {
    /// Proxy-issued cookies.
    Strict,
    /// Cookies set on a top-level navigation such as the sign-in callback.
    Lax,
}

impl SameSite {
    fn as_str(self) -> &'static str {
        match self {
            Self::Strict => "Strict",
            Self::Lax => "Lax",
        }
    }
}

/// `Set-Cookie` value carrying a session token.
///
/// Returns `None` if the token contains bytes that cannot appear in a
/// cookie value.
pub fn session_cookie(
    token: &str,
    max_age_secs: i64,
    same_site: SameSite,
    secure: bool,
) -> Option<HeaderValue> {
    if token.is_empty() || !token.bytes().all(is_cookie_octet) {
        return None;
    }
    let mut value = format!(
        "{SESSION_COOKIE}={token}; Path=/; Max-Age={}; HttpOnly; SameSite={}",
        max_age_secs.max(0),
        same_site.as_str()
    );
    if secure {
        value.push_str("; Secure");
    }
    HeaderValue::from_str(&value).ok()
}

/// `Set-Cookie` value that deletes the session cookie.
pub fn clear_session_cookie(secure: bool) -> HeaderValue {
    if secure {
        HeaderValue::from_static(
            "session_token=; Path=/; Max-Age=0; HttpOnly; SameSite=Strict; Secure",
        )
    } else {
        HeaderValue::from_static("session_token=; Path=/; Max-Age=0; HttpOnly; SameSite=Strict")
    }
}

/// Read the session token from the request's `Cookie` headers.
pub fn read_session(headers: &HeaderMap) -> Option<String> {
    headers
        .get_all(COOKIE)
        .iter()
        .filter_map(|value| value.to_str().ok())
        .flat_map(|value| value.split(';'))
        .filter_map(|pair| pair.trim().split_once('='))
        .find(|(name, _)| *name == SESSION_COOKIE)
        .map(|(_, value)| value.trim().to_string())
        .filter(|value| !value.is_empty())
}

/// RFC 6265 `cookie-octet`.
fn is_cookie_octet(b: u8) -> bool {
    matches!(b, 0x21 | 0x23..=0x2B | 0x2D..=0x3A | 0x3C..=0x5B | 0x5D..=0x7E)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn strict_cookie_attributes() {
        let value = session_cookie("abc.def", 3600, SameSite::Strict, false).unwrap();
        assert_eq!(
            value.to_str().unwrap(),
            "session_token=abc.def; Path=/; Max-Age=3600; HttpOnly; SameSite=Strict"
        );
    }

    #[test]
    fn secure_lax_cookie() {
        let value = session_cookie("t", 60, SameSite::Lax, true).unwrap();
        let value = value.to_str().unwrap();
        assert!(value.contains("SameSite=Lax"));
        assert!(value.ends_with("; Secure"));
    }

    #[test]
    fn token_with_separators_is_refused() {
        assert!(session_cookie("a;b", 60, SameSite::Strict, false).is_none());
        assert!(session_cookie("a b", 60, SameSite::Strict, false).is_none());
        assert!(session_cookie("", 60, SameSite::Strict, false).is_none());
    }

    #[test]
    fn clearing_sets_zero_max_age() {
        let value = clear_session_cookie(false);
        assert!(value.to_str().unwrap().contains("Max-Age=0"));
    }

    #[test]
    fn reads_session_among_other_cookies() {
        let mut headers = HeaderMap::new();
        headers.append(COOKIE, HeaderValue::from_static("theme=dark"));
        headers.append(
            COOKIE,
            HeaderValue::from_static("lang=en; session_token=xyz ; other=1"),
        );
        assert_eq!(read_session(&headers).as_deref(), Some("xyz"));
    }

    #[test]
    fn missing_or_empty_session_is_none() {
        let mut headers = HeaderMap::new();
        assert_eq!(read_session(&headers), None);
        headers.insert(COOKIE, HeaderValue::from_static("session_token="));
        assert_eq!(read_session(&headers), None);
    }
}

//! `/api/*` forwarding to the REST API.
//!
//! The browser talks only to the gateway. Each request is replayed against
//! `{upstream}/{path}` with the session cookie turned into a bearer token,
//! and the upstream response is relayed with cookie and hop-by-hop headers
//! removed. Login and refresh responses additionally set the session cookie;
//! logout always clears it.

use axum::body::Bytes;
use axum::extract::{OriginalUri, RawQuery, State};
use axum::http::header::{ACCEPT, ACCEPT_ENCODING, AUTHORIZATION, CONTENT_TYPE, SET_COOKIE};
use axum::http::{HeaderMap, HeaderName, HeaderValue, Method, StatusCode};
use axum::response::{IntoResponse, Response};
use serde_json::Value;

use crate::cookie::{
    clear_session_cookie, read_session, session_cookie, SameSite, LOGIN_DEFAULT_MAX_AGE_SECS,
    REFRESH_DEFAULT_MAX_AGE_SECS,
};
use crate::error::GatewayError;
use crate::state::GatewayState;

pub const LOGIN_PATH: &str = "v1/users/auth/login";
pub const REFRESH_PATH: &str = "v1/users/auth/refresh";
pub const LOGOUT_PATH: &str = "v1/users/auth/logout";
pub const REGISTER_PATH: &str = "v1/users/auth/register";

/// Upstream response headers never relayed to the browser.
const STRIPPED_RESPONSE_HEADERS: &[&str] = &[
    "set-cookie",
    "content-length",
    "content-encoding",
    "transfer-encoding",
    "connection",
    "keep-alive",
    "proxy-authenticate",
    "proxy-authorization",
    "te",
    "trailer",
    "upgrade",
];

/// Request headers copied to the upstream call. Everything else, cookies
/// included, stays at the gateway.
const FORWARDED_REQUEST_HEADERS: &[&str] = &["content-type", "accept", "x-request-id"];

/// The relayed pieces of an upstream response.
struct Upstream {
    status: StatusCode,
    headers: HeaderMap,
    body: Bytes,
}

/// ANY /api/{*path}
///
/// The path is forwarded exactly as the browser encoded it.
pub async fn forward(
    State(state): State<GatewayState>,
    OriginalUri(uri): OriginalUri,
    RawQuery(query): RawQuery,
    method: Method,
    headers: HeaderMap,
    body: Bytes,
) -> Response {
    let path = match upstream_path(uri.path()) {
        Ok(path) => path.to_string(),
        Err(err) => return err.into_response(),
    };

    if path == LOGOUT_PATH {
        return logout(&state, method, query.as_deref(), &headers, body).await;
    }

    let upstream = match call_upstream(&state, &method, &path, query.as_deref(), &headers, body)
        .await
    {
        Ok(upstream) => upstream,
        Err(err) => return err.into_response(),
    };

    let fallback_max_age = match path.as_str() {
        LOGIN_PATH => Some(LOGIN_DEFAULT_MAX_AGE_SECS),
        REFRESH_PATH => Some(REFRESH_DEFAULT_MAX_AGE_SECS),
        _ => None,
    };

    let cookie = fallback_max_age
        .filter(|_| upstream.status.is_success())
        .and_then(|fallback| {
            let secure = state.config.is_production();
            cookie_from_session_body(&upstream.body, fallback, secure)
        });

    let mut response = relay(upstream);
    if let Some(cookie) = cookie {
        tracing::info!(path = %path, "Session cookie issued");
        response.headers_mut().append(SET_COOKIE, cookie);
    }
    response
}

/// The part of a raw `/api/...` request path sent upstream, still
/// percent-encoded. Dot segments, literal or encoded, are refused since the
/// upstream URL would collapse them.
pub fn upstream_path(raw: &str) -> Result<&str, GatewayError> {
    let path = raw
        .strip_prefix("/api/")
        .ok_or_else(|| GatewayError::BadRequest("Expected an /api/ path".into()))?
        .trim_start_matches('/');

    let dot_segment = path.split('/').any(|segment| {
        let segment = segment.to_ascii_lowercase().replace("%2e", ".");
        segment == "." || segment == ".."
    });
    if dot_segment {
        return Err(GatewayError::BadRequest(
            "Path segments '.' and '..' are not allowed".into(),
        ));
    }
    Ok(path)
}

/// Best-effort upstream logout. The cookie is cleared whatever happens.
async fn logout(
    state: &GatewayState,
    method: Method,
    query: Option<&str>,
    headers: &HeaderMap,
    body: Bytes,
) -> Response {
    let mut response =
        match call_upstream(state, &method, LOGOUT_PATH, query, headers, body).await {
            Ok(upstream) => relay(upstream),
            Err(GatewayError::Upstream(err)) => {
                tracing::warn!(error = %err, "Upstream logout failed; clearing session anyway");
                StatusCode::NO_CONTENT.into_response()
            }
            Err(err) => err.into_response(),
        };
    response
        .headers_mut()
        .append(SET_COOKIE, clear_session_cookie(state.config.is_production()));
    response
}

async fn call_upstream(
    state: &GatewayState,
    method: &Method,
    path: &str,
    query: Option<&str>,
    headers: &HeaderMap,
    body: Bytes,
) -> Result<Upstream, GatewayError> {
    let mut url = state.upstream(path)?;
    if let Some(query) = query.filter(|q| !q.is_empty()) {
        url.push('?');
        url.push_str(query);
    }

    let mut outgoing = HeaderMap::new();
    for name in FORWARDED_REQUEST_HEADERS {
        if let Some(value) = headers.get(*name) {
            outgoing.insert(HeaderName::from_static(*name), value.clone());
        }
    }
    if !outgoing.contains_key(CONTENT_TYPE) && !body.is_empty() {
        outgoing.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
    }
    if !outgoing.contains_key(ACCEPT) {
        outgoing.insert(ACCEPT, HeaderValue::from_static("application/json"));
    }
    // Relayed bodies are passed through byte for byte.
    outgoing.insert(ACCEPT_ENCODING, HeaderValue::from_static("identity"));

    if path != REGISTER_PATH {
        if let Some(token) = read_session(headers) {
            if let Ok(value) = HeaderValue::from_str(&format!("Bearer {token}")) {
                outgoing.insert(AUTHORIZATION, value);
            }
        }
    }

    let response = state
        .http
        .request(method.clone(), &url)
        .headers(outgoing)
        .body(body)
        .send()
        .await?;

    let status = response.status();
    let headers = response.headers().clone();
    let body = response.bytes().await?;
    tracing::debug!(%method, path, status = status.as_u16(), "Proxied request");

    Ok(Upstream {
        status,
        headers,
        body,
    })
}

/// Build the browser response, dropping headers that must not cross the proxy.
fn relay(upstream: Upstream) -> Response {
    let mut headers = upstream.headers;
    strip_response_headers(&mut headers);

    let mut response = (upstream.status, upstream.body).into_response();
    // The body conversion sets its own content-type; use upstream's.
    response.headers_mut().remove(CONTENT_TYPE);
    response.headers_mut().extend(headers);
    response
}

pub fn strip_response_headers(headers: &mut HeaderMap) {
    for name in STRIPPED_RESPONSE_HEADERS {
        headers.remove(*name);
    }
}

/// Session cookie from a `{data: {access_token, expires_in}}` body.
///
/// `None` when the body has no usable token.
pub fn cookie_from_session_body(
    body: &[u8],
    fallback_max_age: i64,
    secure: bool,
) -> Option<HeaderValue> {
    let json: Value = serde_json::from_slice(body).ok()?;
    let data = json.get("data")?;
    let token = data.get("access_token")?.as_str()?;
    let max_age = data
        .get("expires_in")
        .and_then(Value::as_i64)
        .filter(|secs| *secs > 0)
        .unwrap_or(fallback_max_age);
    session_cookie(token, max_age, SameSite::Strict, secure)
}

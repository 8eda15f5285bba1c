mod common;

use axum::body::Body;
use axum::http::{Request, StatusCode};
use common::{body_bytes, build_gateway, closed_upstream, send, set_cookies, spawn_upstream, test_config};
use serde_json::Value;

#[tokio::test]
async fn forwards_method_path_query_and_body_with_bearer() {
    let (upstream, recorder) = spawn_upstream().await;
    let app = build_gateway(test_config(Some(upstream)));

    let request = Request::builder()
        .method("POST")
        .uri("/api/v1/scans?source=camera")
        .header("cookie", "theme=dark; session_token=abc123")
        .header("content-type", "application/json")
        .body(Body::from(r#"{"token":"t"}"#))
        .unwrap();
    let response = send(app, request).await;
    assert_eq!(response.status(), StatusCode::CREATED);

    let seen = recorder.last();
    assert_eq!(seen.method, "POST");
    assert_eq!(seen.path, "v1/scans");
    assert_eq!(seen.query.as_deref(), Some("source=camera"));
    assert_eq!(seen.authorization.as_deref(), Some("Bearer abc123"));
    assert_eq!(seen.cookie, None);
    assert_eq!(&seen.body[..], br#"{"token":"t"}"#);
}

#[tokio::test]
async fn encoded_path_is_forwarded_still_encoded() {
    let (upstream, recorder) = spawn_upstream().await;
    let app = build_gateway(test_config(Some(upstream)));

    let request = Request::builder()
        .uri("/api/v1/skills%3Finjected=1")
        .body(Body::empty())
        .unwrap();
    send(app, request).await;

    let seen = recorder.last();
    assert_eq!(seen.raw_path, "v1/skills%3Finjected=1");
    assert_eq!(seen.query, None);
}

#[tokio::test]
async fn encoded_dot_segments_are_refused() {
    let (upstream, recorder) = spawn_upstream().await;
    let app = build_gateway(test_config(Some(upstream)));

    let request = Request::builder()
        .uri("/api/v1/groups/%2e%2e/dashboard/admin")
        .body(Body::empty())
        .unwrap();
    let response = send(app, request).await;

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert!(recorder.requests().is_empty());
}

#[tokio::test]
async fn registration_is_sent_without_authorization() {
    let (upstream, recorder) = spawn_upstream().await;
    let app = build_gateway(test_config(Some(upstream)));

    let request = Request::builder()
        .method("POST")
        .uri("/api/v1/users/auth/register")
        .header("cookie", "session_token=stale")
        .body(Body::from("{}"))
        .unwrap();
    send(app, request).await;

    assert_eq!(recorder.last().authorization, None);
}

#[tokio::test]
async fn upstream_cookies_never_reach_the_browser() {
    let (upstream, _recorder) = spawn_upstream().await;
    let app = build_gateway(test_config(Some(upstream)));

    let request = Request::builder()
        .uri("/api/v1/skills")
        .body(Body::empty())
        .unwrap();
    let response = send(app, request).await;

    assert!(set_cookies(&response).is_empty());
    assert_eq!(response.headers()["x-upstream"], "echo");
    assert_eq!(response.headers()["content-type"], "application/json");
    let json: Value = serde_json::from_slice(&body_bytes(response).await).unwrap();
    assert_eq!(json["data"]["ok"], true);
}

#[tokio::test]
async fn login_sets_session_cookie_and_relays_body_unchanged() {
    let (upstream, _recorder) = spawn_upstream().await;
    let app = build_gateway(test_config(Some(upstream)));

    let request = Request::builder()
        .method("POST")
        .uri("/api/v1/users/auth/login")
        .body(Body::from(r#"{"username":"m","password":"p"}"#))
        .unwrap();
    let response = send(app, request).await;
    assert_eq!(response.status(), StatusCode::OK);

    let cookies = set_cookies(&response);
    assert_eq!(cookies.len(), 1, "{cookies:?}");
    assert_eq!(
        cookies[0],
        "session_token=tok-login; Path=/; Max-Age=3600; HttpOnly; SameSite=Strict"
    );

    let json: Value = serde_json::from_slice(&body_bytes(response).await).unwrap();
    assert_eq!(json["data"]["access_token"], "tok-login");
    assert_eq!(json["data"]["user"]["role"], "mentor");
}

#[tokio::test]
async fn refresh_without_expires_in_uses_seven_days() {
    let (upstream, _recorder) = spawn_upstream().await;
    let app = build_gateway(test_config(Some(upstream)));

    let request = Request::builder()
        .method("POST")
        .uri("/api/v1/users/auth/refresh")
        .header("cookie", "session_token=old")
        .body(Body::empty())
        .unwrap();
    let response = send(app, request).await;

    let cookies = set_cookies(&response);
    assert_eq!(cookies.len(), 1);
    assert!(cookies[0].starts_with("session_token=tok-refresh;"));
    assert!(cookies[0].contains("Max-Age=604800"));
}

#[tokio::test]
async fn production_cookies_are_secure() {
    let (upstream, _recorder) = spawn_upstream().await;
    let mut config = test_config(Some(upstream));
    config.app_env = "production".into();
    let app = build_gateway(config);

    let request = Request::builder()
        .method("POST")
        .uri("/api/v1/users/auth/login")
        .body(Body::from("{}"))
        .unwrap();
    let response = send(app, request).await;
    assert!(set_cookies(&response)[0].ends_with("; Secure"));
}

#[tokio::test]
async fn logout_clears_cookie() {
    let (upstream, recorder) = spawn_upstream().await;
    let app = build_gateway(test_config(Some(upstream)));

    let request = Request::builder()
        .method("POST")
        .uri("/api/v1/users/auth/logout")
        .header("cookie", "session_token=abc")
        .body(Body::empty())
        .unwrap();
    let response = send(app, request).await;

    assert_eq!(response.status(), StatusCode::NO_CONTENT);
    assert_eq!(recorder.last().authorization.as_deref(), Some("Bearer abc"));
    let cookies = set_cookies(&response);
    assert_eq!(cookies.len(), 1);
    assert!(cookies[0].contains("Max-Age=0"));
}

#[tokio::test]
async fn logout_clears_cookie_when_upstream_is_down() {
    let app = build_gateway(test_config(Some(closed_upstream().await)));

    let request = Request::builder()
        .method("POST")
        .uri("/api/v1/users/auth/logout")
        .header("cookie", "session_token=abc")
        .body(Body::empty())
        .unwrap();
    let response = send(app, request).await;

    assert_eq!(response.status(), StatusCode::NO_CONTENT);
    assert!(set_cookies(&response)[0].starts_with("session_token=;"));
}

#[tokio::test]
async fn unreachable_upstream_is_bad_gateway() {
    let app = build_gateway(test_config(Some(closed_upstream().await)));

    let request = Request::builder()
        .uri("/api/v1/skills")
        .body(Body::empty())
        .unwrap();
    let response = send(app, request).await;

    assert_eq!(response.status(), StatusCode::BAD_GATEWAY);
    let json: Value = serde_json::from_slice(&body_bytes(response).await).unwrap();
    assert!(json["error"].as_str().unwrap().starts_with("Bad Gateway"));
}

#[tokio::test]
async fn missing_upstream_fails_closed() {
    let app = build_gateway(test_config(None));

    let request = Request::builder()
        .uri("/api/v1/skills")
        .body(Body::empty())
        .unwrap();
    let response = send(app, request).await;

    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    let json: Value = serde_json::from_slice(&body_bytes(response).await).unwrap();
    assert!(json["error"].is_string());
}

#[tokio::test]
async fn failed_login_sets_no_cookie() {
    let (upstream, _recorder) = spawn_upstream().await;
    let app = build_gateway(test_config(Some(upstream)));

    let request = Request::builder()
        .method("POST")
        .uri("/api/v1/users/auth/bad-login")
        .body(Body::from("{}"))
        .unwrap();
    let response = send(app, request).await;

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    assert!(set_cookies(&response).is_empty());
}

mod common;

use assert_matches::assert_matches;
use axum::http::{HeaderMap, StatusCode};
use axum::routing::{get, post};
use axum::{Json, Router};
use serde_json::{json, Value};
use vocatrack_client::{ApiClient, ClientError};
use vocatrack_core::enrollment::{EnrollmentStatus, ScanEligibility};

use common::{fast_config, serve};

fn user() -> Value {
    json!({
        "id": 5,
        "username": "ada",
        "email": "ada@example.com",
        "first_name": "Ada",
        "last_name": "Obi",
        "matric_number": "MAT/001",
        "role": "student",
        "role_id": 3,
        "is_active": true,
        "last_login_at": null,
        "created_at": "2026-10-01T00:00:00Z"
    })
}

async fn login() -> Json<Value> {
    Json(json!({
        "data": {
            "access_token": "tok",
            "token_type": "Bearer",
            "expires_in": 3600,
            "user": user()
        }
    }))
}

async fn me(headers: HeaderMap) -> (StatusCode, Json<Value>) {
    match headers.get("authorization").and_then(|v| v.to_str().ok()) {
        Some("Bearer tok") => (StatusCode::OK, Json(json!({ "data": user() }))),
        _ => (
            StatusCode::UNAUTHORIZED,
            Json(json!({ "error": "Missing token", "code": "UNAUTHORIZED" })),
        ),
    }
}

#[tokio::test]
async fn login_then_me_with_bearer() {
    let router = Router::new()
        .route("/api/v1/users/auth/login", post(login))
        .route("/api/v1/users/auth/me", get(me));
    let base = serve(router).await;
    let anonymous = ApiClient::new(&fast_config(&base)).unwrap();

    let session = anonymous.login("ada", "Password123").await.unwrap();
    assert_eq!(session.expires_in, 3600);
    assert_eq!(session.user.role, "student");

    let err = anonymous.me().await.unwrap_err();
    assert_matches!(
        err,
        ClientError::Api { status: StatusCode::UNAUTHORIZED, code: Some(ref code), .. } if code == "UNAUTHORIZED"
    );

    let authed = anonymous.with_token(session.access_token);
    assert_eq!(authed.me().await.unwrap().username, "ada");
}

#[tokio::test]
async fn enrollment_decodes_into_domain_enums() {
    let router = Router::new().route(
        "/api/v1/enrollments/me",
        get(|| async {
            Json(json!({
                "data": {
                    "enrollment": {
                        "id": 1, "student_id": 5, "skill_id": 2, "group_id": null,
                        "status": "paid", "payment_status": "paid",
                        "payment_reference": "PAY-1"
                    },
                    "eligibility": {
                        "state": "group_assignment_required",
                        "status": "paid",
                        "payment_status": "paid"
                    }
                }
            }))
        }),
    );
    let base = serve(router).await;
    let client = common::client(&fast_config(&base));

    let mine = client.my_enrollment().await.unwrap();
    assert_eq!(mine.enrollment.unwrap().status, EnrollmentStatus::Paid);
    assert_matches!(mine.eligibility, ScanEligibility::GroupAssignmentRequired { .. });
}

#[tokio::test]
async fn unknown_status_is_a_schema_error() {
    let router = Router::new().route(
        "/api/v1/enrollments/me",
        get(|| async {
            Json(json!({
                "data": {
                    "enrollment": {
                        "id": 1, "student_id": 5, "skill_id": 2, "group_id": null,
                        "status": "archived", "payment_status": "paid",
                        "payment_reference": null
                    },
                    "eligibility": { "state": "no_active_enrollment" }
                }
            }))
        }),
    );
    let base = serve(router).await;
    let client = common::client(&fast_config(&base));

    assert_matches!(
        client.my_enrollment().await,
        Err(ClientError::Schema { endpoint, .. }) if endpoint == "v1/enrollments/me"
    );
}

#[tokio::test]
async fn null_active_session_decodes_as_none() {
    let router = Router::new().route(
        "/api/v1/academic-sessions/active",
        get(|| async { Json(json!({ "data": null })) }),
    );
    let base = serve(router).await;
    let client = common::client(&fast_config(&base));
    assert_eq!(client.active_session().await.unwrap(), None);
}

#[tokio::test]
async fn unreachable_server_is_retryable() {
    let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);

    let client = common::client(&fast_config(&format!("http://{addr}/api")));
    let err = client.skills().await.unwrap_err();
    assert!(err.is_retryable(), "{err:?}");
}

//! Shared helpers for API integration tests.
#![allow(dead_code)]

use axum::body::Body;
use axum::http::{Request, StatusCode};
use axum::Router;
use chrono::{Duration, Utc};
use http_body_util::BodyExt;
use serde_json::Value;
use sqlx::PgPool;
use tower::ServiceExt;
use vocatrack_api::auth::jwt::{generate_token, JwtConfig};
use vocatrack_api::auth::password::hash_password;
use vocatrack_api::config::{AttendanceConfig, QrConfig, ServerConfig};
use vocatrack_api::router::build_app_router;
use vocatrack_api::state::AppState;
use vocatrack_core::types::DbId;
use vocatrack_db::models::academic_session::{AcademicSession, CreateAcademicSession};
use vocatrack_db::models::group::{CreateGroup, SkillGroup};
use vocatrack_db::models::skill::{CreateSkill, Skill};
use vocatrack_db::models::user::{CreateUser, User};
use vocatrack_db::repositories::{
    AcademicSessionRepo, AssignOutcome, EnrollmentRepo, GroupRepo, RoleRepo, SkillRepo, UserRepo,
};

pub const TEST_PASSWORD: &str = "Password123";
pub const QR_SECRET: &str = "test-qr-signing-secret";

pub fn test_config() -> ServerConfig {
    ServerConfig {
        host: "127.0.0.1".into(),
        port: 0,
        cors_origins: vec!["http://localhost:3001".into()],
        request_timeout_secs: 30,
        shutdown_timeout_secs: 5,
        jwt: JwtConfig {
            secret: "test-jwt-secret-for-integration-tests".into(),
            access_token_expiry_mins: 60,
            refresh_token_expiry_days: 7,
        },
        attendance: AttendanceConfig {
            default_required_scans: 3,
        },
        qr: QrConfig {
            default_validity_mins: 60,
            max_validity_mins: 1440,
            signing_secret: QR_SECRET.into(),
        },
        password_min_length: 8,
    }
}

/// Build the full application router against a test database.
pub fn build_test_app(pool: PgPool) -> Router {
    let config = test_config();
    let state = AppState {
        pool,
        config: std::sync::Arc::new(config.clone()),
    };
    build_app_router(state, &config)
}

// ---------------------------------------------------------------------------
// Requests
// ---------------------------------------------------------------------------

pub async fn body_json(response: axum::response::Response) -> Value {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    if bytes.is_empty() {
        return Value::Null;
    }
    serde_json::from_slice(&bytes).unwrap()
}

async fn send(
    app: Router,
    method: &str,
    uri: &str,
    token: Option<&str>,
    body: Option<&Value>,
) -> axum::response::Response {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some(token) = token {
        builder = builder.header("authorization", format!("Bearer {token}"));
    }
    let request = match body {
        Some(body) => builder
            .header("content-type", "application/json")
            .body(Body::from(body.to_string()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    };
    app.oneshot(request).await.unwrap()
}

pub async fn get(app: Router, uri: &str) -> axum::response::Response {
    send(app, "GET", uri, None, None).await
}

pub async fn get_auth(app: Router, uri: &str, token: &str) -> axum::response::Response {
    send(app, "GET", uri, Some(token), None).await
}

pub async fn post_json(app: Router, uri: &str, body: &Value) -> axum::response::Response {
    send(app, "POST", uri, None, Some(body)).await
}

pub async fn post_json_auth(
    app: Router,
    uri: &str,
    body: &Value,
    token: &str,
) -> axum::response::Response {
    send(app, "POST", uri, Some(token), Some(body)).await
}

pub async fn post_auth(app: Router, uri: &str, token: &str) -> axum::response::Response {
    send(app, "POST", uri, Some(token), None).await
}

pub async fn put_json_auth(
    app: Router,
    uri: &str,
    body: &Value,
    token: &str,
) -> axum::response::Response {
    send(app, "PUT", uri, Some(token), Some(body)).await
}

pub async fn delete_auth(app: Router, uri: &str, token: &str) -> axum::response::Response {
    send(app, "DELETE", uri, Some(token), None).await
}

/// Assert the status and return the parsed body.
pub async fn expect_status(response: axum::response::Response, status: StatusCode) -> Value {
    let actual = response.status();
    let body = body_json(response).await;
    assert_eq!(actual, status, "unexpected status, body: {body}");
    body
}

// ---------------------------------------------------------------------------
// Fixtures
// ---------------------------------------------------------------------------

/// Insert a user with [`TEST_PASSWORD`] and the named role.
pub async fn create_user(pool: &PgPool, username: &str, role: &str) -> User {
    let role = RoleRepo::find_by_name(pool, role)
        .await
        .unwrap()
        .expect("role is seeded");
    UserRepo::create(
        pool,
        &CreateUser {
            username: username.to_string(),
            email: format!("{username}@example.com"),
            password_hash: hash_password(TEST_PASSWORD).unwrap(),
            first_name: username.to_string(),
            last_name: "Tester".to_string(),
            matric_number: None,
            role_id: role.id,
        },
    )
    .await
    .unwrap()
}

/// Mint an access token the way login does.
pub fn token_for(user_id: DbId, role: &str) -> String {
    let config = test_config();
    generate_token(user_id, role, 3600, &config.jwt).unwrap()
}

/// A user plus a bearer token for them.
pub struct Actor {
    pub user: User,
    pub token: String,
}

pub async fn actor(pool: &PgPool, username: &str, role: &str) -> Actor {
    let user = create_user(pool, username, role).await;
    let token = token_for(user.id, role);
    Actor { user, token }
}

pub async fn create_session(pool: &PgPool, name: &str) -> AcademicSession {
    let now = Utc::now();
    AcademicSessionRepo::create(
        pool,
        &CreateAcademicSession {
            name: name.to_string(),
            starts_at: now - Duration::days(30),
            ends_at: now + Duration::days(150),
        },
    )
    .await
    .unwrap()
}

pub async fn create_skill(pool: &PgPool, session_id: DbId, title: &str) -> Skill {
    SkillRepo::create(
        pool,
        &CreateSkill {
            academic_session_id: session_id,
            title: title.to_string(),
            description: None,
            price_minor: Some(2_500_000),
        },
    )
    .await
    .unwrap()
}

pub async fn create_group(
    pool: &PgPool,
    skill_id: DbId,
    group_number: i32,
    mentor_id: Option<DbId>,
) -> SkillGroup {
    GroupRepo::create(
        pool,
        skill_id,
        &CreateGroup {
            group_number,
            mentor_id,
            practical_date: None,
            max_student_capacity: 10,
            location: None,
        },
    )
    .await
    .unwrap()
}

/// Select, pay, and assign a student to a group.
pub async fn enroll_assigned(pool: &PgPool, student_id: DbId, skill_id: DbId, group_id: DbId) {
    let enrollment = EnrollmentRepo::create(pool, student_id, skill_id).await.unwrap();
    EnrollmentRepo::mark_paid(pool, enrollment.id, student_id, "PAY-1", Utc::now())
        .await
        .unwrap()
        .expect("selected enrollment can be paid");
    match EnrollmentRepo::assign_to_group(pool, enrollment.id, group_id, Utc::now())
        .await
        .unwrap()
    {
        AssignOutcome::Assigned(_) => {}
        other => panic!("assignment failed: {other:?}"),
    }
}

/// A running session with one skill and one group led by `mentor`.
pub struct Campus {
    pub session: AcademicSession,
    pub skill: Skill,
    pub group: SkillGroup,
    pub mentor: Actor,
    pub admin: Actor,
}

pub async fn campus(pool: &PgPool) -> Campus {
    let session = create_session(pool, "2026/2027").await;
    let session = AcademicSessionRepo::start(pool, session.id)
        .await
        .unwrap()
        .unwrap();
    let mentor = actor(pool, "mentor1", "mentor").await;
    let admin = actor(pool, "admin1", "admin").await;
    let skill = create_skill(pool, session.id, "Welding").await;
    let group = create_group(pool, skill.id, 1, Some(mentor.user.id)).await;
    Campus {
        session,
        skill,
        group,
        mentor,
        admin,
    }
}

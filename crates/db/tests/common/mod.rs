//! Shared fixtures for database integration tests.
#![allow(dead_code)]

use chrono::{Duration, Utc};
use sqlx::PgPool;
use uuid::Uuid;
use vocatrack_core::types::DbId;
use vocatrack_db::models::academic_session::{AcademicSession, CreateAcademicSession};
use vocatrack_db::models::enrollment::Enrollment;
use vocatrack_db::models::group::{CreateGroup, SkillGroup};
use vocatrack_db::models::qr_token::{CreateQrToken, QrToken};
use vocatrack_db::models::scan_event::{RecordOutcome, RecordScan};
use vocatrack_db::models::skill::{CreateSkill, Skill};
use vocatrack_db::models::user::{CreateUser, User};
use vocatrack_db::repositories::{
    AcademicSessionRepo, AssignOutcome, EnrollmentRepo, GroupRepo, QrTokenRepo, RoleRepo,
    ScanEventRepo, SkillRepo, UserRepo,
};

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
            password_hash: "not-a-real-hash".to_string(),
            first_name: username.to_string(),
            last_name: "Tester".to_string(),
            matric_number: None,
            role_id: role.id,
        },
    )
    .await
    .unwrap()
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
    capacity: i32,
    mentor_id: Option<DbId>,
) -> SkillGroup {
    GroupRepo::create(
        pool,
        skill_id,
        &CreateGroup {
            group_number,
            mentor_id,
            practical_date: None,
            max_student_capacity: capacity,
            location: Some("Workshop A".to_string()),
        },
    )
    .await
    .unwrap()
}

/// Select, pay, and assign in one go.
pub async fn enroll_assigned(
    pool: &PgPool,
    student_id: DbId,
    skill_id: DbId,
    group_id: DbId,
) -> Enrollment {
    let enrollment = EnrollmentRepo::create(pool, student_id, skill_id).await.unwrap();
    EnrollmentRepo::mark_paid(pool, enrollment.id, student_id, "PAY-1", Utc::now())
        .await
        .unwrap()
        .expect("selected enrollment can be paid");
    match EnrollmentRepo::assign_to_group(pool, enrollment.id, group_id, Utc::now())
        .await
        .unwrap()
    {
        AssignOutcome::Assigned(e) => e,
        other => panic!("assignment failed: {other:?}"),
    }
}

pub async fn issue_token(
    pool: &PgPool,
    group_id: DbId,
    mentor_id: Option<DbId>,
    valid_for: Duration,
    points_per_scan: i32,
) -> QrToken {
    QrTokenRepo::create(
        pool,
        &CreateQrToken {
            token: vocatrack_core::qr_token::generate_token(),
            group_id,
            mentor_id,
            label: None,
            points_per_scan,
            expires_at: Utc::now() + valid_for,
        },
    )
    .await
    .unwrap()
}

pub async fn record(pool: &PgPool, student_id: DbId, token: &str) -> RecordOutcome {
    record_with_id(pool, student_id, token, Uuid::new_v4()).await
}

pub async fn record_with_id(
    pool: &PgPool,
    student_id: DbId,
    token: &str,
    request_id: Uuid,
) -> RecordOutcome {
    ScanEventRepo::record(
        pool,
        &RecordScan {
            student_id,
            token: token.to_string(),
            client_request_id: request_id,
            device_info: None,
            now: Utc::now(),
            default_required: 3,
        },
    )
    .await
    .unwrap()
}

/// A running session with one skill, one group of `capacity`, and a mentor.
pub struct Campus {
    pub session: AcademicSession,
    pub skill: Skill,
    pub group: SkillGroup,
    pub mentor: User,
}

pub async fn campus(pool: &PgPool, capacity: i32) -> Campus {
    let session = create_session(pool, "2026/2027").await;
    let session = AcademicSessionRepo::start(pool, session.id)
        .await
        .unwrap()
        .unwrap();
    let mentor = create_user(pool, "mentor1", "mentor").await;
    let skill = create_skill(pool, session.id, "Welding").await;
    let group = create_group(pool, skill.id, 1, capacity, Some(mentor.id)).await;
    Campus {
        session,
        skill,
        group,
        mentor,
    }
}

//! Enrollment lifecycle through the HTTP surface.

mod common;

use axum::http::StatusCode;
use common::{actor, campus, expect_status, get_auth, post_auth, post_json_auth};
use serde_json::json;
use sqlx::PgPool;

#[sqlx::test(migrations = "../../db/migrations")]
async fn select_pay_assign_makes_student_eligible(pool: PgPool) {
    let c = campus(&pool).await;
    let student = actor(&pool, "ada", "student").await;
    let app = common::build_test_app(pool);

    let me = get_auth(app.clone(), "/api/v1/enrollments/me", &student.token).await;
    let me = expect_status(me, StatusCode::OK).await;
    assert_eq!(me["data"]["eligibility"]["state"], "no_active_enrollment");
    assert!(me["data"]["enrollment"].is_null());

    let created = post_json_auth(
        app.clone(),
        "/api/v1/enrollments",
        &json!({"skill_id": c.skill.id}),
        &student.token,
    )
    .await;
    let created = expect_status(created, StatusCode::CREATED).await;
    assert_eq!(created["data"]["status"], "selected");
    let id = created["data"]["id"].as_i64().unwrap();

    let paid = post_json_auth(
        app.clone(),
        &format!("/api/v1/enrollments/{id}/pay"),
        &json!({"payment_reference": "PAY-2026-0001"}),
        &student.token,
    )
    .await;
    let paid = expect_status(paid, StatusCode::OK).await;
    assert_eq!(paid["data"]["status"], "paid");

    let me = get_auth(app.clone(), "/api/v1/enrollments/me", &student.token).await;
    let me = expect_status(me, StatusCode::OK).await;
    assert_eq!(me["data"]["eligibility"]["state"], "group_assignment_required");
    assert_eq!(me["data"]["eligibility"]["status"], "paid");

    let assigned = post_json_auth(
        app.clone(),
        &format!("/api/v1/enrollments/{id}/assign"),
        &json!({"group_id": c.group.id}),
        &c.admin.token,
    )
    .await;
    let assigned = expect_status(assigned, StatusCode::OK).await;
    assert_eq!(assigned["data"]["status"], "assigned");
    assert_eq!(assigned["data"]["group_id"], c.group.id);

    let me = get_auth(app, "/api/v1/enrollments/me", &student.token).await;
    let me = expect_status(me, StatusCode::OK).await;
    assert_eq!(me["data"]["eligibility"]["state"], "eligible");
    assert_eq!(me["data"]["eligibility"]["group_id"], c.group.id);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn second_open_enrollment_conflicts(pool: PgPool) {
    let c = campus(&pool).await;
    let student = actor(&pool, "ada", "student").await;
    let app = common::build_test_app(pool);
    let body = json!({"skill_id": c.skill.id});

    let first = post_json_auth(app.clone(), "/api/v1/enrollments", &body, &student.token).await;
    assert_eq!(first.status(), StatusCode::CREATED);
    let second = post_json_auth(app, "/api/v1/enrollments", &body, &student.token).await;
    assert_eq!(second.status(), StatusCode::CONFLICT);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn paying_someone_elses_enrollment_is_not_found(pool: PgPool) {
    let c = campus(&pool).await;
    let ada = actor(&pool, "ada", "student").await;
    let bola = actor(&pool, "bola", "student").await;
    let app = common::build_test_app(pool);

    let created = post_json_auth(
        app.clone(),
        "/api/v1/enrollments",
        &json!({"skill_id": c.skill.id}),
        &ada.token,
    )
    .await;
    let created = expect_status(created, StatusCode::CREATED).await;
    let id = created["data"]["id"].as_i64().unwrap();

    let uri = format!("/api/v1/enrollments/{id}/pay");
    let body = json!({"payment_reference": "PAY-1"});
    let response = post_json_auth(app.clone(), &uri, &body, &bola.token).await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);

    let response = post_json_auth(app.clone(), &uri, &body, &ada.token).await;
    assert_eq!(response.status(), StatusCode::OK);
    let response = post_json_auth(app, &uri, &body, &ada.token).await;
    assert_eq!(response.status(), StatusCode::CONFLICT);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn assigning_into_a_full_group_conflicts(pool: PgPool) {
    let c = campus(&pool).await;
    let ada = actor(&pool, "ada", "student").await;
    let bola = actor(&pool, "bola", "student").await;
    let app = common::build_test_app(pool);

    let group = post_json_auth(
        app.clone(),
        &format!("/api/v1/skills/{}/groups", c.skill.id),
        &json!({"group_number": 9, "max_student_capacity": 1, "mentor_id": c.mentor.user.id}),
        &c.admin.token,
    )
    .await;
    let group = expect_status(group, StatusCode::CREATED).await;
    let group_id = group["data"]["id"].as_i64().unwrap();

    let mut statuses = Vec::new();
    for student in [&ada, &bola] {
        let created = post_json_auth(
            app.clone(),
            "/api/v1/enrollments",
            &json!({"skill_id": c.skill.id}),
            &student.token,
        )
        .await;
        let id = expect_status(created, StatusCode::CREATED).await["data"]["id"]
            .as_i64()
            .unwrap();
        let paid = post_json_auth(
            app.clone(),
            &format!("/api/v1/enrollments/{id}/pay"),
            &json!({"payment_reference": "PAY-1"}),
            &student.token,
        )
        .await;
        assert_eq!(paid.status(), StatusCode::OK);
        let assigned = post_json_auth(
            app.clone(),
            &format!("/api/v1/enrollments/{id}/assign"),
            &json!({"group_id": group_id}),
            &c.admin.token,
        )
        .await;
        statuses.push(assigned.status());
    }
    assert_eq!(statuses, vec![StatusCode::OK, StatusCode::CONFLICT]);

    let stats = get_auth(
        app,
        &format!("/api/v1/groups/{group_id}/statistics"),
        &c.mentor.token,
    )
    .await;
    let stats = expect_status(stats, StatusCode::OK).await;
    assert_eq!(stats["data"]["current_member_count"], 1);
    assert_eq!(stats["data"]["is_full"], true);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn only_active_enrollments_complete(pool: PgPool) {
    let c = campus(&pool).await;
    let student = actor(&pool, "ada", "student").await;
    common::enroll_assigned(&pool, student.user.id, c.skill.id, c.group.id).await;
    let app = common::build_test_app(pool);

    let me = get_auth(app.clone(), "/api/v1/enrollments/me", &student.token).await;
    let id = expect_status(me, StatusCode::OK).await["data"]["enrollment"]["id"]
        .as_i64()
        .unwrap();

    let response = post_auth(
        app,
        &format!("/api/v1/enrollments/{id}/complete"),
        &c.admin.token,
    )
    .await;
    let json = expect_status(response, StatusCode::CONFLICT).await;
    assert!(json["error"].as_str().unwrap().contains("assigned"));
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn admin_lists_enrollments_by_status(pool: PgPool) {
    let c = campus(&pool).await;
    let student = actor(&pool, "ada", "student").await;
    common::enroll_assigned(&pool, student.user.id, c.skill.id, c.group.id).await;
    let app = common::build_test_app(pool);

    let assigned = get_auth(
        app.clone(),
        "/api/v1/enrollments?status=assigned",
        &c.admin.token,
    )
    .await;
    let assigned = expect_status(assigned, StatusCode::OK).await;
    assert_eq!(assigned["data"].as_array().unwrap().len(), 1);

    let bogus = get_auth(app, "/api/v1/enrollments?status=bogus", &c.admin.token).await;
    assert_eq!(bogus.status(), StatusCode::BAD_REQUEST);
}

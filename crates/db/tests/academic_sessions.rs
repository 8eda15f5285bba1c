//! Session singleton behaviour against a real database.

mod common;

use sqlx::PgPool;
use vocatrack_db::repositories::AcademicSessionRepo;

use common::create_session;

fn active_ids(sessions: &[vocatrack_db::models::academic_session::AcademicSession]) -> Vec<i64> {
    sessions.iter().filter(|s| s.active).map(|s| s.id).collect()
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn start_then_start_leaves_exactly_one_active(pool: PgPool) {
    let a = create_session(&pool, "2025/2026").await;
    let b = create_session(&pool, "2026/2027").await;

    AcademicSessionRepo::start(&pool, a.id).await.unwrap().unwrap();
    let started = AcademicSessionRepo::start(&pool, b.id).await.unwrap().unwrap();
    assert!(started.active);

    let all = AcademicSessionRepo::list(&pool).await.unwrap();
    assert_eq!(active_ids(&all), vec![b.id]);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn restarting_the_active_session_keeps_it_active(pool: PgPool) {
    let a = create_session(&pool, "2025/2026").await;
    AcademicSessionRepo::start(&pool, a.id).await.unwrap();
    AcademicSessionRepo::start(&pool, a.id).await.unwrap();

    let all = AcademicSessionRepo::list(&pool).await.unwrap();
    assert_eq!(active_ids(&all), vec![a.id]);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn start_unknown_session_changes_nothing(pool: PgPool) {
    let a = create_session(&pool, "2025/2026").await;
    AcademicSessionRepo::start(&pool, a.id).await.unwrap();

    assert!(AcademicSessionRepo::start(&pool, 9_999).await.unwrap().is_none());
    let active = AcademicSessionRepo::find_active(&pool).await.unwrap().unwrap();
    assert_eq!(active.id, a.id);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn concurrent_starts_never_leave_two_active(pool: PgPool) {
    let a = create_session(&pool, "2025/2026").await;
    let b = create_session(&pool, "2026/2027").await;

    let (ra, rb) = tokio::join!(
        AcademicSessionRepo::start(&pool, a.id),
        AcademicSessionRepo::start(&pool, b.id)
    );
    ra.unwrap();
    rb.unwrap();

    let all = AcademicSessionRepo::list(&pool).await.unwrap();
    assert_eq!(active_ids(&all).len(), 1);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn end_clears_only_that_session(pool: PgPool) {
    let a = create_session(&pool, "2025/2026").await;
    AcademicSessionRepo::start(&pool, a.id).await.unwrap();

    let ended = AcademicSessionRepo::end(&pool, a.id).await.unwrap().unwrap();
    assert!(!ended.active);
    assert!(AcademicSessionRepo::find_active(&pool).await.unwrap().is_none());
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn second_active_row_is_rejected_by_the_schema(pool: PgPool) {
    let a = create_session(&pool, "2025/2026").await;
    let b = create_session(&pool, "2026/2027").await;
    AcademicSessionRepo::start(&pool, a.id).await.unwrap();

    let err = sqlx::query("UPDATE academic_sessions SET active = true WHERE id = $1")
        .bind(b.id)
        .execute(&pool)
        .await
        .unwrap_err();
    let db_err = err.as_database_error().expect("database error");
    assert_eq!(db_err.constraint(), Some("uq_academic_sessions_single_active"));
}

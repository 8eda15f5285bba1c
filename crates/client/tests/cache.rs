mod common;

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use axum::extract::State;
use axum::routing::{get, post};
use axum::{Json, Router};
use serde_json::{json, Value};
use vocatrack_client::cache::CachedApi;
use vocatrack_client::models::GroupChanges;
use vocatrack_core::cache_keys::QueryKey;
use vocatrack_core::qr_token::TokenStatus;

use common::{client, fast_config, serve};

#[derive(Clone, Default)]
struct Campus {
    location: Arc<Mutex<String>>,
    revoked: Arc<Mutex<bool>>,
    group_reads: Arc<AtomicUsize>,
    skill_group_reads: Arc<AtomicUsize>,
    token_reads: Arc<AtomicUsize>,
}

impl Campus {
    fn group(&self) -> Value {
        let location = self.location.lock().unwrap().clone();
        json!({
            "id": 5,
            "skill_id": 2,
            "group_number": 1,
            "mentor_id": 9,
            "practical_date": "2026-10-20",
            "max_student_capacity": 20,
            "location": location,
            "created_at": "2026-10-01T00:00:00Z",
            "updated_at": "2026-10-01T00:00:00Z",
            "skill_title": "Welding",
            "current_member_count": 4,
            "is_full": false,
            "capacity_percentage": 20
        })
    }

    fn token(&self) -> Value {
        let revoked = *self.revoked.lock().unwrap();
        let revoked_at = if revoked {
            json!("2026-10-14T09:30:00Z")
        } else {
            Value::Null
        };
        let status = if revoked { "revoked" } else { "valid" };
        json!({
            "id": 31,
            "token": "a1b2c3d4e5f6a7b8",
            "group_id": 5,
            "mentor_id": 9,
            "label": "Station 1",
            "points_per_scan": 1,
            "expires_at": "2026-10-14T10:00:00Z",
            "revoked_at": revoked_at,
            "created_at": "2026-10-14T09:00:00Z",
            "updated_at": "2026-10-14T09:00:00Z",
            "status": status,
            "payload": "a1b2c3d4e5f6a7b8.sig"
        })
    }
}

async fn read_group(State(campus): State<Campus>) -> Json<Value> {
    campus.group_reads.fetch_add(1, Ordering::SeqCst);
    Json(json!({ "data": campus.group() }))
}

async fn edit_group(State(campus): State<Campus>, Json(body): Json<Value>) -> Json<Value> {
    if let Some(location) = body["location"].as_str() {
        *campus.location.lock().unwrap() = location.to_string();
    }
    Json(json!({ "data": campus.group() }))
}

async fn skill_groups(State(campus): State<Campus>) -> Json<Value> {
    campus.skill_group_reads.fetch_add(1, Ordering::SeqCst);
    Json(json!({ "data": [campus.group()] }))
}

async fn list_tokens(State(campus): State<Campus>) -> Json<Value> {
    campus.token_reads.fetch_add(1, Ordering::SeqCst);
    Json(json!({ "data": [campus.token()] }))
}

async fn revoke_token(State(campus): State<Campus>) -> Json<Value> {
    *campus.revoked.lock().unwrap() = true;
    Json(json!({ "data": campus.token() }))
}

async fn campus_api() -> (CachedApi, Campus) {
    let campus = Campus::default();
    *campus.location.lock().unwrap() = "Bay 1".into();
    let router = Router::new()
        .route("/api/v1/groups/5", get(read_group).put(edit_group))
        .route("/api/v1/skills/2/groups", get(skill_groups))
        .route("/api/v1/qr/tokens", get(list_tokens))
        .route("/api/v1/qr/tokens/31/revoke", post(revoke_token))
        .with_state(campus.clone());
    let base = serve(router).await;
    (CachedApi::new(client(&fast_config(&base))), campus)
}

#[tokio::test]
async fn group_edit_refreshes_the_group_and_its_skill_list() {
    let (api, campus) = campus_api().await;

    assert_eq!(api.group(5).await.unwrap().location.as_deref(), Some("Bay 1"));
    api.group(5).await.unwrap();
    api.skill_groups(2).await.unwrap();
    assert_eq!(campus.group_reads.load(Ordering::SeqCst), 1);

    let changes = GroupChanges {
        location: Some("Bay 2".into()),
        ..GroupChanges::default()
    };
    api.update_group(5, &changes).await.unwrap();
    assert!(!api.cache().contains(QueryKey::Group(5)).await);
    assert!(!api.cache().contains(QueryKey::SkillGroups(2)).await);

    assert_eq!(api.group(5).await.unwrap().location.as_deref(), Some("Bay 2"));
    let listed = api.skill_groups(2).await.unwrap();
    assert_eq!(listed[0].location.as_deref(), Some("Bay 2"));
    assert_eq!(campus.group_reads.load(Ordering::SeqCst), 2);
    assert_eq!(campus.skill_group_reads.load(Ordering::SeqCst), 2);
}

#[tokio::test]
async fn revoking_a_token_refreshes_the_group_token_list() {
    let (api, campus) = campus_api().await;

    let tokens = api.qr_tokens(5).await.unwrap();
    assert_eq!(tokens[0].status, TokenStatus::Valid);
    api.qr_tokens(5).await.unwrap();
    assert_eq!(campus.token_reads.load(Ordering::SeqCst), 1);

    let revoked = api.revoke_qr(31).await.unwrap();
    assert_eq!(revoked.status, TokenStatus::Revoked);

    let tokens = api.qr_tokens(5).await.unwrap();
    assert_eq!(tokens[0].status, TokenStatus::Revoked);
    assert!(tokens[0].revoked_at.is_some());
    assert_eq!(campus.token_reads.load(Ordering::SeqCst), 2);
}

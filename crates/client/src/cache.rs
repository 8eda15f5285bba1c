//! Read cache keyed by [`QueryKey`].
//!
//! Reads go through [`ReadCache::get_or_fetch`]. After the server confirms a
//! write, [`ReadCache::invalidate`] drops every key the mutation affects so
//! the next read refetches.

use std::any::Any;
use std::collections::HashMap;
use std::future::Future;
use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::RwLock;
use chrono::NaiveDate;
use vocatrack_core::attendance::AttendanceRecord;
use vocatrack_core::cache_keys::{Mutation, QueryKey};
use vocatrack_core::dashboard::{AdminDashboard, MentorDashboard, StudentDashboard};
use vocatrack_core::report::AttendanceReport;
use vocatrack_core::scan_flow::{ScanReceipt, SubmitTicket};
use vocatrack_core::types::DbId;

use crate::api::ApiClient;
use crate::error::ClientError;
use crate::models::{
    AcademicSession, AttendanceRequirement, Enrollment, Group, GroupChanges, GroupMember,
    GroupRequirements, GroupStatistics, MyEnrollment, NewAcademicSession, NewGroup, NewQrToken,
    NewSkill, QrToken, ScanHistoryEntry, SessionChanges, Skill, SkillChanges,
};
use crate::scanner::ScanSubmitter;

type Entry = Arc<dyn Any + Send + Sync>;

#[derive(Default)]
struct Slots {
    entries: HashMap<QueryKey, Entry>,
    /// Bumped for a key on every invalidation of it. A fetch only stores its
    /// result if the key's generation is unchanged since the fetch started.
    generations: HashMap<QueryKey, u64>,
    /// Bumped by [`ReadCache::clear`].
    epoch: u64,
}

impl Slots {
    fn stamp(&self, key: &QueryKey) -> (u64, u64) {
        (self.epoch, self.generations.get(key).copied().unwrap_or(0))
    }
}

#[derive(Clone, Default)]
pub struct ReadCache {
    slots: Arc<RwLock<Slots>>,
}

impl ReadCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Cached value for `key`, if present and of type `T`.
    pub async fn get<T>(&self, key: QueryKey) -> Option<T>
    where
        T: Clone + Send + Sync + 'static,
    {
        let slots = self.slots.read().await;
        slots.entries.get(&key)?.downcast_ref::<T>().cloned()
    }

    pub async fn insert<T>(&self, key: QueryKey, value: T)
    where
        T: Send + Sync + 'static,
    {
        self.slots.write().await.entries.insert(key, Arc::new(value));
    }

    /// Return the cached value or run `fetch` and cache its success.
    ///
    /// Errors are returned as-is and nothing is cached. A result whose key was
    /// invalidated while the fetch was in flight is returned to the caller but
    /// not stored, so the next read goes back to the server.
    pub async fn get_or_fetch<T, F, Fut>(&self, key: QueryKey, fetch: F) -> Result<T, ClientError>
    where
        T: Clone + Send + Sync + 'static,
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<T, ClientError>>,
    {
        let started = {
            let slots = self.slots.read().await;
            if let Some(hit) = slots.entries.get(&key).and_then(|e| e.downcast_ref::<T>()) {
                return Ok(hit.clone());
            }
            slots.stamp(&key)
        };

        let value = fetch().await?;

        let mut slots = self.slots.write().await;
        if slots.stamp(&key) == started {
            slots.entries.insert(key, Arc::new(value.clone()));
        } else {
            tracing::debug!(?key, "Discarded read invalidated mid-fetch");
        }
        Ok(value)
    }

    /// Drop every key `mutation` affects. Returns how many entries were removed.
    pub async fn invalidate(&self, mutation: &Mutation) -> usize {
        let keys = mutation.invalidates();
        let mut slots = self.slots.write().await;
        let mut removed = 0;
        for key in &keys {
            *slots.generations.entry(*key).or_insert(0) += 1;
            if slots.entries.remove(key).is_some() {
                removed += 1;
            }
        }
        tracing::debug!(?mutation, removed, "Invalidated cached reads");
        removed
    }

    pub async fn contains(&self, key: QueryKey) -> bool {
        self.slots.read().await.entries.contains_key(&key)
    }

    pub async fn clear(&self) {
        let mut slots = self.slots.write().await;
        slots.entries.clear();
        slots.epoch += 1;
    }
}

/// [`ApiClient`] with cached reads and invalidating writes.
#[derive(Clone)]
pub struct CachedApi {
    client: ApiClient,
    cache: ReadCache,
}

impl CachedApi {
    pub fn new(client: ApiClient) -> Self {
        Self {
            client,
            cache: ReadCache::new(),
        }
    }

    pub fn client(&self) -> &ApiClient {
        &self.client
    }

    pub fn cache(&self) -> &ReadCache {
        &self.cache
    }

    // ---- reads ----

    pub async fn academic_sessions(&self) -> Result<Vec<AcademicSession>, ClientError> {
        self.cache
            .get_or_fetch(QueryKey::AcademicSessions, || self.client.academic_sessions())
            .await
    }

    pub async fn active_session(&self) -> Result<Option<AcademicSession>, ClientError> {
        self.cache
            .get_or_fetch(QueryKey::ActiveSession, || self.client.active_session())
            .await
    }

    pub async fn skills(&self) -> Result<Vec<Skill>, ClientError> {
        self.cache
            .get_or_fetch(QueryKey::Skills, || self.client.skills())
            .await
    }

    pub async fn skill_groups(&self, skill_id: DbId) -> Result<Vec<Group>, ClientError> {
        self.cache
            .get_or_fetch(QueryKey::SkillGroups(skill_id), || {
                self.client.skill_groups(skill_id)
            })
            .await
    }

    pub async fn group(&self, id: DbId) -> Result<Group, ClientError> {
        self.cache
            .get_or_fetch(QueryKey::Group(id), || self.client.group(id))
            .await
    }

    pub async fn group_statistics(&self, id: DbId) -> Result<GroupStatistics, ClientError> {
        self.cache
            .get_or_fetch(QueryKey::GroupStatistics(id), || {
                self.client.group_statistics(id)
            })
            .await
    }

    pub async fn group_members(&self, id: DbId) -> Result<Vec<GroupMember>, ClientError> {
        self.cache
            .get_or_fetch(QueryKey::GroupMembers(id), || self.client.group_members(id))
            .await
    }

    pub async fn group_requirements(&self, id: DbId) -> Result<GroupRequirements, ClientError> {
        self.cache
            .get_or_fetch(QueryKey::GroupRequirements(id), || {
                self.client.group_requirements(id)
            })
            .await
    }

    pub async fn qr_tokens(&self, group_id: DbId) -> Result<Vec<QrToken>, ClientError> {
        self.cache
            .get_or_fetch(QueryKey::QrTokens(group_id), || {
                self.client.qr_tokens(group_id)
            })
            .await
    }

    pub async fn enrollments(&self) -> Result<Vec<Enrollment>, ClientError> {
        self.cache
            .get_or_fetch(QueryKey::Enrollments, || self.client.enrollments())
            .await
    }

    pub async fn my_enrollment(&self) -> Result<MyEnrollment, ClientError> {
        self.cache
            .get_or_fetch(QueryKey::MyEnrollment, || self.client.my_enrollment())
            .await
    }

    pub async fn scan_history(&self) -> Result<Vec<ScanHistoryEntry>, ClientError> {
        self.cache
            .get_or_fetch(QueryKey::ScanHistory, || self.client.scan_history())
            .await
    }

    pub async fn my_attendance(&self) -> Result<Option<AttendanceRecord>, ClientError> {
        self.cache
            .get_or_fetch(QueryKey::MyAttendance, || self.client.my_attendance())
            .await
    }

    pub async fn group_report(&self, group_id: DbId) -> Result<AttendanceReport, ClientError> {
        self.cache
            .get_or_fetch(QueryKey::GroupReport(group_id), || {
                self.client.group_report(group_id)
            })
            .await
    }

    pub async fn admin_dashboard(&self) -> Result<AdminDashboard, ClientError> {
        self.cache
            .get_or_fetch(QueryKey::AdminDashboard, || self.client.admin_dashboard())
            .await
    }

    pub async fn mentor_dashboard(&self) -> Result<MentorDashboard, ClientError> {
        self.cache
            .get_or_fetch(QueryKey::MentorDashboard, || self.client.mentor_dashboard())
            .await
    }

    pub async fn student_dashboard(&self) -> Result<StudentDashboard, ClientError> {
        self.cache
            .get_or_fetch(QueryKey::StudentDashboard, || self.client.student_dashboard())
            .await
    }

    // ---- writes ----

    pub async fn create_session(
        &self,
        input: &NewAcademicSession,
    ) -> Result<AcademicSession, ClientError> {
        let session = self.client.create_session(input).await?;
        self.cache.invalidate(&Mutation::SessionCreate).await;
        Ok(session)
    }

    pub async fn update_session(
        &self,
        id: DbId,
        changes: &SessionChanges,
    ) -> Result<AcademicSession, ClientError> {
        let session = self.client.update_session(id, changes).await?;
        self.cache.invalidate(&Mutation::SessionUpdate).await;
        Ok(session)
    }

    pub async fn delete_session(&self, id: DbId) -> Result<(), ClientError> {
        self.client.delete_session(id).await?;
        self.cache.invalidate(&Mutation::SessionDelete).await;
        Ok(())
    }

    pub async fn start_session(&self, id: DbId) -> Result<AcademicSession, ClientError> {
        let session = self.client.start_session(id).await?;
        self.cache.invalidate(&Mutation::SessionStart).await;
        Ok(session)
    }

    pub async fn end_session(&self, id: DbId) -> Result<AcademicSession, ClientError> {
        let session = self.client.end_session(id).await?;
        self.cache.invalidate(&Mutation::SessionEnd).await;
        Ok(session)
    }

    pub async fn create_enrollment(&self, skill_id: DbId) -> Result<Enrollment, ClientError> {
        let enrollment = self.client.create_enrollment(skill_id).await?;
        self.cache.invalidate(&Mutation::EnrollmentCreate).await;
        Ok(enrollment)
    }

    pub async fn pay_enrollment(
        &self,
        id: DbId,
        payment_reference: &str,
    ) -> Result<Enrollment, ClientError> {
        let enrollment = self.client.pay_enrollment(id, payment_reference).await?;
        self.cache.invalidate(&Mutation::EnrollmentPay).await;
        Ok(enrollment)
    }

    pub async fn create_skill(&self, input: &NewSkill) -> Result<Skill, ClientError> {
        let skill = self.client.create_skill(input).await?;
        self.cache.invalidate(&Mutation::SkillCreate).await;
        Ok(skill)
    }

    pub async fn update_skill(&self, id: DbId, changes: &SkillChanges) -> Result<Skill, ClientError> {
        let skill = self.client.update_skill(id, changes).await?;
        self.cache.invalidate(&Mutation::SkillUpdate).await;
        Ok(skill)
    }

    pub async fn delete_skill(&self, id: DbId) -> Result<(), ClientError> {
        self.client.delete_skill(id).await?;
        self.cache.invalidate(&Mutation::SkillDelete).await;
        Ok(())
    }

    pub async fn create_group(&self, skill_id: DbId, input: &NewGroup) -> Result<Group, ClientError> {
        let group = self.client.create_group(skill_id, input).await?;
        self.cache.invalidate(&Mutation::GroupCreate { skill_id }).await;
        Ok(group)
    }

    pub async fn update_group(&self, id: DbId, changes: &GroupChanges) -> Result<Group, ClientError> {
        let group = self.client.update_group(id, changes).await?;
        self.cache
            .invalidate(&Mutation::GroupUpdate {
                skill_id: group.skill_id,
                group_id: group.id,
            })
            .await;
        Ok(group)
    }

    /// `skill_id` names the skill list the group disappears from.
    pub async fn delete_group(&self, skill_id: DbId, id: DbId) -> Result<(), ClientError> {
        self.client.delete_group(id).await?;
        self.cache
            .invalidate(&Mutation::GroupDelete {
                skill_id,
                group_id: id,
            })
            .await;
        Ok(())
    }

    pub async fn set_requirement(
        &self,
        group_id: DbId,
        date: NaiveDate,
        required_count: i32,
    ) -> Result<AttendanceRequirement, ClientError> {
        let requirement = self
            .client
            .set_requirement(group_id, date, required_count)
            .await?;
        self.cache
            .invalidate(&Mutation::RequirementSet { group_id })
            .await;
        Ok(requirement)
    }

    pub async fn generate_qr(&self, input: &NewQrToken) -> Result<QrToken, ClientError> {
        let token = self.client.generate_qr(input).await?;
        self.cache
            .invalidate(&Mutation::QrGenerate {
                group_id: token.group_id,
            })
            .await;
        Ok(token)
    }

    pub async fn revoke_qr(&self, id: DbId) -> Result<QrToken, ClientError> {
        let token = self.client.revoke_qr(id).await?;
        self.cache
            .invalidate(&Mutation::QrRevoke {
                group_id: token.group_id,
            })
            .await;
        Ok(token)
    }

    pub async fn assign_enrollment(&self, id: DbId, group_id: DbId) -> Result<Enrollment, ClientError> {
        let enrollment = self.client.assign_enrollment(id, group_id).await?;
        self.cache
            .invalidate(&Mutation::EnrollmentAssign { group_id })
            .await;
        Ok(enrollment)
    }

    pub async fn complete_enrollment(&self, id: DbId) -> Result<Enrollment, ClientError> {
        let enrollment = self.client.complete_enrollment(id).await?;
        let mutation = match enrollment.group_id {
            Some(group_id) => Mutation::EnrollmentComplete { group_id },
            None => Mutation::EnrollmentPay,
        };
        self.cache.invalidate(&mutation).await;
        Ok(enrollment)
    }

    /// Submitter for a scanner on a page showing `group_id`'s data.
    pub fn scan_submitter(&self, group_id: DbId) -> GroupScanSubmitter {
        GroupScanSubmitter {
            api: self.clone(),
            group_id,
        }
    }
}

/// Submits scans and invalidates the reads an accepted scan changes.
#[derive(Clone)]
pub struct GroupScanSubmitter {
    api: CachedApi,
    group_id: DbId,
}

#[async_trait]
impl ScanSubmitter for GroupScanSubmitter {
    async fn submit(&self, ticket: &SubmitTicket) -> Result<ScanReceipt, ClientError> {
        let receipt = self.api.client.submit(ticket).await?;
        self.api
            .cache
            .invalidate(&Mutation::ScanSubmit {
                group_id: self.group_id,
            })
            .await;
        Ok(receipt)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[tokio::test]
    async fn fetches_once_until_invalidated() {
        let cache = ReadCache::new();
        let calls = AtomicUsize::new(0);
        let counter = &calls;
        let fetch = move || async move {
            counter.fetch_add(1, Ordering::SeqCst);
            Ok::<_, ClientError>(vec![1_i64, 2])
        };

        assert_eq!(cache.get_or_fetch(QueryKey::ScanHistory, fetch).await.unwrap(), vec![1, 2]);
        assert_eq!(cache.get_or_fetch(QueryKey::ScanHistory, fetch).await.unwrap(), vec![1, 2]);
        assert_eq!(calls.load(Ordering::SeqCst), 1);

        let removed = cache.invalidate(&Mutation::ScanSubmit { group_id: 4 }).await;
        assert_eq!(removed, 1);
        cache.get_or_fetch(QueryKey::ScanHistory, fetch).await.unwrap();
        assert_eq!(calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn errors_are_not_cached() {
        let cache = ReadCache::new();
        let result: Result<Vec<i64>, _> = cache
            .get_or_fetch(QueryKey::Skills, || async { Err(ClientError::Timeout) })
            .await;
        assert!(result.is_err());
        assert!(!cache.contains(QueryKey::Skills).await);
    }

    #[tokio::test]
    async fn invalidation_leaves_unrelated_keys() {
        let cache = ReadCache::new();
        cache.insert(QueryKey::GroupReport(1), 1_u8).await;
        cache.insert(QueryKey::GroupReport(2), 2_u8).await;
        cache.insert(QueryKey::Skills, 3_u8).await;

        cache.invalidate(&Mutation::ScanSubmit { group_id: 1 }).await;

        assert!(!cache.contains(QueryKey::GroupReport(1)).await);
        assert!(cache.contains(QueryKey::GroupReport(2)).await);
        assert!(cache.contains(QueryKey::Skills).await);
    }

    #[tokio::test]
    async fn read_in_flight_during_invalidation_is_not_stored() {
        let cache = ReadCache::new();
        let (started_tx, started_rx) = tokio::sync::oneshot::channel::<()>();
        let (release_tx, release_rx) = tokio::sync::oneshot::channel::<()>();

        let reader = {
            let cache = cache.clone();
            tokio::spawn(async move {
                cache
                    .get_or_fetch(QueryKey::ScanHistory, move || async move {
                        let _ = started_tx.send(());
                        let _ = release_rx.await;
                        Ok::<_, ClientError>("before-scan".to_string())
                    })
                    .await
            })
        };

        started_rx.await.unwrap();
        cache.invalidate(&Mutation::ScanSubmit { group_id: 1 }).await;
        release_tx.send(()).unwrap();

        assert_eq!(reader.await.unwrap().unwrap(), "before-scan");
        assert!(!cache.contains(QueryKey::ScanHistory).await);

        let fresh = cache
            .get_or_fetch(QueryKey::ScanHistory, || async {
                Ok::<_, ClientError>("after-scan".to_string())
            })
            .await
            .unwrap();
        assert_eq!(fresh, "after-scan");
        assert_eq!(
            cache.get::<String>(QueryKey::ScanHistory).await.as_deref(),
            Some("after-scan")
        );
    }

    #[tokio::test]
    async fn clear_discards_reads_in_flight() {
        let cache = ReadCache::new();
        let (release_tx, release_rx) = tokio::sync::oneshot::channel::<()>();
        let (started_tx, started_rx) = tokio::sync::oneshot::channel::<()>();

        let reader = {
            let cache = cache.clone();
            tokio::spawn(async move {
                cache
                    .get_or_fetch(QueryKey::Skills, move || async move {
                        let _ = started_tx.send(());
                        let _ = release_rx.await;
                        Ok::<_, ClientError>(7_u8)
                    })
                    .await
            })
        };

        started_rx.await.unwrap();
        cache.clear().await;
        release_tx.send(()).unwrap();
        reader.await.unwrap().unwrap();

        assert!(!cache.contains(QueryKey::Skills).await);
    }

    #[tokio::test]
    async fn type_mismatch_misses() {
        let cache = ReadCache::new();
        cache.insert(QueryKey::Skills, 3_u8).await;
        assert_eq!(cache.get::<String>(QueryKey::Skills).await, None);
        assert_eq!(cache.get::<u8>(QueryKey::Skills).await, Some(3));
    }
}

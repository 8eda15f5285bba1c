//! HTTP client for the REST API.
//!
//! Every successful body is decoded as `{"data": ...}` with no other fields;
//! a body that does not match is a [`ClientError::Schema`], logged with the
//! endpoint, rather than a partially filled value.

use reqwest::{Method, StatusCode};
use chrono::NaiveDate;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use uuid::Uuid;
use vocatrack_core::attendance::AttendanceRecord;
use vocatrack_core::dashboard::{AdminDashboard, MentorDashboard, StudentDashboard};
use vocatrack_core::report::AttendanceReport;
use vocatrack_core::scan_flow::ScanReceipt;
use vocatrack_core::scan_rejection::ScanRejection;
use vocatrack_core::types::DbId;

use crate::config::ClientConfig;
use crate::error::ClientError;
use crate::models::{
    AcademicSession, AttendanceRequirement, AuthSession, Enrollment, Group, GroupChanges,
    GroupMember, GroupRequirements, GroupStatistics, MyEnrollment, NewAcademicSession, NewGroup,
    NewQrToken, NewSkill, QrToken, ScanHistoryEntry, SessionChanges, Skill, SkillChanges,
    UserProfile,
};

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct Envelope<T> {
    data: T,
}

#[derive(Debug, Deserialize)]
struct ErrorBody {
    error: String,
    code: Option<String>,
    reason: Option<String>,
}

#[derive(Clone)]
pub struct ApiClient {
    http: reqwest::Client,
    base_url: String,
    token: Option<String>,
}

impl std::fmt::Debug for ApiClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ApiClient")
            .field("base_url", &self.base_url)
            .field("token", &self.token.as_ref().map(|_| "<redacted>"))
            .finish_non_exhaustive()
    }
}

impl ApiClient {
    pub fn new(config: &ClientConfig) -> Result<Self, ClientError> {
        let base_url = config.base_url.trim_end_matches('/').to_string();
        if !(base_url.starts_with("http://") || base_url.starts_with("https://")) {
            return Err(ClientError::InvalidBaseUrl(config.base_url.clone()));
        }
        let http = reqwest::Client::builder()
            .timeout(config.request_timeout)
            .build()
            .map_err(ClientError::Transport)?;
        Ok(Self {
            http,
            base_url,
            token: None,
        })
    }

    /// Send `Authorization: Bearer <token>` on every request.
    pub fn with_token(mut self, token: impl Into<String>) -> Self {
        self.token = Some(token.into());
        self
    }

    pub fn set_token(&mut self, token: Option<String>) {
        self.token = token;
    }

    // ---- auth ----

    pub async fn login(&self, username: &str, password: &str) -> Result<AuthSession, ClientError> {
        let body = json!({ "username": username, "password": password });
        self.send(Method::POST, "v1/users/auth/login", Some(&body)).await
    }

    pub async fn me(&self) -> Result<UserProfile, ClientError> {
        self.send(Method::GET, "v1/users/auth/me", None).await
    }

    pub async fn logout(&self) -> Result<(), ClientError> {
        self.send_no_content(Method::POST, "v1/users/auth/logout").await
    }

    // ---- academic sessions ----

    pub async fn academic_sessions(&self) -> Result<Vec<AcademicSession>, ClientError> {
        self.send(Method::GET, "v1/academic-sessions", None).await
    }

    pub async fn active_session(&self) -> Result<Option<AcademicSession>, ClientError> {
        self.send(Method::GET, "v1/academic-sessions/active", None).await
    }

    pub async fn create_session(
        &self,
        input: &NewAcademicSession,
    ) -> Result<AcademicSession, ClientError> {
        let body = to_body("v1/academic-sessions", input)?;
        self.send(Method::POST, "v1/academic-sessions", Some(&body)).await
    }

    pub async fn update_session(
        &self,
        id: DbId,
        changes: &SessionChanges,
    ) -> Result<AcademicSession, ClientError> {
        let path = format!("v1/academic-sessions/{id}");
        let body = to_body(&path, changes)?;
        self.send(Method::PUT, &path, Some(&body)).await
    }

    pub async fn delete_session(&self, id: DbId) -> Result<(), ClientError> {
        self.send_no_content(Method::DELETE, &format!("v1/academic-sessions/{id}"))
            .await
    }

    pub async fn start_session(&self, id: DbId) -> Result<AcademicSession, ClientError> {
        self.send(Method::POST, &format!("v1/academic-sessions/{id}/start"), None)
            .await
    }

    pub async fn end_session(&self, id: DbId) -> Result<AcademicSession, ClientError> {
        self.send(Method::POST, &format!("v1/academic-sessions/{id}/end"), None)
            .await
    }

    // ---- skills and groups ----

    pub async fn skills(&self) -> Result<Vec<Skill>, ClientError> {
        self.send(Method::GET, "v1/skills", None).await
    }

    pub async fn create_skill(&self, input: &NewSkill) -> Result<Skill, ClientError> {
        let body = to_body("v1/skills", input)?;
        self.send(Method::POST, "v1/skills", Some(&body)).await
    }

    pub async fn update_skill(&self, id: DbId, changes: &SkillChanges) -> Result<Skill, ClientError> {
        let path = format!("v1/skills/{id}");
        let body = to_body(&path, changes)?;
        self.send(Method::PUT, &path, Some(&body)).await
    }

    pub async fn delete_skill(&self, id: DbId) -> Result<(), ClientError> {
        self.send_no_content(Method::DELETE, &format!("v1/skills/{id}"))
            .await
    }

    pub async fn skill_groups(&self, skill_id: DbId) -> Result<Vec<Group>, ClientError> {
        self.send(Method::GET, &format!("v1/skills/{skill_id}/groups"), None)
            .await
    }

    pub async fn create_group(&self, skill_id: DbId, input: &NewGroup) -> Result<Group, ClientError> {
        let path = format!("v1/skills/{skill_id}/groups");
        let body = to_body(&path, input)?;
        self.send(Method::POST, &path, Some(&body)).await
    }

    pub async fn group(&self, id: DbId) -> Result<Group, ClientError> {
        self.send(Method::GET, &format!("v1/groups/{id}"), None).await
    }

    pub async fn update_group(&self, id: DbId, changes: &GroupChanges) -> Result<Group, ClientError> {
        let path = format!("v1/groups/{id}");
        let body = to_body(&path, changes)?;
        self.send(Method::PUT, &path, Some(&body)).await
    }

    pub async fn delete_group(&self, id: DbId) -> Result<(), ClientError> {
        self.send_no_content(Method::DELETE, &format!("v1/groups/{id}"))
            .await
    }

    pub async fn group_statistics(&self, id: DbId) -> Result<GroupStatistics, ClientError> {
        self.send(Method::GET, &format!("v1/groups/{id}/statistics"), None)
            .await
    }

    pub async fn group_members(&self, id: DbId) -> Result<Vec<GroupMember>, ClientError> {
        self.send(Method::GET, &format!("v1/groups/{id}/members"), None)
            .await
    }

    pub async fn group_requirements(&self, id: DbId) -> Result<GroupRequirements, ClientError> {
        self.send(Method::GET, &format!("v1/groups/{id}/requirements"), None)
            .await
    }

    /// Override the number of scans required from `id`'s students on `date`.
    pub async fn set_requirement(
        &self,
        id: DbId,
        date: NaiveDate,
        required_count: i32,
    ) -> Result<AttendanceRequirement, ClientError> {
        let body = json!({ "date": date, "required_count": required_count });
        self.send(Method::PUT, &format!("v1/groups/{id}/requirements"), Some(&body))
            .await
    }

    // ---- QR tokens ----

    pub async fn qr_tokens(&self, group_id: DbId) -> Result<Vec<QrToken>, ClientError> {
        self.send(Method::GET, &format!("v1/qr/tokens?group_id={group_id}"), None)
            .await
    }

    pub async fn generate_qr(&self, input: &NewQrToken) -> Result<QrToken, ClientError> {
        let body = to_body("v1/qr/generate", input)?;
        self.send(Method::POST, "v1/qr/generate", Some(&body)).await
    }

    pub async fn revoke_qr(&self, id: DbId) -> Result<QrToken, ClientError> {
        self.send(Method::POST, &format!("v1/qr/tokens/{id}/revoke"), None)
            .await
    }

    // ---- enrollment ----

    /// Every enrollment (admin).
    pub async fn enrollments(&self) -> Result<Vec<Enrollment>, ClientError> {
        self.send(Method::GET, "v1/enrollments", None).await
    }

    pub async fn my_enrollment(&self) -> Result<MyEnrollment, ClientError> {
        self.send(Method::GET, "v1/enrollments/me", None).await
    }

    pub async fn create_enrollment(&self, skill_id: DbId) -> Result<Enrollment, ClientError> {
        let body = json!({ "skill_id": skill_id });
        self.send(Method::POST, "v1/enrollments", Some(&body)).await
    }

    pub async fn pay_enrollment(
        &self,
        id: DbId,
        payment_reference: &str,
    ) -> Result<Enrollment, ClientError> {
        let body = json!({ "payment_reference": payment_reference });
        self.send(Method::POST, &format!("v1/enrollments/{id}/pay"), Some(&body))
            .await
    }

    pub async fn assign_enrollment(&self, id: DbId, group_id: DbId) -> Result<Enrollment, ClientError> {
        let body = json!({ "group_id": group_id });
        self.send(Method::POST, &format!("v1/enrollments/{id}/assign"), Some(&body))
            .await
    }

    pub async fn complete_enrollment(&self, id: DbId) -> Result<Enrollment, ClientError> {
        self.send(Method::POST, &format!("v1/enrollments/{id}/complete"), None)
            .await
    }

    // ---- scans and attendance ----

    /// Submit a scan. Resubmitting the same `request_id` returns the original
    /// receipt with `replayed: true`.
    pub async fn submit_scan(
        &self,
        token: &str,
        request_id: Uuid,
    ) -> Result<ScanReceipt, ClientError> {
        let body = json!({ "token": token, "client_request_id": request_id });
        self.send(Method::POST, "v1/scans", Some(&body)).await
    }

    pub async fn scan_history(&self) -> Result<Vec<ScanHistoryEntry>, ClientError> {
        self.send(Method::GET, "v1/scans/history", None).await
    }

    pub async fn my_attendance(&self) -> Result<Option<AttendanceRecord>, ClientError> {
        self.send(Method::GET, "v1/attendance/me", None).await
    }

    pub async fn group_report(&self, group_id: DbId) -> Result<AttendanceReport, ClientError> {
        self.send(
            Method::GET,
            &format!("v1/groups/{group_id}/attendance-report"),
            None,
        )
        .await
    }

    // ---- dashboards ----

    pub async fn admin_dashboard(&self) -> Result<AdminDashboard, ClientError> {
        self.send(Method::GET, "v1/dashboard/admin", None).await
    }

    pub async fn mentor_dashboard(&self) -> Result<MentorDashboard, ClientError> {
        self.send(Method::GET, "v1/dashboard/mentor", None).await
    }

    pub async fn student_dashboard(&self) -> Result<StudentDashboard, ClientError> {
        self.send(Method::GET, "v1/dashboard/student", None).await
    }

    // ---- private helpers ----

    fn request(&self, method: Method, path: &str) -> reqwest::RequestBuilder {
        let url = format!("{}/{}", self.base_url, path);
        let builder = self.http.request(method, url);
        match &self.token {
            Some(token) => builder.bearer_auth(token),
            None => builder,
        }
    }

    async fn send<T: DeserializeOwned>(
        &self,
        method: Method,
        path: &str,
        body: Option<&Value>,
    ) -> Result<T, ClientError> {
        let mut builder = self.request(method, path);
        if let Some(body) = body {
            builder = builder.json(body);
        }
        let response = builder.send().await?;
        let status = response.status();
        let bytes = response.bytes().await?;

        if !status.is_success() {
            return Err(api_error(status, &bytes));
        }
        decode(path, &bytes)
    }

    async fn send_no_content(&self, method: Method, path: &str) -> Result<(), ClientError> {
        let response = self.request(method, path).send().await?;
        let status = response.status();
        if status.is_success() {
            return Ok(());
        }
        let bytes = response.bytes().await?;
        Err(api_error(status, &bytes))
    }
}

fn to_body<T: Serialize>(endpoint: &str, input: &T) -> Result<Value, ClientError> {
    serde_json::to_value(input).map_err(|e| ClientError::Schema {
        endpoint: endpoint.to_string(),
        message: e.to_string(),
    })
}

fn decode<T: DeserializeOwned>(endpoint: &str, bytes: &[u8]) -> Result<T, ClientError> {
    serde_json::from_slice::<Envelope<T>>(bytes)
        .map(|envelope| envelope.data)
        .map_err(|e| {
            tracing::warn!(endpoint, error = %e, "Response did not match schema");
            ClientError::Schema {
                endpoint: endpoint.to_string(),
                message: e.to_string(),
            }
        })
}

/// Build [`ClientError::Api`] from an error body, tolerating non-JSON bodies
/// such as a proxy's plain-text error page.
fn api_error(status: StatusCode, bytes: &[u8]) -> ClientError {
    match serde_json::from_slice::<ErrorBody>(bytes) {
        Ok(body) => ClientError::Api {
            status,
            code: body.code,
            message: body.error,
            reason: body
                .reason
                .as_deref()
                .and_then(|r| ScanRejection::from_str_value(r).ok()),
        },
        Err(_) => ClientError::Api {
            status,
            code: None,
            message: String::from_utf8_lossy(bytes).trim().to_string(),
            reason: None,
        },
    }
}

//! HTTP client for the EMSA REST API.
//!
//! Every backend response is wrapped in `{ success, message, data, timestamp }`;
//! the helpers here unwrap it so endpoint methods return plain models.

use std::time::Duration;

use reqwest::{header, Client, Method};
use serde::{de::DeserializeOwned, Deserialize, Serialize};
use serde_json::Value;
use tracing::{debug, warn};

use crate::auth::{AuthPayload, Role};
use crate::models::{
    Account, AuditLog, ChangePasswordRequest, CreateAccountRequest, Department,
    DepartmentRequest, Kpi, KpiRequest, LeaveRequest, LeaveRequestDto, LoginRequest,
    PerformanceReview, PerformanceReviewRequest, Project, ProjectRequest, ResetPasswordRequest,
    ReviewLeaveRequest, SelfAppraisalRequest, Task, TaskRequest, UpdateAccountRequest,
};

use super::ApiError;

// ============================================================================
// Constants
// ============================================================================

/// Backend used when nothing is configured.
pub const DEFAULT_BASE_URL: &str = "http://localhost:8080/api";

/// HTTP request timeout in seconds.
const REQUEST_TIMEOUT_SECS: u64 = 30;

/// Maximum number of retries for rate-limited (429) requests.
const MAX_RATE_LIMIT_RETRIES: u32 = 3;

/// Initial backoff delay in milliseconds for rate limiting.
const INITIAL_BACKOFF_MS: u64 = 1000;

/// Standard response envelope.
#[derive(Debug, Deserialize)]
pub struct ApiResponse<T> {
    #[serde(default)]
    pub success: bool,
    pub message: Option<String>,
    pub data: Option<T>,
    pub timestamp: Option<String>,
}

/// API client for the EMSA backend.
/// Clone is cheap - reqwest::Client uses Arc internally for connection pooling.
#[derive(Clone)]
pub struct ApiClient {
    client: Client,
    base_url: String,
    token: Option<String>,
}

impl ApiClient {
    pub fn new(base_url: impl Into<String>) -> Result<Self, ApiError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(REQUEST_TIMEOUT_SECS))
            .build()?;

        Ok(Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            token: None,
        })
    }

    /// Same connection pool, new bearer token.
    pub fn with_token(&self, token: impl Into<String>) -> Self {
        Self {
            client: self.client.clone(),
            base_url: self.base_url.clone(),
            token: Some(token.into()),
        }
    }

    /// Same connection pool, no bearer token.
    pub fn without_token(&self) -> Self {
        Self {
            client: self.client.clone(),
            base_url: self.base_url.clone(),
            token: None,
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn has_token(&self) -> bool {
        self.token.is_some()
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    fn auth_headers(&self) -> Result<header::HeaderMap, ApiError> {
        let mut headers = header::HeaderMap::new();
        if let Some(ref token) = self.token {
            let value = header::HeaderValue::from_str(&format!("Bearer {}", token))
                .map_err(|_| ApiError::InvalidResponse("token is not a valid header value".into()))?;
            headers.insert(header::AUTHORIZATION, value);
        }
        Ok(headers)
    }

    /// Returns Ok(Some(response)) for success, Ok(None) for rate limit (should retry),
    /// or Err for other errors.
    async fn check_response_for_retry(
        response: reqwest::Response,
    ) -> Result<Option<reqwest::Response>, ApiError> {
        if response.status().is_success() {
            Ok(Some(response))
        } else if response.status().as_u16() == 429 {
            Ok(None)
        } else {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            Err(ApiError::from_status(status, &body))
        }
    }

    /// Send a request, retrying on 429 with exponential backoff.
    async fn send<B: Serialize + ?Sized>(
        &self,
        method: Method,
        path: &str,
        body: Option<&B>,
    ) -> Result<reqwest::Response, ApiError> {
        let url = self.url(path);
        let mut retries = 0;
        let mut backoff_ms = INITIAL_BACKOFF_MS;

        loop {
            debug!(method = %method, url = %url, "API request");
            let mut request = self
                .client
                .request(method.clone(), &url)
                .headers(self.auth_headers()?);
            if let Some(body) = body {
                request = request.json(body);
            }
            let response = request.send().await?;

            match Self::check_response_for_retry(response).await? {
                Some(response) => return Ok(response),
                None => {
                    retries += 1;
                    if retries > MAX_RATE_LIMIT_RETRIES {
                        return Err(ApiError::RateLimited);
                    }
                    warn!(url = %url, retry = retries, backoff_ms = backoff_ms, "Rate limited, backing off");
                    tokio::time::sleep(Duration::from_millis(backoff_ms)).await;
                    backoff_ms *= 2;
                }
            }
        }
    }

    async fn envelope<T: DeserializeOwned, B: Serialize + ?Sized>(
        &self,
        method: Method,
        path: &str,
        body: Option<&B>,
    ) -> Result<Option<T>, ApiError> {
        let response = self.send(method, path, body).await?;
        let text = response.text().await?;
        parse_envelope(&text)
    }

    /// Single-object endpoint; a missing `data` is an invalid response.
    async fn item<T: DeserializeOwned, B: Serialize + ?Sized>(
        &self,
        method: Method,
        path: &str,
        body: Option<&B>,
    ) -> Result<T, ApiError> {
        self.envelope(method, path, body)
            .await?
            .ok_or_else(|| ApiError::InvalidResponse(format!("no data in response from {}", path)))
    }

    /// List endpoint; `data: null` is an empty list.
    async fn list<T: DeserializeOwned>(&self, path: &str) -> Result<Vec<T>, ApiError> {
        Ok(self
            .envelope::<Vec<T>, ()>(Method::GET, path, None)
            .await?
            .unwrap_or_default())
    }

    /// Endpoint whose response body is not needed.
    async fn unit<B: Serialize + ?Sized>(
        &self,
        method: Method,
        path: &str,
        body: Option<&B>,
    ) -> Result<(), ApiError> {
        self.send(method, path, body).await?;
        Ok(())
    }

    async fn get<T: DeserializeOwned>(&self, path: &str) -> Result<T, ApiError> {
        self.item::<T, ()>(Method::GET, path, None).await
    }

    // ===== Authentication =====

    /// Exchange credentials for a session. Failures here are login failures,
    /// never a reason to invalidate an existing session.
    pub async fn login(&self, username: &str, password: &str) -> Result<AuthPayload, ApiError> {
        let body = LoginRequest {
            username: username.to_string(),
            password: password.to_string(),
        };
        let response = self
            .without_token()
            .send(Method::POST, "/auth/login", Some(&body))
            .await?;
        let value: Value = response
            .json()
            .await
            .map_err(|e| ApiError::InvalidResponse(e.to_string()))?;
        AuthPayload::from_response_value(value)
            .map_err(|e| ApiError::InvalidResponse(e.to_string()))
    }

    /// Best-effort server-side logout.
    pub async fn logout(&self) -> Result<(), ApiError> {
        self.unit::<()>(Method::POST, "/auth/logout", None).await
    }

    // ===== Accounts =====

    pub async fn fetch_accounts(&self) -> Result<Vec<Account>, ApiError> {
        self.list("/accounts").await
    }

    pub async fn fetch_account(&self, id: i64) -> Result<Account, ApiError> {
        self.get(&format!("/accounts/{}", id)).await
    }

    pub async fn fetch_my_account(&self) -> Result<Account, ApiError> {
        self.get("/accounts/me").await
    }

    pub async fn create_account(&self, req: &CreateAccountRequest) -> Result<Account, ApiError> {
        self.item(Method::POST, "/accounts", Some(req)).await
    }

    pub async fn update_account(
        &self,
        id: i64,
        req: &UpdateAccountRequest,
    ) -> Result<Account, ApiError> {
        self.item(Method::PUT, &format!("/accounts/{}", id), Some(req)).await
    }

    pub async fn update_my_account(&self, req: &UpdateAccountRequest) -> Result<Account, ApiError> {
        self.item(Method::PUT, "/accounts/me", Some(req)).await
    }

    pub async fn deactivate_account(&self, id: i64) -> Result<(), ApiError> {
        self.unit::<()>(Method::PATCH, &format!("/accounts/{}/deactivate", id), None)
            .await
    }

    pub async fn activate_account(&self, id: i64) -> Result<(), ApiError> {
        self.unit::<()>(Method::PATCH, &format!("/accounts/{}/activate", id), None)
            .await
    }

    pub async fn delete_account(&self, id: i64) -> Result<(), ApiError> {
        self.unit::<()>(Method::DELETE, &format!("/accounts/{}", id), None)
            .await
    }

    pub async fn reset_password(&self, id: i64, req: &ResetPasswordRequest) -> Result<(), ApiError> {
        self.unit(Method::PATCH, &format!("/accounts/{}/reset-password", id), Some(req))
            .await
    }

    pub async fn change_my_password(&self, req: &ChangePasswordRequest) -> Result<(), ApiError> {
        self.unit(Method::PATCH, "/accounts/me/change-password", Some(req))
            .await
    }

    pub async fn fetch_accounts_by_role(&self, role: Role) -> Result<Vec<Account>, ApiError> {
        self.list(&format!("/accounts/role/{}", role)).await
    }

    pub async fn fetch_team(&self) -> Result<Vec<Account>, ApiError> {
        self.list("/accounts/team").await
    }

    // ===== Departments =====

    pub async fn fetch_departments(&self) -> Result<Vec<Department>, ApiError> {
        self.list("/departments").await
    }

    pub async fn fetch_department(&self, id: i64) -> Result<Department, ApiError> {
        self.get(&format!("/departments/{}", id)).await
    }

    pub async fn create_department(&self, req: &DepartmentRequest) -> Result<Department, ApiError> {
        self.item(Method::POST, "/departments", Some(req)).await
    }

    pub async fn update_department(
        &self,
        id: i64,
        req: &DepartmentRequest,
    ) -> Result<Department, ApiError> {
        self.item(Method::PUT, &format!("/departments/{}", id), Some(req))
            .await
    }

    pub async fn delete_department(&self, id: i64) -> Result<(), ApiError> {
        self.unit::<()>(Method::DELETE, &format!("/departments/{}", id), None)
            .await
    }

    // ===== KPIs =====

    pub async fn create_kpi(&self, req: &KpiRequest) -> Result<Kpi, ApiError> {
        self.item(Method::POST, "/kpis", Some(req)).await
    }

    pub async fn fetch_my_kpis(&self) -> Result<Vec<Kpi>, ApiError> {
        self.list("/kpis/me").await
    }

    pub async fn fetch_employee_kpis(&self, employee_id: i64) -> Result<Vec<Kpi>, ApiError> {
        self.list(&format!("/kpis/employee/{}", employee_id)).await
    }

    pub async fn fetch_kpi(&self, id: i64) -> Result<Kpi, ApiError> {
        self.get(&format!("/kpis/{}", id)).await
    }

    pub async fn update_kpi(&self, id: i64, req: &KpiRequest) -> Result<Kpi, ApiError> {
        self.item(Method::PUT, &format!("/kpis/{}", id), Some(req)).await
    }

    pub async fn delete_kpi(&self, id: i64) -> Result<(), ApiError> {
        self.unit::<()>(Method::DELETE, &format!("/kpis/{}", id), None)
            .await
    }

    // ===== Projects =====

    pub async fn fetch_projects(&self) -> Result<Vec<Project>, ApiError> {
        self.list("/projects").await
    }

    pub async fn fetch_my_projects(&self) -> Result<Vec<Project>, ApiError> {
        self.list("/projects/mine").await
    }

    pub async fn fetch_assigned_projects(&self) -> Result<Vec<Project>, ApiError> {
        self.list("/projects/assigned").await
    }

    pub async fn fetch_project(&self, id: i64) -> Result<Project, ApiError> {
        self.get(&format!("/projects/{}", id)).await
    }

    pub async fn create_project(&self, req: &ProjectRequest) -> Result<Project, ApiError> {
        self.item(Method::POST, "/projects", Some(req)).await
    }

    pub async fn update_project(&self, id: i64, req: &ProjectRequest) -> Result<Project, ApiError> {
        self.item(Method::PUT, &format!("/projects/{}", id), Some(req))
            .await
    }

    pub async fn delete_project(&self, id: i64) -> Result<(), ApiError> {
        self.unit::<()>(Method::DELETE, &format!("/projects/{}", id), None)
            .await
    }

    // ===== Tasks =====

    pub async fn fetch_tasks(&self) -> Result<Vec<Task>, ApiError> {
        self.list("/tasks").await
    }

    pub async fn fetch_my_tasks(&self) -> Result<Vec<Task>, ApiError> {
        self.list("/tasks/me").await
    }

    pub async fn fetch_project_tasks(&self, project_id: i64) -> Result<Vec<Task>, ApiError> {
        self.list(&format!("/tasks/project/{}", project_id)).await
    }

    pub async fn fetch_task(&self, id: i64) -> Result<Task, ApiError> {
        self.get(&format!("/tasks/{}", id)).await
    }

    pub async fn create_task(&self, req: &TaskRequest) -> Result<Task, ApiError> {
        self.item(Method::POST, "/tasks", Some(req)).await
    }

    pub async fn update_task(&self, id: i64, req: &TaskRequest) -> Result<Task, ApiError> {
        self.item(Method::PUT, &format!("/tasks/{}", id), Some(req)).await
    }

    pub async fn delete_task(&self, id: i64) -> Result<(), ApiError> {
        self.unit::<()>(Method::DELETE, &format!("/tasks/{}", id), None)
            .await
    }

    // ===== Leave requests =====

    pub async fn create_leave_request(&self, req: &LeaveRequestDto) -> Result<LeaveRequest, ApiError> {
        self.item(Method::POST, "/leave-requests", Some(req)).await
    }

    pub async fn fetch_my_leave_requests(&self) -> Result<Vec<LeaveRequest>, ApiError> {
        self.list("/leave-requests/me").await
    }

    pub async fn fetch_leave_requests(&self) -> Result<Vec<LeaveRequest>, ApiError> {
        self.list("/leave-requests").await
    }

    pub async fn fetch_team_leave_requests(&self) -> Result<Vec<LeaveRequest>, ApiError> {
        self.list("/leave-requests/team").await
    }

    pub async fn fetch_leave_request(&self, id: i64) -> Result<LeaveRequest, ApiError> {
        self.get(&format!("/leave-requests/{}", id)).await
    }

    pub async fn review_leave_request(
        &self,
        id: i64,
        req: &ReviewLeaveRequest,
    ) -> Result<LeaveRequest, ApiError> {
        self.item(Method::PATCH, &format!("/leave-requests/{}/review", id), Some(req))
            .await
    }

    // ===== Performance reviews =====

    pub async fn create_review(
        &self,
        req: &PerformanceReviewRequest,
    ) -> Result<PerformanceReview, ApiError> {
        self.item(Method::POST, "/performance-reviews", Some(req)).await
    }

    pub async fn fetch_reviews(&self) -> Result<Vec<PerformanceReview>, ApiError> {
        self.list("/performance-reviews").await
    }

    pub async fn fetch_my_reviews(&self) -> Result<Vec<PerformanceReview>, ApiError> {
        self.list("/performance-reviews/me").await
    }

    pub async fn fetch_employee_reviews(
        &self,
        employee_id: i64,
    ) -> Result<Vec<PerformanceReview>, ApiError> {
        self.list(&format!("/performance-reviews/employee/{}", employee_id))
            .await
    }

    pub async fn fetch_review(&self, id: i64) -> Result<PerformanceReview, ApiError> {
        self.get(&format!("/performance-reviews/{}", id)).await
    }

    pub async fn update_review(
        &self,
        id: i64,
        req: &PerformanceReviewRequest,
    ) -> Result<PerformanceReview, ApiError> {
        self.item(Method::PUT, &format!("/performance-reviews/{}", id), Some(req))
            .await
    }

    pub async fn submit_self_appraisal(
        &self,
        id: i64,
        req: &SelfAppraisalRequest,
    ) -> Result<PerformanceReview, ApiError> {
        self.item(
            Method::PATCH,
            &format!("/performance-reviews/{}/self-appraisal", id),
            Some(req),
        )
        .await
    }

    // ===== Audit logs =====

    pub async fn fetch_audit_logs(&self) -> Result<Vec<AuditLog>, ApiError> {
        self.list("/audit-logs").await
    }

    pub async fn fetch_account_audit_logs(&self, account_id: i64) -> Result<Vec<AuditLog>, ApiError> {
        self.list(&format!("/audit-logs/account/{}", account_id)).await
    }
}

/// Decode an envelope body, returning its `data`.
fn parse_envelope<T: DeserializeOwned>(text: &str) -> Result<Option<T>, ApiError> {
    if text.trim().is_empty() {
        return Ok(None);
    }
    let envelope: ApiResponse<T> = serde_json::from_str(text)
        .map_err(|e| ApiError::InvalidResponse(format!("failed to parse response: {}", e)))?;
    Ok(envelope.data)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn client() -> ApiClient {
        ApiClient::new("http://localhost:8080/api/").unwrap()
    }

    #[test]
    fn test_bearer_header_only_with_token() {
        let anonymous = client();
        assert!(anonymous.auth_headers().unwrap().get(header::AUTHORIZATION).is_none());

        let authed = anonymous.with_token("abc");
        let headers = authed.auth_headers().unwrap();
        assert_eq!(headers.get(header::AUTHORIZATION).unwrap(), "Bearer abc");

        assert!(authed.without_token().auth_headers().unwrap().is_empty());
    }

    #[test]
    fn test_base_url_is_normalized() {
        let c = client();
        assert_eq!(c.base_url(), "http://localhost:8080/api");
        assert_eq!(c.url("/tasks/me"), "http://localhost:8080/api/tasks/me");
    }

    #[test]
    fn test_parse_envelope_list() {
        let body = r#"{"success": true, "message": "ok", "data": [{"departmentId": 1, "departmentName": "Eng"}], "timestamp": "2024-03-20T10:30:00"}"#;
        let departments: Vec<Department> = parse_envelope(body).unwrap().unwrap_or_default();
        assert_eq!(departments.len(), 1);
        assert_eq!(departments[0].department_name, "Eng");
    }

    #[test]
    fn test_parse_envelope_null_data() {
        let body = r#"{"success": true, "message": "ok", "data": null}"#;
        let tasks: Option<Vec<Task>> = parse_envelope(body).unwrap();
        assert!(tasks.unwrap_or_default().is_empty());
        assert!(parse_envelope::<Vec<Task>>("").unwrap().is_none());
    }

    #[test]
    fn test_parse_envelope_garbage() {
        assert!(matches!(
            parse_envelope::<Vec<Task>>("<html>"),
            Err(ApiError::InvalidResponse(_))
        ));
    }
}

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

pub const REVIEW_STATUSES: &[&str] = &["DRAFT", "SUBMITTED", "REVIEWED", "APPROVED"];

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PerformanceReview {
    pub review_id: i64,
    pub employee_id: Option<i64>,
    pub employee_name: Option<String>,
    pub reviewer_id: Option<i64>,
    pub reviewer_name: Option<String>,
    pub cycle_name: Option<String>,
    pub self_appraisal: Option<String>,
    pub manager_feedback: Option<String>,
    pub rating: Option<i32>,
    pub status: Option<String>,
    pub increment_recommended: Option<f64>,
    pub created_at: Option<NaiveDateTime>,
    pub updated_at: Option<NaiveDateTime>,
}

impl PerformanceReview {
    /// Only draft reviews accept a self-appraisal.
    pub fn is_draft(&self) -> bool {
        self.status.as_deref() == Some("DRAFT")
    }
}

#[derive(Debug, Clone, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PerformanceReviewRequest {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub employee_id: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cycle_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub self_appraisal: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub manager_feedback: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rating: Option<i32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub increment_recommended: Option<f64>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SelfAppraisalRequest {
    pub self_appraisal: String,
}

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

pub const KPI_STATUSES: &[&str] = &["PENDING", "IN_PROGRESS", "ACHIEVED", "NOT_ACHIEVED"];

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Kpi {
    pub kpi_id: i64,
    pub employee_id: Option<i64>,
    pub employee_name: Option<String>,
    pub assigned_by_id: Option<i64>,
    pub assigned_by_name: Option<String>,
    pub title: String,
    pub description: Option<String>,
    pub target_value: Option<String>,
    pub achieved_value: Option<String>,
    pub status: Option<String>,
    pub due_date: Option<NaiveDateTime>,
    pub created_at: Option<NaiveDateTime>,
}

impl Kpi {
    /// "achieved / target" for the table column.
    pub fn progress_display(&self) -> String {
        format!(
            "{} / {}",
            self.achieved_value.as_deref().unwrap_or("-"),
            self.target_value.as_deref().unwrap_or("-")
        )
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct KpiRequest {
    pub employee_id: i64,
    pub title: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub target_value: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub achieved_value: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub due_date: Option<NaiveDateTime>,
}

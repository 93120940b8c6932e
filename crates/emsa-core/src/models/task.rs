use chrono::{NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};

pub const TASK_STATUSES: &[&str] = &["TODO", "IN_PROGRESS", "REVIEW", "DONE"];
pub const TASK_PRIORITIES: &[&str] = &["LOW", "MEDIUM", "HIGH"];

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Task {
    pub task_id: i64,
    pub project_id: Option<i64>,
    pub project_name: Option<String>,
    pub assigned_to_id: Option<i64>,
    pub assigned_to_name: Option<String>,
    pub assigned_by_id: Option<i64>,
    pub assigned_by_name: Option<String>,
    pub title: String,
    pub description: Option<String>,
    pub status: Option<String>,
    pub priority: Option<String>,
    pub due_date: Option<NaiveDate>,
    pub hours_logged: Option<f64>,
    pub created_at: Option<NaiveDateTime>,
}

impl Task {
    /// Open tasks are the ones still waiting on work (TODO or IN_PROGRESS).
    pub fn is_open(&self) -> bool {
        matches!(self.status.as_deref(), Some("TODO") | Some("IN_PROGRESS"))
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TaskRequest {
    pub project_id: i64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub assigned_to_id: Option<i64>,
    pub title: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub priority: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub due_date: Option<NaiveDate>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub hours_logged: Option<f64>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_task_is_open() {
        let mut task = Task {
            status: Some("TODO".to_string()),
            ..Default::default()
        };
        assert!(task.is_open());
        task.status = Some("IN_PROGRESS".to_string());
        assert!(task.is_open());
        task.status = Some("REVIEW".to_string());
        assert!(!task.is_open());
        task.status = None;
        assert!(!task.is_open());
    }
}

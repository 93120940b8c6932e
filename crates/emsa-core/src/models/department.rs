use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Department {
    pub department_id: i64,
    pub department_name: String,
    pub description: Option<String>,
    #[serde(default)]
    pub user_count: i64,
    #[serde(default)]
    pub employee_count: i64,
    #[serde(default)]
    pub manager_count: i64,
    pub created_at: Option<NaiveDateTime>,
}

impl Department {
    pub fn headcount(&self) -> i64 {
        self.user_count + self.employee_count + self.manager_count
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DepartmentRequest {
    pub department_name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

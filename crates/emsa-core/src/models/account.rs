use chrono::{NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};

use crate::auth::Role;
use crate::utils::contains_ignore_case;

/// An EMSA account as returned by `/accounts` endpoints.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Account {
    pub account_id: i64,
    pub username: String,
    pub email: Option<String>,
    pub role: Option<String>,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub full_name: Option<String>,
    pub phone_number: Option<String>,
    pub address: Option<String>,
    pub date_of_birth: Option<NaiveDate>,
    pub hire_date: Option<NaiveDate>,
    pub designation: Option<String>,
    pub department_id: Option<i64>,
    pub department_name: Option<String>,
    pub reporting_manager_id: Option<i64>,
    pub reporting_manager_name: Option<String>,
    pub emergency_contact_name: Option<String>,
    pub emergency_contact_phone: Option<String>,
    pub is_active: Option<bool>,
    pub created_at: Option<NaiveDateTime>,
    pub updated_at: Option<NaiveDateTime>,
}

impl Account {
    /// Full name, falling back to "first last" and then the username.
    pub fn display_name(&self) -> String {
        if let Some(ref full) = self.full_name {
            if !full.trim().is_empty() {
                return full.clone();
            }
        }
        let joined = [self.first_name.as_deref(), self.last_name.as_deref()]
            .into_iter()
            .flatten()
            .filter(|s| !s.is_empty())
            .collect::<Vec<_>>()
            .join(" ");
        if joined.is_empty() {
            self.username.clone()
        } else {
            joined
        }
    }

    pub fn role(&self) -> Option<Role> {
        self.role.as_deref().and_then(Role::parse)
    }

    /// Accounts without an explicit flag are treated as active.
    pub fn active(&self) -> bool {
        self.is_active.unwrap_or(true)
    }

    /// Case-insensitive match against username, names and email.
    pub fn matches(&self, query: &str) -> bool {
        if query.is_empty() {
            return true;
        }
        contains_ignore_case(&self.username, query)
            || [&self.first_name, &self.last_name, &self.full_name, &self.email]
                .iter()
                .any(|field| field.as_deref().is_some_and(|v| contains_ignore_case(v, query)))
    }

    pub fn status_label(&self) -> &'static str {
        if self.active() {
            "Active"
        } else {
            "Inactive"
        }
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateAccountRequest {
    pub username: String,
    pub email: String,
    pub password: String,
    pub role: Role,
    pub first_name: String,
    pub last_name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub phone_number: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub address: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub date_of_birth: Option<NaiveDate>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub hire_date: Option<NaiveDate>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub designation: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub department_id: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reporting_manager_id: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub emergency_contact_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub emergency_contact_phone: Option<String>,
}

/// Partial account update. Used both by admins (`PUT /accounts/{id}`) and
/// for the signed-in user's own profile (`PUT /accounts/me`).
#[derive(Debug, Clone, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateAccountRequest {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub first_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub phone_number: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub address: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub date_of_birth: Option<NaiveDate>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub hire_date: Option<NaiveDate>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub designation: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub department_id: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reporting_manager_id: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub emergency_contact_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub emergency_contact_phone: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub is_active: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub role: Option<Role>,
}

/// Body of `POST /auth/login`.
#[derive(Clone, Serialize)]
pub struct LoginRequest {
    pub username: String,
    pub password: String,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ResetPasswordRequest {
    pub new_password: String,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ChangePasswordRequest {
    pub current_password: String,
    pub new_password: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_account_response() {
        let json = r#"{"accountId": 7, "username": "jdoe", "email": "jdoe@example.com", "role": "MANAGER", "firstName": "Jane", "lastName": "Doe", "fullName": "Jane Doe", "hireDate": "2021-04-01", "departmentName": "Engineering", "isActive": false, "createdAt": "2024-01-02T03:04:05"}"#;
        let account: Account = serde_json::from_str(json).expect("account json");
        assert_eq!(account.account_id, 7);
        assert_eq!(account.role(), Some(Role::Manager));
        assert_eq!(account.hire_date, NaiveDate::from_ymd_opt(2021, 4, 1));
        assert!(!account.active());
        assert_eq!(account.status_label(), "Inactive");
    }

    #[test]
    fn test_matches_names_and_email() {
        let account = Account {
            username: "jdoe".to_string(),
            first_name: Some("Jane".to_string()),
            email: Some("jane@example.com".to_string()),
            ..Default::default()
        };
        assert!(account.matches(""));
        assert!(account.matches("JANE"));
        assert!(account.matches("example"));
        assert!(!account.matches("smith"));
    }

    #[test]
    fn test_display_name_fallbacks() {
        let mut account = Account {
            username: "jdoe".to_string(),
            ..Default::default()
        };
        assert_eq!(account.display_name(), "jdoe");

        account.first_name = Some("Jane".to_string());
        assert_eq!(account.display_name(), "Jane");

        account.last_name = Some("Doe".to_string());
        assert_eq!(account.display_name(), "Jane Doe");

        account.full_name = Some("Dr. Jane Doe".to_string());
        assert_eq!(account.display_name(), "Dr. Jane Doe");
    }

    #[test]
    fn test_update_request_skips_unset_fields() {
        let req = UpdateAccountRequest {
            email: Some("new@example.com".to_string()),
            ..Default::default()
        };
        let value = serde_json::to_value(&req).expect("serialize");
        assert_eq!(value, serde_json::json!({"email": "new@example.com"}));
    }
}

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

use crate::utils::contains_ignore_case;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AuditLog {
    pub log_id: i64,
    pub account_id: Option<i64>,
    pub account_username: Option<String>,
    pub action: String,
    pub entity_name: Option<String>,
    pub entity_id: Option<i64>,
    pub details: Option<String>,
    pub ip_address: Option<String>,
    pub created_at: Option<NaiveDateTime>,
}

impl AuditLog {
    /// Case-insensitive match against username, action, entity and details.
    pub fn matches(&self, query: &str) -> bool {
        if query.is_empty() {
            return true;
        }
        contains_ignore_case(&self.action, query)
            || [&self.account_username, &self.entity_name, &self.details]
                .iter()
                .any(|field| field.as_deref().is_some_and(|v| contains_ignore_case(v, query)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_audit_log_matches() {
        let log = AuditLog {
            log_id: 1,
            account_username: Some("admin".to_string()),
            action: "CREATE".to_string(),
            entity_name: Some("Account".to_string()),
            details: Some("Created new account".to_string()),
            ..Default::default()
        };
        assert!(log.matches(""));
        assert!(log.matches("ADMIN"));
        assert!(log.matches("create"));
        assert!(log.matches("new acc"));
        assert!(!log.matches("project"));
    }
}

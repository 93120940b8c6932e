use std::fmt;

use serde::{Deserialize, Serialize};

/// Account role. The set is closed: anything else the server might send is
/// not a `Role` and never satisfies a role check.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Role {
    Admin,
    Manager,
    Employee,
    User,
}

impl Role {
    pub const ALL: [Role; 4] = [Role::Admin, Role::Manager, Role::Employee, Role::User];

    /// Exact, case-sensitive match against the wire names.
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "ADMIN" => Some(Role::Admin),
            "MANAGER" => Some(Role::Manager),
            "EMPLOYEE" => Some(Role::Employee),
            "USER" => Some(Role::User),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Admin => "ADMIN",
            Role::Manager => "MANAGER",
            Role::Employee => "EMPLOYEE",
            Role::User => "USER",
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_closed_set() {
        for role in Role::ALL {
            assert_eq!(Role::parse(role.as_str()), Some(role));
        }
    }

    #[test]
    fn test_parse_rejects_everything_else() {
        assert_eq!(Role::parse(""), None);
        assert_eq!(Role::parse("admin"), None);
        assert_eq!(Role::parse("SUPERUSER"), None);
        assert_eq!(Role::parse(" ADMIN"), None);
    }

    #[test]
    fn test_serde_names() {
        assert_eq!(serde_json::to_string(&Role::Employee).unwrap(), "\"EMPLOYEE\"");
        let role: Role = serde_json::from_str("\"MANAGER\"").unwrap();
        assert_eq!(role, Role::Manager);
    }
}

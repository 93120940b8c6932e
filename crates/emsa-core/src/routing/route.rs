use std::fmt;

use crate::auth::Role;

/// Where an authenticated user lands by default.
pub const DEFAULT_ROUTE: Route = Route::Dashboard;

const ADMIN_ONLY: &[Role] = &[Role::Admin];
const ADMIN_MANAGER: &[Role] = &[Role::Admin, Role::Manager];
const STAFF: &[Role] = &[Role::Admin, Role::Manager, Role::Employee];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Route {
    Login,
    Dashboard,
    Profile,
    Departments,
    Projects,
    Tasks,
    LeaveRequests,
    Performance,
    Kpis,
    Team,
    Accounts,
    Employees,
    Users,
    AuditLogs,
}

impl Route {
    pub const ALL: [Route; 14] = [
        Route::Login,
        Route::Dashboard,
        Route::Profile,
        Route::Departments,
        Route::Projects,
        Route::Tasks,
        Route::LeaveRequests,
        Route::Performance,
        Route::Kpis,
        Route::Team,
        Route::Accounts,
        Route::Employees,
        Route::Users,
        Route::AuditLogs,
    ];

    pub fn path(&self) -> &'static str {
        match self {
            Route::Login => "/login",
            Route::Dashboard => "/dashboard",
            Route::Profile => "/profile",
            Route::Departments => "/departments",
            Route::Projects => "/projects",
            Route::Tasks => "/tasks",
            Route::LeaveRequests => "/leave-requests",
            Route::Performance => "/performance",
            Route::Kpis => "/kpis",
            Route::Team => "/team",
            Route::Accounts => "/accounts",
            Route::Employees => "/employees",
            Route::Users => "/users",
            Route::AuditLogs => "/audit-logs",
        }
    }

    /// Map a path to a route. `/` and unknown paths land on the dashboard.
    pub fn from_path(path: &str) -> Route {
        let trimmed = path.trim();
        let normalized = if trimmed.len() > 1 {
            trimmed.trim_end_matches('/')
        } else {
            trimmed
        };
        Route::ALL
            .into_iter()
            .find(|r| r.path() == normalized)
            .unwrap_or(DEFAULT_ROUTE)
    }

    pub fn is_public(&self) -> bool {
        matches!(self, Route::Login)
    }

    /// Roles allowed to view this route. `None` means any authenticated user.
    pub fn allowed_roles(&self) -> Option<&'static [Role]> {
        match self {
            Route::Performance | Route::Kpis => Some(STAFF),
            Route::Team => Some(ADMIN_MANAGER),
            Route::Accounts | Route::Employees | Route::Users | Route::AuditLogs => {
                Some(ADMIN_ONLY)
            }
            _ => None,
        }
    }

    /// Whether a user with `role` may view this protected route.
    pub fn permits(&self, role: Option<Role>) -> bool {
        match self.allowed_roles() {
            None => true,
            Some(allowed) => role.is_some_and(|r| allowed.contains(&r)),
        }
    }

    pub fn title(&self) -> &'static str {
        match self {
            Route::Login => "Sign In",
            Route::Dashboard => "Dashboard",
            Route::Profile => "My Profile",
            Route::Departments => "Departments",
            Route::Projects => "Projects",
            Route::Tasks => "Tasks",
            Route::LeaveRequests => "Leave & Requests",
            Route::Performance => "Performance Reviews",
            Route::Kpis => "KPIs",
            Route::Team => "My Team",
            Route::Accounts => "All Accounts",
            Route::Employees => "Employees",
            Route::Users => "Users",
            Route::AuditLogs => "Audit Logs",
        }
    }

    pub fn subtitle(&self) -> &'static str {
        match self {
            Route::Login => "Employee Management System",
            Route::Dashboard => "Welcome back!",
            Route::Profile => "View and update your information",
            Route::Departments => "Department management",
            Route::Projects => "Project & resource management",
            Route::Tasks => "Task tracking and management",
            Route::LeaveRequests => "HR requests management",
            Route::Performance => "Appraisal cycles and ratings",
            Route::Kpis => "Key Performance Indicators",
            Route::Team => "Manage your direct reports",
            Route::Accounts => "Manage all system accounts",
            Route::Employees => "Manage employee accounts",
            Route::Users => "Manage user accounts",
            Route::AuditLogs => "System activity and security logs",
        }
    }
}

impl fmt::Display for Route {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.path())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_path_roundtrip() {
        for route in Route::ALL {
            assert_eq!(Route::from_path(route.path()), route);
        }
    }

    #[test]
    fn test_root_and_unknown_paths() {
        assert_eq!(Route::from_path("/"), Route::Dashboard);
        assert_eq!(Route::from_path("/nope"), Route::Dashboard);
        assert_eq!(Route::from_path(""), Route::Dashboard);
        assert_eq!(Route::from_path("/tasks/"), Route::Tasks);
    }

    #[test]
    fn test_allow_lists() {
        assert!(Route::Tasks.permits(None));
        assert!(Route::Kpis.permits(Some(Role::Employee)));
        assert!(!Route::Kpis.permits(Some(Role::User)));
        assert!(Route::Team.permits(Some(Role::Manager)));
        assert!(!Route::Team.permits(Some(Role::Employee)));
        assert!(!Route::Accounts.permits(Some(Role::Manager)));
        assert!(!Route::AuditLogs.permits(None));
    }
}

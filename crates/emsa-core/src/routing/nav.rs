use crate::auth::Role;

use super::Route;

/// One sidebar entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NavItem {
    pub route: Route,
    pub label: &'static str,
}

const fn item(route: Route, label: &'static str) -> NavItem {
    NavItem { route, label }
}

const ADMIN_MENU: &[NavItem] = &[
    item(Route::Dashboard, "Dashboard"),
    item(Route::Accounts, "All Accounts"),
    item(Route::Employees, "Employees"),
    item(Route::Users, "Users"),
    item(Route::Departments, "Departments"),
    item(Route::Projects, "Projects"),
    item(Route::Tasks, "Tasks"),
    item(Route::Kpis, "KPIs"),
    item(Route::LeaveRequests, "Leave Requests"),
    item(Route::Performance, "Performance"),
    item(Route::AuditLogs, "Audit Logs"),
    item(Route::Profile, "My Profile"),
];

const MANAGER_MENU: &[NavItem] = &[
    item(Route::Dashboard, "Dashboard"),
    item(Route::Team, "My Team"),
    item(Route::Departments, "Departments"),
    item(Route::Projects, "Projects"),
    item(Route::Tasks, "Tasks"),
    item(Route::Kpis, "KPIs"),
    item(Route::LeaveRequests, "Leave Requests"),
    item(Route::Performance, "Performance"),
    item(Route::Profile, "My Profile"),
];

const EMPLOYEE_MENU: &[NavItem] = &[
    item(Route::Dashboard, "Dashboard"),
    item(Route::Departments, "Departments"),
    item(Route::Projects, "Projects"),
    item(Route::Tasks, "My Tasks"),
    item(Route::Kpis, "My KPIs"),
    item(Route::LeaveRequests, "My Requests"),
    item(Route::Performance, "My Reviews"),
    item(Route::Profile, "My Profile"),
];

const USER_MENU: &[NavItem] = &[
    item(Route::Dashboard, "Dashboard"),
    item(Route::Tasks, "My Tasks"),
    item(Route::LeaveRequests, "My Requests"),
    item(Route::Profile, "My Profile"),
];

/// Sidebar menu for a role. Unrecognized roles get the most limited menu.
pub fn menu_for(role: Option<Role>) -> &'static [NavItem] {
    match role {
        Some(Role::Admin) => ADMIN_MENU,
        Some(Role::Manager) => MANAGER_MENU,
        Some(Role::Employee) => EMPLOYEE_MENU,
        Some(Role::User) | None => USER_MENU,
    }
}

/// Sidebar label for a route, falling back to its page title.
pub fn label_for(role: Option<Role>, route: Route) -> &'static str {
    menu_for(role)
        .iter()
        .find(|i| i.route == route)
        .map(|i| i.label)
        .unwrap_or_else(|| route.title())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_every_item_is_permitted() {
        for role in Role::ALL.into_iter().map(Some).chain([None]) {
            for item in menu_for(role) {
                assert!(item.route.permits(role), "{:?} cannot open {}", role, item.route);
            }
        }
    }

    #[test]
    fn test_unknown_role_gets_user_menu() {
        assert_eq!(menu_for(None), menu_for(Some(Role::User)));
    }

    #[test]
    fn test_labels_vary_by_role() {
        assert_eq!(label_for(Some(Role::Admin), Route::Tasks), "Tasks");
        assert_eq!(label_for(Some(Role::Employee), Route::Tasks), "My Tasks");
        assert_eq!(label_for(Some(Role::User), Route::Kpis), "KPIs");
    }
}

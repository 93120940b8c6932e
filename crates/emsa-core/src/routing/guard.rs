//! The route guard, evaluated on every navigation.

use tracing::debug;

use crate::auth::SessionStore;

use super::{Route, DEFAULT_ROUTE};

/// What to show for a requested route.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GuardDecision {
    /// The session has not been restored yet.
    Loading,
    /// Show `route`, inside the sidebar/header shell when `shell` is set.
    Render { route: Route, shell: bool },
    Redirect(Route),
}

/// Decide a single navigation step.
pub fn guard(store: &SessionStore, route: Route) -> GuardDecision {
    if !store.is_initialized() {
        return GuardDecision::Loading;
    }

    if !store.is_authenticated() {
        return if route.is_public() {
            GuardDecision::Render {
                route,
                shell: false,
            }
        } else {
            GuardDecision::Redirect(Route::Login)
        };
    }

    if route.is_public() {
        return GuardDecision::Redirect(DEFAULT_ROUTE);
    }

    if route.permits(store.current_role()) {
        GuardDecision::Render { route, shell: true }
    } else {
        GuardDecision::Redirect(DEFAULT_ROUTE)
    }
}

/// Maximum redirects followed; every redirect target renders in the state
/// that produced it, so one hop is enough in practice.
const MAX_REDIRECTS: usize = 2;

/// Follow redirects until something renders or the store is still loading.
pub fn resolve(store: &SessionStore, route: Route) -> GuardDecision {
    let mut current = route;
    for _ in 0..=MAX_REDIRECTS {
        match guard(store, current) {
            GuardDecision::Redirect(target) => {
                debug!(from = %current, to = %target, "Route redirected");
                current = target;
            }
            decision => return decision,
        }
    }
    // Unreachable with the current table; fall back to the public route.
    GuardDecision::Render {
        route: Route::Login,
        shell: false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::{AuthPayload, MemoryStorage, UserProfile};

    fn store(role: Option<&str>) -> SessionStore {
        let mut store = SessionStore::new(Box::new(MemoryStorage::new()));
        store.initialize();
        if let Some(role) = role {
            store.login(AuthPayload::new(
                "tok",
                UserProfile {
                    username: "u".to_string(),
                    role: role.to_string(),
                    ..Default::default()
                },
            ));
        }
        store
    }

    #[test]
    fn test_loading_before_initialize() {
        let store = SessionStore::new(Box::new(MemoryStorage::new()));
        assert_eq!(guard(&store, Route::Tasks), GuardDecision::Loading);
        assert_eq!(resolve(&store, Route::Login), GuardDecision::Loading);
    }

    #[test]
    fn test_unauthenticated() {
        let store = store(None);
        assert_eq!(
            guard(&store, Route::Login),
            GuardDecision::Render { route: Route::Login, shell: false }
        );
        for route in Route::ALL.into_iter().filter(|r| !r.is_public()) {
            assert_eq!(guard(&store, route), GuardDecision::Redirect(Route::Login));
        }
    }

    #[test]
    fn test_authenticated_login_redirects_home() {
        let store = store(Some("USER"));
        assert_eq!(guard(&store, Route::Login), GuardDecision::Redirect(Route::Dashboard));
        assert_eq!(
            resolve(&store, Route::Login),
            GuardDecision::Render { route: Route::Dashboard, shell: true }
        );
    }

    #[test]
    fn test_role_denied_redirects_home() {
        let store = store(Some("MANAGER"));
        assert_eq!(guard(&store, Route::Accounts), GuardDecision::Redirect(Route::Dashboard));
        assert_eq!(
            guard(&store, Route::Team),
            GuardDecision::Render { route: Route::Team, shell: true }
        );
    }

    #[test]
    fn test_resolve_always_terminates_in_render() {
        for role in [None, Some("ADMIN"), Some("MANAGER"), Some("EMPLOYEE"), Some("USER"), Some("X")] {
            let store = store(role);
            for route in Route::ALL {
                assert!(matches!(resolve(&store, route), GuardDecision::Render { .. }));
            }
        }
    }
}

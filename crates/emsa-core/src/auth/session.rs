use tracing::{debug, info, warn};

use super::{AuthPayload, Role, Session, SessionStorage, UserProfile};

/// Storage key for the bearer token
pub const TOKEN_KEY: &str = "emsa_token";

/// Storage key for the JSON-encoded user profile
pub const USER_KEY: &str = "emsa_user";

/// Owner of the current authenticated session.
///
/// Token and user are always set and cleared together, in memory and in
/// storage. Until `initialize()` runs the store reports itself as not
/// initialized and the route guard shows a loading view.
pub struct SessionStore {
    storage: Box<dyn SessionStorage>,
    initialized: bool,
    session: Option<Session>,
    generation: u64,
}

impl SessionStore {
    pub fn new(storage: Box<dyn SessionStorage>) -> Self {
        Self {
            storage,
            initialized: false,
            session: None,
            generation: 0,
        }
    }

    // ========================================================================
    // Lifecycle
    // ========================================================================

    /// Restore the persisted session. Never fails: anything short of a
    /// complete, well-formed pair leaves the store unauthenticated.
    pub fn initialize(&mut self) {
        self.session = self.read_persisted();
        self.initialized = true;
        match &self.session {
            Some(session) => info!(
                username = %session.user.username,
                role = %session.user.role,
                "Restored persisted session"
            ),
            None => debug!("No persisted session"),
        }
    }

    fn read_persisted(&mut self) -> Option<Session> {
        let token = match self.storage.get(TOKEN_KEY) {
            Ok(token) => token,
            Err(e) => {
                warn!("Failed to read persisted token: {:#}", e);
                return None;
            }
        };
        let user = match self.storage.get(USER_KEY) {
            Ok(user) => user,
            Err(e) => {
                warn!("Failed to read persisted user: {:#}", e);
                return None;
            }
        };

        match (token, user) {
            (None, None) => None,
            (Some(token), Some(user_json)) if !token.is_empty() => {
                match serde_json::from_str::<UserProfile>(&user_json) {
                    Ok(user) => Some(Session { token, user }),
                    Err(e) => {
                        warn!("Discarding malformed persisted user: {}", e);
                        self.clear_storage();
                        None
                    }
                }
            }
            _ => {
                warn!("Discarding partial persisted session");
                self.clear_storage();
                None
            }
        }
    }

    /// Install a new authenticated session and persist it.
    pub fn login(&mut self, payload: AuthPayload) {
        let session = payload.into_session();

        if self.session.as_ref() != Some(&session) {
            self.generation += 1;
        }

        if let Err(e) = self.storage.set(TOKEN_KEY, &session.token) {
            warn!("Failed to persist token: {:#}", e);
        }
        match serde_json::to_string(&session.user) {
            Ok(json) => {
                if let Err(e) = self.storage.set(USER_KEY, &json) {
                    warn!("Failed to persist user: {:#}", e);
                }
            }
            Err(e) => warn!("Failed to encode user profile: {}", e),
        }

        info!(
            username = %session.user.username,
            role = %session.user.role,
            "Signed in"
        );
        self.session = Some(session);
        self.initialized = true;
    }

    /// Clear the session from memory and storage.
    pub fn logout(&mut self) {
        if let Some(session) = self.session.take() {
            self.generation += 1;
            info!(username = %session.user.username, "Signed out");
        }
        self.clear_storage();
    }

    /// Forced logout after the server rejected the token.
    pub fn invalidate(&mut self) {
        warn!("Session rejected by server, signing out");
        self.logout();
    }

    fn clear_storage(&self) {
        for key in [TOKEN_KEY, USER_KEY] {
            if let Err(e) = self.storage.remove(key) {
                warn!("Failed to remove persisted {}: {:#}", key, e);
            }
        }
    }

    // ========================================================================
    // Reads
    // ========================================================================

    pub fn is_initialized(&self) -> bool {
        self.initialized
    }

    pub fn is_authenticated(&self) -> bool {
        self.session.is_some()
    }

    pub fn session(&self) -> Option<&Session> {
        self.session.as_ref()
    }

    pub fn token(&self) -> Option<&str> {
        self.session.as_ref().map(|s| s.token.as_str())
    }

    pub fn user(&self) -> Option<&UserProfile> {
        self.session.as_ref().map(|s| &s.user)
    }

    /// Role of the signed-in user, `None` when signed out or unrecognized.
    pub fn current_role(&self) -> Option<Role> {
        self.user().and_then(UserProfile::role)
    }

    pub fn is_admin(&self) -> bool {
        self.current_role() == Some(Role::Admin)
    }

    pub fn is_manager(&self) -> bool {
        self.current_role() == Some(Role::Manager)
    }

    pub fn is_employee(&self) -> bool {
        self.current_role() == Some(Role::Employee)
    }

    pub fn is_user(&self) -> bool {
        self.current_role() == Some(Role::User)
    }

    /// Admins and managers may create and edit shared records.
    pub fn can_manage(&self) -> bool {
        self.is_admin() || self.is_manager()
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }

    /// Whether a result issued under `generation` still belongs to this session.
    pub fn is_current(&self, generation: u64) -> bool {
        self.generation == generation
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::MemoryStorage;

    fn user(role: &str) -> UserProfile {
        UserProfile {
            id: Some(7),
            username: "jdoe".to_string(),
            email: Some("jdoe@example.com".to_string()),
            full_name: Some("Jane Doe".to_string()),
            role: role.to_string(),
        }
    }

    fn store_with(storage: &MemoryStorage) -> SessionStore {
        let mut store = SessionStore::new(Box::new(storage.clone()));
        store.initialize();
        store
    }

    #[test]
    fn test_not_initialized_until_initialize() {
        let store = SessionStore::new(Box::new(MemoryStorage::new()));
        assert!(!store.is_initialized());
        assert!(!store.is_authenticated());
    }

    #[test]
    fn test_empty_storage_is_unauthenticated() {
        let store = store_with(&MemoryStorage::new());
        assert!(store.is_initialized());
        assert_eq!(store.current_role(), None);
        assert!(store.token().is_none());
    }

    #[test]
    fn test_login_persists_both_keys() {
        let storage = MemoryStorage::new();
        let mut store = store_with(&storage);
        store.login(AuthPayload::new("tok", user("ADMIN")));

        assert_eq!(storage.get(TOKEN_KEY).unwrap().as_deref(), Some("tok"));
        let saved: UserProfile =
            serde_json::from_str(&storage.get(USER_KEY).unwrap().unwrap()).unwrap();
        assert_eq!(saved, user("ADMIN"));
        assert!(store.is_admin());
        assert!(store.can_manage());
    }

    #[test]
    fn test_login_is_idempotent() {
        let storage = MemoryStorage::new();
        let mut store = store_with(&storage);
        store.login(AuthPayload::new("tok", user("MANAGER")));
        let generation = store.generation();
        let session = store.session().cloned();

        store.login(AuthPayload::new("tok", user("MANAGER")));
        assert_eq!(store.generation(), generation);
        assert_eq!(store.session().cloned(), session);
    }

    #[test]
    fn test_logout_clears_memory_and_storage() {
        let storage = MemoryStorage::new();
        let mut store = store_with(&storage);
        store.login(AuthPayload::new("tok", user("USER")));
        store.logout();

        assert!(!store.is_authenticated());
        assert!(storage.is_empty());

        let generation = store.generation();
        store.logout();
        assert_eq!(store.generation(), generation);
    }

    #[test]
    fn test_restores_persisted_session() {
        let storage = MemoryStorage::new();
        store_with(&storage).login(AuthPayload::new("tok", user("EMPLOYEE")));

        let restored = store_with(&storage);
        assert!(restored.is_employee());
        assert_eq!(restored.token(), Some("tok"));
    }

    #[test]
    fn test_partial_state_is_cleared() {
        let storage = MemoryStorage::new();
        storage.set(TOKEN_KEY, "tok").unwrap();
        let store = store_with(&storage);
        assert!(!store.is_authenticated());
        assert!(storage.is_empty());

        storage.set(TOKEN_KEY, "tok").unwrap();
        storage.set(USER_KEY, "{not json").unwrap();
        let store = store_with(&storage);
        assert!(!store.is_authenticated());
        assert!(storage.is_empty());
    }

    #[test]
    fn test_unknown_role_has_no_privileges() {
        let mut store = store_with(&MemoryStorage::new());
        store.login(AuthPayload::new("tok", user("admin")));
        assert!(store.is_authenticated());
        assert_eq!(store.current_role(), None);
        assert!(!store.is_admin());
        assert!(!store.is_user());
        assert!(!store.can_manage());
    }

    #[test]
    fn test_generation_tracks_session_changes() {
        let mut store = store_with(&MemoryStorage::new());
        let start = store.generation();

        store.login(AuthPayload::new("a", user("USER")));
        let first = store.generation();
        assert!(first > start);
        assert!(!store.is_current(start));

        store.login(AuthPayload::new("b", user("USER")));
        assert!(store.generation() > first);

        store.invalidate();
        assert!(!store.is_current(first));
        assert!(!store.is_authenticated());
    }
}

//! Authentication module: the client-side session and its persistence.
//!
//! This module provides:
//! - `SessionStore`: the single owner of "who is logged in", with an explicit
//!   `initialize` / `login` / `logout` lifecycle
//! - `AuthPayload`: the login response normalized into one canonical shape
//! - `Role`: the closed set of account roles
//! - `SessionStorage` backends: files, OS keychain, or memory
//!
//! The session is persisted under two keys (`emsa_token`, `emsa_user`) that
//! are always written and cleared together.

pub mod keychain;
pub mod payload;
pub mod role;
pub mod session;
pub mod storage;

pub use keychain::KeyringStorage;
pub use payload::{AuthPayload, AuthPayloadError, Session, UserProfile};
pub use role::Role;
pub use session::{SessionStore, TOKEN_KEY, USER_KEY};
pub use storage::{open_storage, FileStorage, MemoryStorage, SessionStorage};

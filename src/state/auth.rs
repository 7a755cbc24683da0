//! Auth-session state for the current user.
//!
//! SYSTEM CONTEXT
//! ==============
//! The session store is the only owner of the identity and bearer token, and
//! the only place authorization headers are built. It mirrors the session to
//! durable storage so the next run starts logged in.
//!
//! DESIGN
//! ======
//! `SessionStore` is a cheap `Clone` handle over shared state, injected into
//! whatever needs headers instead of being reachable globally. Identity and
//! token live in one `Session` value, so they are set and cleared together.
//! Every operation reports failure through its return value after logging;
//! nothing here returns an error to the caller.

#[cfg(test)]
#[path = "auth_test.rs"]
mod auth_test;

use std::sync::{Arc, PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};

use crate::net::api::TodoApi;
pub use crate::net::types::AuthHeaders;
use crate::net::types::{Credentials, PublicAccess, User, UserSettings};
use crate::util::storage::{Storage, TOKEN_KEY, USER_KEY, save_json};

const AUTHORIZATION: &str = "Authorization";

/// Anything that can produce authorization headers for a request.
pub trait AuthHeaderSource: Send + Sync {
    fn auth_headers(&self) -> AuthHeaders;
}

impl AuthHeaderSource for AuthHeaders {
    fn auth_headers(&self) -> AuthHeaders {
        self.clone()
    }
}

/// Identity plus the bearer token issued with it.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Session {
    pub user: User,
    pub token: String,
}

/// Snapshot of everything the session store holds.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct AuthState {
    pub session: Option<Session>,
    pub public_access: Option<PublicAccess>,
}

impl AuthState {
    #[must_use]
    pub fn is_authenticated(&self) -> bool {
        self.session.is_some()
    }
}

#[derive(Clone)]
pub struct SessionStore {
    api: Arc<dyn TodoApi>,
    storage: Arc<dyn Storage>,
    state: Arc<RwLock<AuthState>>,
}

impl SessionStore {
    /// Create the store, resuming any session persisted in `storage`.
    pub fn new(api: Arc<dyn TodoApi>, storage: Arc<dyn Storage>) -> Self {
        let session = restore_session(storage.as_ref());
        let state = AuthState { session, public_access: None };
        Self { api, storage, state: Arc::new(RwLock::new(state)) }
    }

    fn read(&self) -> RwLockReadGuard<'_, AuthState> {
        self.state.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write(&self) -> RwLockWriteGuard<'_, AuthState> {
        self.state.write().unwrap_or_else(PoisonError::into_inner)
    }

    // =========================================================================
    // ACCESSORS
    // =========================================================================

    #[must_use]
    pub fn is_authenticated(&self) -> bool {
        self.read().is_authenticated()
    }

    #[must_use]
    pub fn user(&self) -> Option<User> {
        self.read().session.as_ref().map(|s| s.user.clone())
    }

    #[must_use]
    pub fn token(&self) -> Option<String> {
        self.read().session.as_ref().map(|s| s.token.clone())
    }

    #[must_use]
    pub fn public_access(&self) -> Option<PublicAccess> {
        self.read().public_access.clone()
    }

    #[must_use]
    pub fn snapshot(&self) -> AuthState {
        self.read().clone()
    }

    // =========================================================================
    // OPERATIONS
    // =========================================================================

    /// Exchange credentials for a session. Returns `false` on any failure,
    /// leaving the current state untouched.
    pub async fn login(&self, username: &str, password: &str) -> bool {
        let credentials = Credentials { username: username.to_owned(), password: password.to_owned() };
        let response = match self.api.login(&credentials).await {
            Ok(response) => response,
            Err(e) => {
                tracing::warn!(username, error = %e, reason = ?e.reason(), "login failed");
                return false;
            }
        };
        if response.token.is_empty() {
            tracing::warn!(username, "login failed: server returned an empty token");
            return false;
        }

        let session = Session { user: response.user, token: response.token };
        self.persist_session(&session);
        self.write().session = Some(session);
        tracing::info!(username, "logged in");
        true
    }

    /// Create an account. Does not log in.
    pub async fn register(&self, username: &str, password: &str) -> bool {
        let credentials = Credentials { username: username.to_owned(), password: password.to_owned() };
        match self.api.register(&credentials).await {
            Ok(user) => {
                tracing::info!(username = %user.username, id = user.id, "registered");
                true
            }
            Err(e) => {
                tracing::warn!(username, error = %e, reason = ?e.reason(), "register failed");
                false
            }
        }
    }

    /// Drop the session from memory and storage. No network call.
    pub fn logout(&self) {
        self.write().session = None;
        clear_persisted(self.storage.as_ref());
        tracing::info!("logged out");
    }

    /// Re-read the persisted identity into memory.
    ///
    /// The held token is never changed. With no session in memory, the stored
    /// identity is adopted only together with a stored token.
    pub fn init_auth(&self) {
        let Some(raw) = self.storage.get_item(USER_KEY) else {
            return;
        };
        let user = match serde_json::from_str::<User>(&raw) {
            Ok(user) => user,
            Err(e) => {
                tracing::warn!(error = %e, "failed to parse saved user data");
                return;
            }
        };

        let mut state = self.write();
        if let Some(session) = state.session.as_mut() {
            session.user = user;
            return;
        }
        match self.storage.get_item(TOKEN_KEY).filter(|t| !t.is_empty()) {
            Some(token) => state.session = Some(Session { user, token }),
            None => tracing::debug!("stored identity has no token; not adopting it"),
        }
    }

    /// Refresh the server's public-access snapshot. Failure keeps the old one.
    pub async fn fetch_public_access(&self) {
        match self.api.public_access().await {
            Ok(snapshot) => self.write().public_access = Some(snapshot),
            Err(e) => tracing::warn!(error = %e, reason = ?e.reason(), "failed to fetch public access status"),
        }
    }

    /// Change the user's sharing setting on the server.
    pub async fn update_user_settings(&self, settings: UserSettings) -> bool {
        let headers = self.auth_headers();
        let applied = match self.api.update_settings(&headers, settings).await {
            Ok(applied) => applied,
            Err(e) => {
                tracing::warn!(error = %e, reason = ?e.reason(), "failed to update user settings");
                return false;
            }
        };

        let updated_user = {
            let mut state = self.write();
            state.session.as_mut().map(|session| {
                session.user.public_access = Some(applied.public_access);
                session.user.clone()
            })
        };
        if let Some(user) = updated_user {
            if let Err(e) = save_json(self.storage.as_ref(), USER_KEY, &user) {
                tracing::warn!(error = %e, "failed to persist updated user");
            }
        }

        self.fetch_public_access().await;
        true
    }

    fn persist_session(&self, session: &Session) {
        let result = save_json(self.storage.as_ref(), USER_KEY, &session.user)
            .and_then(|()| self.storage.set_item(TOKEN_KEY, &session.token));
        if let Err(e) = result {
            tracing::warn!(error = %e, "failed to persist session; it will not survive a restart");
            clear_persisted(self.storage.as_ref());
        }
    }
}

impl AuthHeaderSource for SessionStore {
    /// Empty without a session, otherwise exactly `Authorization: Bearer <token>`.
    fn auth_headers(&self) -> AuthHeaders {
        let state = self.read();
        let Some(session) = state.session.as_ref() else {
            return AuthHeaders::new();
        };
        AuthHeaders::from([(AUTHORIZATION.to_owned(), format!("Bearer {}", session.token))])
    }
}

fn restore_session(storage: &dyn Storage) -> Option<Session> {
    let raw_user = storage.get_item(USER_KEY);
    let raw_token = storage.get_item(TOKEN_KEY);
    let anything_saved = raw_user.is_some() || raw_token.is_some();
    match (raw_user.filter(|s| !s.is_empty()), raw_token.filter(|s| !s.is_empty())) {
        (Some(raw), Some(token)) => match serde_json::from_str::<User>(&raw) {
            Ok(user) => {
                tracing::debug!(username = %user.username, "restored saved session");
                return Some(Session { user, token });
            }
            Err(e) => tracing::warn!(error = %e, "failed to parse saved user data; clearing session"),
        },
        (None, None) if !anything_saved => return None,
        _ => tracing::warn!("saved session is incomplete; clearing it"),
    }
    clear_persisted(storage);
    None
}

fn clear_persisted(storage: &dyn Storage) {
    for key in [USER_KEY, TOKEN_KEY] {
        if let Err(e) = storage.remove_item(key) {
            tracing::warn!(key, error = %e, "failed to clear saved session");
        }
    }
}

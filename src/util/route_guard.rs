//! Navigation guard evaluated before every route change.
//!
//! SYSTEM CONTEXT
//! ==============
//! A session that is already logged in has no business on the login page, so
//! navigating there bounces to the task list. The check reads the persisted
//! session marker rather than in-memory state; the session store keeps that
//! marker in lockstep with its own state.

#[cfg(test)]
#[path = "route_guard_test.rs"]
mod route_guard_test;

use super::storage::{Storage, USER_KEY};

/// Routes known to the app.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Route {
    Todos,
    Login,
    History,
}

impl Route {
    #[must_use]
    pub fn path(self) -> &'static str {
        match self {
            Self::Todos => "/",
            Self::Login => "/login",
            Self::History => "/history",
        }
    }

    /// Match a path, ignoring a trailing slash and any query string.
    #[must_use]
    pub fn from_path(path: &str) -> Option<Self> {
        let path = path.split(['?', '#']).next().unwrap_or_default();
        let path = match path.trim_end_matches('/') {
            "" => "/",
            trimmed => trimmed,
        };
        [Self::Todos, Self::Login, Self::History]
            .into_iter()
            .find(|route| route.path() == path)
    }
}

/// Outcome of the guard for one navigation.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Navigation {
    Allow,
    Redirect(&'static str),
}

/// Redirect the login route to `/` when a non-empty session marker is persisted;
/// allow everything else unchanged.
#[must_use]
pub fn check_navigation(target: &str, storage: &dyn Storage) -> Navigation {
    if Route::from_path(target) == Some(Route::Login) && has_session_marker(storage) {
        tracing::debug!(path = target, "session present; redirecting away from login");
        return Navigation::Redirect(Route::Todos.path());
    }
    Navigation::Allow
}

fn has_session_marker(storage: &dyn Storage) -> bool {
    storage.get_item(USER_KEY).is_some_and(|user| !user.is_empty())
}

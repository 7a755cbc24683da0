//! Task-list state mirrored from the server.
//!
//! DESIGN
//! ======
//! The store owns its collection and mutates it through `&mut self`, so one
//! store never sees interleaved mutations. Every mutation waits for the
//! server's answer and only touches the collection on `Ok`; failures are
//! logged and reported through the return value. Headers are taken from the
//! injected source on every call, never cached, so a login or logout between
//! calls takes effect immediately.

#[cfg(test)]
#[path = "todos_test.rs"]
mod todos_test;

use std::sync::Arc;

use super::auth::{AuthHeaderSource, SessionStore};
use crate::net::api::TodoApi;
use crate::net::types::{HistoryDay, NewTask, Task, TaskPatch};

/// Counts over the current collection.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct TodoStats {
    pub total: usize,
    pub completed: usize,
}

pub struct TodoStore<H = SessionStore> {
    api: Arc<dyn TodoApi>,
    headers: H,
    todos: Vec<Task>,
    loading: bool,
}

impl<H: AuthHeaderSource> TodoStore<H> {
    pub fn new(api: Arc<dyn TodoApi>, headers: H) -> Self {
        Self { api, headers, todos: Vec::new(), loading: false }
    }

    #[must_use]
    pub fn todos(&self) -> &[Task] {
        &self.todos
    }

    #[must_use]
    pub fn get(&self, id: i64) -> Option<&Task> {
        self.todos.iter().find(|t| t.id == id)
    }

    #[must_use]
    pub fn is_loading(&self) -> bool {
        self.loading
    }

    #[must_use]
    pub fn stats(&self) -> TodoStats {
        TodoStats {
            total: self.todos.len(),
            completed: self.todos.iter().filter(|t| t.completed).count(),
        }
    }

    /// Replace the collection with the server's list. On failure the old
    /// collection stays; `loading` is cleared either way.
    pub async fn fetch_todos(&mut self) {
        self.loading = true;
        let headers = self.headers.auth_headers();
        match self.api.list_todos(&headers).await {
            Ok(todos) => {
                tracing::debug!(count = todos.len(), "fetched todos");
                self.todos = todos;
            }
            Err(e) => tracing::warn!(error = %e, reason = ?e.reason(), "failed to fetch todos"),
        }
        self.loading = false;
    }

    /// Create a task and append the server's record.
    pub async fn add_todo(&mut self, title: &str, emoji: &str, description: Option<&str>) -> bool {
        if title.trim().is_empty() || emoji.trim().is_empty() {
            tracing::warn!("failed to add todo: title and emoji are required");
            return false;
        }
        let new_task = NewTask {
            title: title.to_owned(),
            description: description.map(ToOwned::to_owned),
            emoji: emoji.to_owned(),
        };
        let headers = self.headers.auth_headers();
        match self.api.create_todo(&headers, &new_task).await {
            Ok(task) => {
                tracing::info!(id = task.id, title = %task.title, "added todo");
                self.todos.push(task);
                true
            }
            Err(e) => {
                tracing::warn!(error = %e, reason = ?e.reason(), "failed to add todo");
                false
            }
        }
    }

    /// Flip `completed` on the server, then merge its answer in place.
    /// An id missing from the local collection is a silent no-op.
    pub async fn toggle_todo(&mut self, id: i64) {
        let Some(current) = self.get(id).map(|t| t.completed) else {
            tracing::debug!(id, "toggle skipped: todo not in local list");
            return;
        };
        self.apply_patch(id, &TaskPatch::completed(!current)).await;
    }

    /// Change any subset of a task's fields. Returns `false` when the id is
    /// not in the local list, the patch is empty, or the server refuses.
    pub async fn edit_todo(&mut self, id: i64, patch: &TaskPatch) -> bool {
        if self.get(id).is_none() {
            tracing::debug!(id, "edit skipped: todo not in local list");
            return false;
        }
        if patch.is_empty() {
            tracing::debug!(id, "edit skipped: nothing to change");
            return false;
        }
        self.apply_patch(id, patch).await
    }

    async fn apply_patch(&mut self, id: i64, patch: &TaskPatch) -> bool {
        let headers = self.headers.auth_headers();
        match self.api.update_todo(&headers, id, patch).await {
            Ok(canonical) => {
                if let Some(local) = self.todos.iter_mut().find(|t| t.id == id) {
                    local.merge(canonical);
                }
                true
            }
            Err(e) => {
                tracing::warn!(id, error = %e, reason = ?e.reason(), "failed to update todo");
                false
            }
        }
    }

    /// Delete on the server, then drop exactly that id locally.
    pub async fn delete_todo(&mut self, id: i64) {
        let headers = self.headers.auth_headers();
        match self.api.delete_todo(&headers, id).await {
            Ok(()) => {
                self.todos.retain(|t| t.id != id);
                tracing::info!(id, "deleted todo");
            }
            Err(e) => tracing::warn!(id, error = %e, reason = ?e.reason(), "failed to delete todo"),
        }
    }

    /// Per-day history straight from the server; empty on failure.
    pub async fn history(&self) -> Vec<HistoryDay> {
        let headers = self.headers.auth_headers();
        self.api.history(&headers).await.unwrap_or_else(|e| {
            tracing::warn!(error = %e, reason = ?e.reason(), "failed to fetch history");
            Vec::new()
        })
    }
}

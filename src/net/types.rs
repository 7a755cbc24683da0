//! Wire DTOs for the client/server boundary.
//!
//! DESIGN
//! ======
//! These types mirror the server's JSON payloads so serde round-trips stay
//! lossless. Timestamps stay as the server's RFC 3339 strings because the
//! client never computes with them.

#[cfg(test)]
#[path = "types_test.rs"]
mod types_test;

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// Header name/value pairs attached to authorized requests.
pub type AuthHeaders = BTreeMap<String, String>;

// =============================================================================
// ERROR
// =============================================================================

/// Coarse category of a failed API call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailureReason {
    /// The request never produced an HTTP response (DNS, connect, timeout).
    Transport,
    /// The server answered with a non-success status.
    Status,
    /// The response body did not match the expected schema.
    Decode,
    /// The server answered 2xx but reported `success: false`.
    Rejected,
}

/// Errors produced by API calls.
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    /// The underlying HTTP client could not be constructed.
    #[error("HTTP client build failed: {0}")]
    HttpClientBuild(String),

    /// The HTTP request failed before a response arrived.
    #[error("API request failed: {0}")]
    Transport(String),

    /// The server returned a non-success HTTP status.
    #[error("API response error: status {status}")]
    Status { status: u16, body: String },

    /// The response body could not be deserialized.
    #[error("API response parse failed: {0}")]
    Decode(String),

    /// The server accepted the request but refused the operation.
    #[error("API rejected request: {0}")]
    Rejected(String),
}

impl ApiError {
    #[must_use]
    pub fn reason(&self) -> FailureReason {
        match self {
            Self::HttpClientBuild(_) | Self::Transport(_) => FailureReason::Transport,
            Self::Status { .. } => FailureReason::Status,
            Self::Decode(_) => FailureReason::Decode,
            Self::Rejected(_) => FailureReason::Rejected,
        }
    }

    /// HTTP status when the server answered with one.
    #[must_use]
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::Status { status, .. } => Some(*status),
            _ => None,
        }
    }
}

// =============================================================================
// AUTH
// =============================================================================

/// An authenticated user as returned by `/login`.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    /// Server-assigned user id.
    pub id: i64,
    pub username: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    /// Whether the user's list is readable without logging in.
    #[serde(default, alias = "publicAccess", skip_serializing_if = "Option::is_none")]
    pub public_access: Option<bool>,
    /// Read-only accounts may view but not mutate tasks.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub readonly: Option<bool>,
}

/// Body of `POST /login` and `POST /register`.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct Credentials {
    pub username: String,
    pub password: String,
}

/// Response of `POST /login`.
#[derive(Clone, Debug, PartialEq, Eq, Deserialize)]
pub struct LoginResponse {
    pub user: User,
    pub token: String,
}

/// Server's current sharing setting from `GET /public-access`.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct PublicAccess {
    pub public_access: bool,
    pub username: String,
}

/// Body of `PUT /user/settings`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserSettings {
    pub public_access: bool,
}

/// `{success, data, message}` wrapper used by register and settings.
#[derive(Clone, Debug, PartialEq, Eq, Deserialize)]
pub struct ApiEnvelope<T> {
    #[serde(default = "default_success")]
    pub success: bool,
    pub data: Option<T>,
    #[serde(default)]
    pub message: String,
}

fn default_success() -> bool {
    true
}

impl<T> ApiEnvelope<T> {
    /// Unwrap `data`, turning `success: false` or a missing payload into an error.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError::Rejected`] when the server refused the operation and
    /// [`ApiError::Decode`] when it claimed success without a payload.
    pub fn into_data(self) -> Result<T, ApiError> {
        if !self.success {
            return Err(ApiError::Rejected(self.message));
        }
        self.data.ok_or_else(|| ApiError::Decode("missing `data` in response".to_owned()))
    }
}

// =============================================================================
// TASKS
// =============================================================================

/// A single to-do item as stored by the server.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Task {
    /// Server-assigned id, unique within a user's list.
    pub id: i64,
    pub title: String,
    #[serde(default)]
    pub description: Option<String>,
    /// Single glyph tag shown beside the title.
    pub emoji: String,
    pub completed: bool,
    pub created_at: String,
    pub updated_at: String,
}

impl Task {
    /// Overwrite every field with the server's canonical copy, keeping `self`
    /// in its slot so references into the collection stay valid.
    pub fn merge(&mut self, canonical: Task) {
        let Task { id, title, description, emoji, completed, created_at, updated_at } = canonical;
        self.id = id;
        self.title = title;
        self.description = description;
        self.emoji = emoji;
        self.completed = completed;
        self.created_at = created_at;
        self.updated_at = updated_at;
    }
}

/// Body of `POST /todos`.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct NewTask {
    pub title: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub emoji: String,
}

/// Body of `PUT /todos/{id}`; only present fields are changed server-side.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
pub struct TaskPatch {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub emoji: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub completed: Option<bool>,
}

impl TaskPatch {
    #[must_use]
    pub fn completed(completed: bool) -> Self {
        Self { completed: Some(completed), ..Self::default() }
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.title.is_none() && self.description.is_none() && self.emoji.is_none() && self.completed.is_none()
    }
}

/// Server-computed aggregate of the tasks created on one calendar day.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct HistoryDay {
    /// `YYYY-MM-DD`.
    pub date: String,
    pub count: i64,
    pub completed_count: i64,
    #[serde(default)]
    pub tasks: Vec<Task>,
}

//! In-memory fake of the to-do service for store tests.

use std::sync::{Arc, Mutex};

use crate::net::api::TodoApi;
use crate::net::types::{
    ApiError, AuthHeaders, Credentials, HistoryDay, LoginResponse, NewTask, PublicAccess, Task, TaskPatch, User,
    UserSettings,
};
use crate::util::storage::{MemoryStorage, Storage, StorageError, TOKEN_KEY};

pub(crate) const ALICE_TOKEN: &str = "alice-token";
pub(crate) const CREATED_AT: &str = "2025-01-02T08:00:00Z";
pub(crate) const UPDATED_AT: &str = "2025-01-02T09:00:00Z";

/// Storage whose token writes always fail; everything else goes to memory.
#[derive(Default)]
pub(crate) struct TokenWriteFailingStorage {
    inner: MemoryStorage,
}

impl Storage for TokenWriteFailingStorage {
    fn get_item(&self, key: &str) -> Option<String> {
        self.inner.get_item(key)
    }

    fn set_item(&self, key: &str, value: &str) -> Result<(), StorageError> {
        if key == TOKEN_KEY {
            return Err(StorageError::Io {
                path: "token-write-fails.json".into(),
                source: std::io::Error::other("disk full"),
            });
        }
        self.inner.set_item(key, value)
    }

    fn remove_item(&self, key: &str) -> Result<(), StorageError> {
        self.inner.remove_item(key)
    }
}

pub(crate) fn alice() -> User {
    User { id: 1, username: "alice".to_owned(), email: None, public_access: Some(false), readonly: None }
}

pub(crate) fn alice_headers() -> AuthHeaders {
    AuthHeaders::from([("Authorization".to_owned(), format!("Bearer {ALICE_TOKEN}"))])
}

pub(crate) fn make_task(id: i64, title: &str, completed: bool) -> Task {
    Task {
        id,
        title: title.to_owned(),
        description: None,
        emoji: "📝".to_owned(),
        completed,
        created_at: CREATED_AT.to_owned(),
        updated_at: CREATED_AT.to_owned(),
    }
}

#[derive(Default)]
struct FakeState {
    failing: bool,
    todos: Vec<Task>,
    next_id: i64,
    public_access: bool,
    calls: Vec<String>,
    headers_seen: Vec<AuthHeaders>,
}

/// Behaves like the real server for user `alice` / `secret`.
///
/// `set_failing(true)` turns every call into a 500.
#[derive(Default)]
pub(crate) struct FakeBackend {
    state: Mutex<FakeState>,
}

impl FakeBackend {
    pub(crate) fn new() -> Arc<Self> {
        Self::with_todos(Vec::new())
    }

    pub(crate) fn with_todos(todos: Vec<Task>) -> Arc<Self> {
        let next_id = todos.iter().map(|t| t.id).max().unwrap_or(0) + 100;
        Arc::new(Self { state: Mutex::new(FakeState { todos, next_id, ..FakeState::default() }) })
    }

    pub(crate) fn set_failing(&self, failing: bool) {
        self.state.lock().unwrap().failing = failing;
    }

    pub(crate) fn calls(&self) -> Vec<String> {
        self.state.lock().unwrap().calls.clone()
    }

    pub(crate) fn headers_seen(&self) -> Vec<AuthHeaders> {
        self.state.lock().unwrap().headers_seen.clone()
    }

    pub(crate) fn server_todos(&self) -> Vec<Task> {
        self.state.lock().unwrap().todos.clone()
    }

    pub(crate) fn server_public_access(&self) -> bool {
        self.state.lock().unwrap().public_access
    }

    fn begin(&self, call: String, headers: Option<&AuthHeaders>) -> Result<std::sync::MutexGuard<'_, FakeState>, ApiError> {
        let mut state = self.state.lock().unwrap();
        state.calls.push(call);
        if let Some(headers) = headers {
            state.headers_seen.push(headers.clone());
        }
        if state.failing {
            return Err(ApiError::Status { status: 500, body: "fake outage".to_owned() });
        }
        if headers.is_some_and(|h| *h != alice_headers()) {
            return Err(ApiError::Status { status: 401, body: String::new() });
        }
        Ok(state)
    }
}

fn not_found() -> ApiError {
    ApiError::Status { status: 404, body: String::new() }
}

#[async_trait::async_trait]
impl TodoApi for FakeBackend {
    async fn login(&self, credentials: &Credentials) -> Result<LoginResponse, ApiError> {
        let _state = self.begin("POST /login".to_owned(), None)?;
        match (credentials.username.as_str(), credentials.password.as_str()) {
            ("alice", "secret") => Ok(LoginResponse { user: alice(), token: ALICE_TOKEN.to_owned() }),
            ("blank", _) => Ok(LoginResponse { user: alice(), token: String::new() }),
            _ => Err(ApiError::Status { status: 401, body: String::new() }),
        }
    }

    async fn register(&self, credentials: &Credentials) -> Result<User, ApiError> {
        let _state = self.begin("POST /register".to_owned(), None)?;
        if credentials.username == "alice" {
            return Err(ApiError::Rejected("username exists".to_owned()));
        }
        Ok(User { id: 2, username: credentials.username.clone(), email: None, public_access: Some(false), readonly: Some(false) })
    }

    async fn public_access(&self) -> Result<PublicAccess, ApiError> {
        let state = self.begin("GET /public-access".to_owned(), None)?;
        Ok(PublicAccess { public_access: state.public_access, username: "alice".to_owned() })
    }

    async fn update_settings(&self, headers: &AuthHeaders, settings: UserSettings) -> Result<UserSettings, ApiError> {
        let mut state = self.begin("PUT /user/settings".to_owned(), Some(headers))?;
        state.public_access = settings.public_access;
        Ok(settings)
    }

    async fn list_todos(&self, headers: &AuthHeaders) -> Result<Vec<Task>, ApiError> {
        let state = self.begin("GET /todos".to_owned(), Some(headers))?;
        Ok(state.todos.clone())
    }

    async fn create_todo(&self, headers: &AuthHeaders, task: &NewTask) -> Result<Task, ApiError> {
        let mut state = self.begin("POST /todos".to_owned(), Some(headers))?;
        let id = state.next_id;
        state.next_id += 1;
        let created = Task {
            id,
            title: task.title.clone(),
            description: task.description.clone(),
            emoji: task.emoji.clone(),
            completed: false,
            created_at: CREATED_AT.to_owned(),
            updated_at: CREATED_AT.to_owned(),
        };
        state.todos.push(created.clone());
        Ok(created)
    }

    async fn update_todo(&self, headers: &AuthHeaders, id: i64, patch: &TaskPatch) -> Result<Task, ApiError> {
        let mut state = self.begin(format!("PUT /todos/{id}"), Some(headers))?;
        let task = state.todos.iter_mut().find(|t| t.id == id).ok_or_else(not_found)?;
        if let Some(title) = &patch.title {
            task.title.clone_from(title);
        }
        if let Some(description) = &patch.description {
            task.description = Some(description.clone());
        }
        if let Some(emoji) = &patch.emoji {
            task.emoji.clone_from(emoji);
        }
        if let Some(completed) = patch.completed {
            task.completed = completed;
        }
        task.updated_at = UPDATED_AT.to_owned();
        Ok(task.clone())
    }

    async fn delete_todo(&self, headers: &AuthHeaders, id: i64) -> Result<(), ApiError> {
        let mut state = self.begin(format!("DELETE /todos/{id}"), Some(headers))?;
        let before = state.todos.len();
        state.todos.retain(|t| t.id != id);
        if state.todos.len() == before {
            return Err(not_found());
        }
        Ok(())
    }

    async fn history(&self, headers: &AuthHeaders) -> Result<Vec<HistoryDay>, ApiError> {
        let state = self.begin("GET /history".to_owned(), Some(headers))?;
        if state.todos.is_empty() {
            return Ok(Vec::new());
        }
        let completed = state.todos.iter().filter(|t| t.completed).count();
        Ok(vec![HistoryDay {
            date: "2025-01-02".to_owned(),
            count: i64::try_from(state.todos.len()).unwrap(),
            completed_count: i64::try_from(completed).unwrap(),
            tasks: state.todos.clone(),
        }])
    }
}

//! Session-aware client for the personal to-do service.
//!
//! SYSTEM CONTEXT
//! ==============
//! `net` speaks the REST API, `state` mirrors the session and the task list
//! in memory, and `util` holds durable storage plus the navigation guard.
//! The `cli` crate wires these together for terminal use.

pub mod config;
pub mod net;
pub mod state;
pub mod util;

pub use config::ClientConfig;
pub use net::api::{HttpApi, TodoApi};
pub use net::types::{ApiError, FailureReason, HistoryDay, Task, TaskPatch, User};
pub use state::auth::{AuthHeaderSource, AuthHeaders, SessionStore};
pub use state::todos::TodoStore;
pub use util::route_guard::{Navigation, Route, check_navigation};
pub use util::storage::{FileStorage, MemoryStorage, Storage, StorageError};

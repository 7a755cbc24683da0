//! In-memory client state mirrored from the server.
//!
//! SYSTEM CONTEXT
//! ==============
//! `auth` owns the session and is the only source of authorization headers;
//! `todos` owns the task list and borrows headers from `auth` per request.

pub mod auth;
pub mod todos;

#[cfg(test)]
pub(crate) mod test_support;

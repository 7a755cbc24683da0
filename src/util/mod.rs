//! Durable storage and navigation helpers.
//!
//! SYSTEM CONTEXT
//! ==============
//! `storage` persists the session across process restarts; `route_guard`
//! decides whether a navigation target must be redirected.

pub mod route_guard;
pub mod storage;

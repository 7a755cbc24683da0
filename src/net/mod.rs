//! Networking modules for the to-do REST API.
//!
//! SYSTEM CONTEXT
//! ==============
//! `api` performs the HTTP calls and `types` defines the shared wire schema
//! and the error shape every call collapses into.

pub mod api;
pub mod types;

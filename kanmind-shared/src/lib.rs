//! # KanMind Shared Library
//!
//! Domain types, persistence and business rules for the KanMind task-board
//! service. The API crate is a thin HTTP layer over the `services` module.
//!
//! ## Module Organization
//!
//! - `db`: Connection pool and migrations
//! - `models`: Database models (users, boards, members, tasks, comments)
//! - `auth`: Password hashing, JWT identity tokens and the membership predicate
//! - `services`: Board, task and comment operations with their permission checks
//! - `error`: Domain error taxonomy

pub mod auth;
pub mod db;
pub mod error;
pub mod models;
pub mod services;

/// Current version of the KanMind shared library
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

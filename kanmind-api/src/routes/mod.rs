/// API route handlers
///
/// Each handler maps one operation to one response shape; the shape is
/// fixed per handler and never chosen at runtime.
///
/// - `health`: Health check
/// - `auth`: Registration and login
/// - `users`: Email lookup
/// - `boards`: Board listing and lifecycle
/// - `tasks`: Tasks and the assigned/reviewing views
/// - `comments`: Task comments

pub mod auth;
pub mod boards;
pub mod comments;
pub mod health;
pub mod tasks;
pub mod users;

/// Middleware for the API server
///
/// - `auth`: JWT bearer authentication for everything under `/api` except
///   registration and login

pub mod auth;

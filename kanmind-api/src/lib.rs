//! # KanMind API Server Library
//!
//! HTTP layer over `kanmind_shared::services`.
//!
//! ## Modules
//!
//! - `app`: Application state and router builder
//! - `config`: Configuration from environment variables
//! - `error`: Error handling and HTTP response mapping
//! - `extract`: JSON extractor with API-shaped rejections
//! - `middleware`: Bearer-token authentication
//! - `routes`: Route handlers

pub mod app;
pub mod config;
pub mod error;
pub mod extract;
pub mod middleware;
pub mod routes;

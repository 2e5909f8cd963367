//! Common test utilities for HTTP integration tests
//!
//! Builds the full router against a real PostgreSQL database named by
//! `DATABASE_URL`. Without it, `TestContext::new` returns `None` and the
//! test returns early.

#![allow(dead_code)]

use axum::body::Body;
use axum::http::{header, Method, Request, StatusCode};
use kanmind_api::app::{build_router, AppState};
use kanmind_api::config::Config;
use serde_json::{json, Value};
use sqlx::PgPool;
use tower::ServiceExt;
use uuid::Uuid;

const TEST_JWT_SECRET: &str = "integration-test-secret-at-least-32-chars";

/// Router plus the resources behind it
pub struct TestContext {
    pub app: axum::Router,
    pub db: PgPool,
    pub config: Config,
}

/// A registered account
pub struct TestUser {
    pub id: Uuid,
    pub email: String,
    pub fullname: String,
    pub token: String,
}

impl TestContext {
    pub async fn new() -> Option<Self> {
        let Ok(database_url) = std::env::var("DATABASE_URL") else {
            eprintln!("DATABASE_URL not set; skipping HTTP integration test");
            return None;
        };

        let config = Config::from_lookup(|key| match key {
            "DATABASE_URL" => Some(database_url.clone()),
            "DATABASE_MAX_CONNECTIONS" => Some("5".to_string()),
            "JWT_SECRET" => Some(TEST_JWT_SECRET.to_string()),
            _ => None,
        })
        .expect("Failed to build test config");

        let db = PgPool::connect(&config.database.url)
            .await
            .expect("Failed to connect to test database");

        sqlx::migrate!("../migrations")
            .run(&db)
            .await
            .expect("Failed to run migrations");

        let app = build_router(AppState::new(db.clone(), config.clone()));

        Some(Self { app, db, config })
    }

    /// Sends a request and returns the status with the parsed JSON body
    ///
    /// An empty body comes back as `Value::Null`.
    pub async fn send(
        &self,
        method: Method,
        uri: &str,
        token: Option<&str>,
        body: Option<Value>,
    ) -> (StatusCode, Value) {
        let mut request = Request::builder().method(method).uri(uri);

        if let Some(token) = token {
            request = request.header(header::AUTHORIZATION, format!("Bearer {token}"));
        }

        let request = match body {
            Some(body) => request
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(body.to_string())),
            None => request.body(Body::empty()),
        }
        .unwrap();

        self.send_request(request).await
    }

    pub async fn send_request(&self, request: Request<Body>) -> (StatusCode, Value) {
        let response = self.app.clone().oneshot(request).await.unwrap();
        let status = response.status();

        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();

        let body = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap_or_else(|_| {
                panic!("Non-JSON response ({status}): {}", String::from_utf8_lossy(&bytes))
            })
        };

        (status, body)
    }

    /// Registers a fresh account through the API
    pub async fn register(&self, fullname: &str) -> TestUser {
        let email = format!("{}-{}@example.com", fullname.to_lowercase(), Uuid::new_v4());

        let (status, body) = self
            .send(
                Method::POST,
                "/api/registration",
                None,
                Some(json!({
                    "fullname": fullname,
                    "email": email,
                    "password": "correct horse battery",
                    "repeated_password": "correct horse battery",
                })),
            )
            .await;
        assert_eq!(status, StatusCode::CREATED, "registration failed: {body}");

        TestUser {
            id: body["user_id"].as_str().unwrap().parse().unwrap(),
            email,
            fullname: fullname.to_string(),
            token: body["token"].as_str().unwrap().to_string(),
        }
    }

    /// Creates a board owned by `owner` and returns its id
    pub async fn create_board(&self, owner: &TestUser, title: &str, members: &[Uuid]) -> String {
        let (status, body) = self
            .send(
                Method::POST,
                "/api/boards",
                Some(&owner.token),
                Some(json!({ "title": title, "members": members })),
            )
            .await;
        assert_eq!(status, StatusCode::CREATED, "board creation failed: {body}");

        body["id"].as_str().unwrap().to_string()
    }
}

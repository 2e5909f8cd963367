/// Registration and login
///
/// Both endpoints are public and answer with the same shape:
///
/// ```json
/// { "token": "eyJ...", "fullname": "Alice Example", "email": "alice@example.com", "user_id": "uuid" }
/// ```
///
/// # Endpoints
///
/// - `POST /api/registration` - create an account (201)
/// - `POST /api/login` - exchange credentials for a token (200)

use crate::{
    app::AppState,
    error::{ApiError, ApiResult},
    extract::ApiJson,
};
use axum::{extract::State, http::StatusCode, Json};
use chrono::Duration;
use kanmind_shared::{
    auth::{jwt, password},
    models::user::{CreateUser, User},
};
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

#[derive(Debug, Deserialize, Validate)]
pub struct RegistrationRequest {
    #[validate(length(min = 1, max = 150, message = "Full name must be 1 to 150 characters"))]
    pub fullname: String,

    #[validate(email(message = "Invalid email format"))]
    pub email: String,

    #[validate(length(min = 8, message = "Password must be at least 8 characters"))]
    pub password: String,

    pub repeated_password: String,
}

#[derive(Debug, Deserialize, Validate)]
pub struct LoginRequest {
    #[validate(email(message = "Invalid email format"))]
    pub email: String,

    pub password: String,
}

/// Token plus the identity it was issued for
#[derive(Debug, Serialize, Deserialize)]
pub struct AuthResponse {
    pub token: String,
    pub fullname: String,
    pub email: String,
    pub user_id: Uuid,
}

fn issue_token(state: &AppState, user: &User) -> ApiResult<AuthResponse> {
    let claims = jwt::Claims::with_expiration(
        user.id,
        Duration::hours(state.config.jwt.expiration_hours),
    );

    Ok(AuthResponse {
        token: jwt::create_token(&claims, state.jwt_secret())?,
        fullname: user.fullname.clone(),
        email: user.email.clone(),
        user_id: user.id,
    })
}

/// Creates an account and returns a token for it
///
/// # Errors
///
/// - `400`: invalid fields, passwords that do not match, or an email that
///   is already registered
/// - `409`: the email was registered concurrently
pub async fn registration(
    State(state): State<AppState>,
    ApiJson(req): ApiJson<RegistrationRequest>,
) -> ApiResult<(StatusCode, Json<AuthResponse>)> {
    req.validate()?;

    if req.password != req.repeated_password {
        return Err(ApiError::BadRequest("Passwords do not match.".to_string()));
    }

    let email = req.email.trim().to_string();
    if User::email_exists(&state.db, &email).await? {
        return Err(ApiError::BadRequest(
            "A user with this email already exists.".to_string(),
        ));
    }

    let password_hash = password::hash_password(&req.password)?;

    let user = User::create(
        &state.db,
        CreateUser {
            email,
            fullname: req.fullname.trim().to_string(),
            password_hash,
        },
    )
    .await?;

    tracing::info!(user_id = %user.id, "User registered");

    Ok((StatusCode::CREATED, Json(issue_token(&state, &user)?)))
}

/// Exchanges email and password for a token
///
/// Unknown email and wrong password answer identically.
pub async fn login(
    State(state): State<AppState>,
    ApiJson(req): ApiJson<LoginRequest>,
) -> ApiResult<Json<AuthResponse>> {
    req.validate()?;

    let invalid = || ApiError::BadRequest("Invalid email or password.".to_string());

    let user = User::find_by_email(&state.db, req.email.trim())
        .await?
        .ok_or_else(invalid)?;

    if !password::verify_password(&req.password, &user.password_hash)? {
        tracing::debug!(user_id = %user.id, "Login with wrong password");
        return Err(invalid());
    }

    tracing::info!(user_id = %user.id, "User logged in");
    Ok(Json(issue_token(&state, &user)?))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_registration_request_validation() {
        let valid = RegistrationRequest {
            fullname: "Alice Example".to_string(),
            email: "alice@example.com".to_string(),
            password: "long-enough".to_string(),
            repeated_password: "long-enough".to_string(),
        };
        assert!(valid.validate().is_ok());

        let invalid = RegistrationRequest {
            fullname: String::new(),
            email: "nope".to_string(),
            password: "short".to_string(),
            repeated_password: "short".to_string(),
        };
        let errors = invalid.validate().unwrap_err();
        let fields = errors.field_errors();
        assert!(fields.contains_key("fullname"));
        assert!(fields.contains_key("email"));
        assert!(fields.contains_key("password"));
    }

    #[test]
    fn test_password_length_boundary() {
        let request = |password: &str| RegistrationRequest {
            fullname: "Bob".to_string(),
            email: "bob@example.com".to_string(),
            password: password.to_string(),
            repeated_password: password.to_string(),
        };

        assert!(request("1234567").validate().is_err());
        assert!(request("12345678").validate().is_ok());
    }
}

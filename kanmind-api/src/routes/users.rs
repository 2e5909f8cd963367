/// User lookup
///
/// `GET /api/email-check?email=alice@example.com` answers with the user's
/// public projection so a board owner can add them as a member.

use crate::{
    app::AppState,
    error::{ApiError, ApiResult},
};
use axum::{
    extract::{Query, State},
    Json,
};
use kanmind_shared::models::user::{User, UserSummary};
use serde::Deserialize;

#[derive(Debug, Deserialize)]
pub struct EmailCheckQuery {
    pub email: Option<String>,
}

/// # Errors
///
/// - `400`: `email` missing or blank
/// - `404`: no user with that email
pub async fn email_check(
    State(state): State<AppState>,
    Query(query): Query<EmailCheckQuery>,
) -> ApiResult<Json<UserSummary>> {
    let email = query
        .email
        .as_deref()
        .map(str::trim)
        .filter(|email| !email.is_empty())
        .ok_or_else(|| ApiError::BadRequest("Email parameter is required.".to_string()))?;

    let user = User::find_by_email(&state.db, email)
        .await?
        .ok_or_else(|| ApiError::NotFound("User with this email not found.".to_string()))?;

    Ok(Json(user.into()))
}

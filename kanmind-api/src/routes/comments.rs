/// Comment endpoints
///
/// - `GET /api/tasks/:task_id/comments` - oldest first
/// - `POST /api/tasks/:task_id/comments` - `{ "content": "..." }`, 201
/// - `DELETE /api/tasks/:task_id/comments/:comment_id` - author only, 204

use crate::{app::AppState, error::ApiResult, extract::ApiJson};
use axum::{
    extract::{Path, State},
    http::StatusCode,
    Extension, Json,
};
use kanmind_shared::{
    auth::context::AuthContext, models::comment::CommentView, services::comments,
};
use serde::Deserialize;
use uuid::Uuid;

#[derive(Debug, Deserialize)]
pub struct NewComment {
    pub content: String,
}

pub async fn list_comments(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Path(task_id): Path<Uuid>,
) -> ApiResult<Json<Vec<CommentView>>> {
    Ok(Json(
        comments::list_comments(&state.db, task_id, auth.user_id).await?,
    ))
}

pub async fn create_comment(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Path(task_id): Path<Uuid>,
    ApiJson(body): ApiJson<NewComment>,
) -> ApiResult<(StatusCode, Json<CommentView>)> {
    let comment = comments::create_comment(&state.db, task_id, auth.user_id, &body.content).await?;
    Ok((StatusCode::CREATED, Json(comment)))
}

pub async fn delete_comment(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Path((task_id, comment_id)): Path<(Uuid, Uuid)>,
) -> ApiResult<StatusCode> {
    comments::delete_comment(&state.db, task_id, comment_id, auth.user_id).await?;
    Ok(StatusCode::NO_CONTENT)
}

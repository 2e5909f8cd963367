/// Task endpoints
///
/// Reads return `TaskView` with nested `assignee`/`reviewer` users; writes
/// accept `assignee_id`/`reviewer_id`.
///
/// ```text
/// PATCH /api/tasks/:id
/// { "status": "review", "reviewer_id": "uuid", "due_date": null }
/// ```
///
/// An explicit `null` clears `assignee_id`, `reviewer_id` or `due_date`;
/// omitted keys are left alone. Sending `board` is rejected with 400.

use crate::{app::AppState, error::ApiResult, extract::ApiJson};
use axum::{
    extract::{Path, State},
    http::StatusCode,
    Extension, Json,
};
use kanmind_shared::{
    auth::context::AuthContext,
    models::task::{NewTask, TaskChanges, TaskView},
    services::tasks,
};
use uuid::Uuid;

/// Tasks on every board the caller can see
pub async fn list_tasks(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
) -> ApiResult<Json<Vec<TaskView>>> {
    Ok(Json(tasks::list_tasks(&state.db, auth.user_id).await?))
}

pub async fn create_task(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    ApiJson(new): ApiJson<NewTask>,
) -> ApiResult<(StatusCode, Json<TaskView>)> {
    let task = tasks::create_task(&state.db, new, auth.user_id).await?;
    Ok((StatusCode::CREATED, Json(task)))
}

pub async fn assigned_to_me(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
) -> ApiResult<Json<Vec<TaskView>>> {
    Ok(Json(tasks::tasks_assigned_to(&state.db, auth.user_id).await?))
}

pub async fn reviewing(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
) -> ApiResult<Json<Vec<TaskView>>> {
    Ok(Json(tasks::tasks_reviewed_by(&state.db, auth.user_id).await?))
}

pub async fn get_task(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Path(task_id): Path<Uuid>,
) -> ApiResult<Json<TaskView>> {
    Ok(Json(tasks::task_detail(&state.db, task_id, auth.user_id).await?))
}

pub async fn update_task(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Path(task_id): Path<Uuid>,
    ApiJson(changes): ApiJson<TaskChanges>,
) -> ApiResult<Json<TaskView>> {
    Ok(Json(
        tasks::update_task(&state.db, task_id, changes, auth.user_id).await?,
    ))
}

pub async fn delete_task(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Path(task_id): Path<Uuid>,
) -> ApiResult<StatusCode> {
    tasks::delete_task(&state.db, task_id, auth.user_id).await?;
    Ok(StatusCode::NO_CONTENT)
}

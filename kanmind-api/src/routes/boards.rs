/// Board endpoints
///
/// | Method & path              | Body           | Response           |
/// |----------------------------|----------------|--------------------|
/// | `GET /api/boards`          |                | `[BoardSummary]`   |
/// | `POST /api/boards`         | `NewBoard`     | 201 `BoardSummary` |
/// | `GET /api/boards/:id`      |                | `BoardDetail`      |
/// | `PUT/PATCH /api/boards/:id`| `BoardChanges` | `BoardDetail`      |
/// | `DELETE /api/boards/:id`   |                | 204                |

use crate::{app::AppState, error::ApiResult, extract::ApiJson};
use axum::{
    extract::{Path, State},
    http::StatusCode,
    Extension, Json,
};
use kanmind_shared::{
    auth::context::AuthContext,
    models::board::BoardSummary,
    services::boards::{self, BoardChanges, BoardDetail, NewBoard},
};
use uuid::Uuid;

pub async fn list_boards(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
) -> ApiResult<Json<Vec<BoardSummary>>> {
    Ok(Json(boards::boards_visible_to(&state.db, auth.user_id).await?))
}

pub async fn create_board(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    ApiJson(new): ApiJson<NewBoard>,
) -> ApiResult<(StatusCode, Json<BoardSummary>)> {
    let board = boards::create_board(&state.db, new, auth.user_id).await?;
    Ok((StatusCode::CREATED, Json(board)))
}

pub async fn get_board(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Path(board_id): Path<Uuid>,
) -> ApiResult<Json<BoardDetail>> {
    Ok(Json(boards::board_detail(&state.db, board_id, auth.user_id).await?))
}

pub async fn update_board(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Path(board_id): Path<Uuid>,
    ApiJson(changes): ApiJson<BoardChanges>,
) -> ApiResult<Json<BoardDetail>> {
    Ok(Json(
        boards::update_board(&state.db, board_id, changes, auth.user_id).await?,
    ))
}

pub async fn delete_board(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Path(board_id): Path<Uuid>,
) -> ApiResult<StatusCode> {
    boards::delete_board(&state.db, board_id, auth.user_id).await?;
    Ok(StatusCode::NO_CONTENT)
}

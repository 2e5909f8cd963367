/// Board listing and lifecycle
///
/// # Invariants
///
/// - The creator owns the board and is always in its stored member set
/// - Replacing the member set never removes the owner
/// - Only the owner may delete a board; any authorized user may rename it
///   or replace its members
///
/// # Example
///
/// ```no_run
/// use kanmind_shared::services::boards::{create_board, boards_visible_to, NewBoard};
/// # use sqlx::PgPool;
/// # use uuid::Uuid;
///
/// # async fn example(pool: PgPool, alice: Uuid, bob: Uuid) -> Result<(), Box<dyn std::error::Error>> {
/// let board = create_board(&pool, NewBoard {
///     title: "Sprint 1".to_string(),
///     members: vec![bob],
/// }, alice).await?;
///
/// assert_eq!(board.member_count, 2);
/// assert_eq!(boards_visible_to(&pool, bob).await?.len(), 1);
/// # Ok(())
/// # }
/// ```

use serde::{Deserialize, Serialize};
use sqlx::{PgConnection, PgPool};
use tracing::{debug, info};
use uuid::Uuid;

use super::{ensure_users_exist, normalize_title};
use crate::auth::authorization::require_board_owner;
use crate::error::{ServiceError, ServiceResult};
use crate::models::board::{Board, BoardSummary};
use crate::models::board_member::BoardMember;
use crate::models::task::TaskView;
use crate::models::user::UserSummary;

/// Input for creating a board
#[derive(Debug, Clone, Deserialize)]
pub struct NewBoard {
    pub title: String,

    /// Members besides the creator; duplicates and the creator are ignored
    #[serde(default)]
    pub members: Vec<Uuid>,
}

/// Partial update of a board
///
/// `members`, when present, replaces the whole member set.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct BoardChanges {
    #[serde(default)]
    pub title: Option<String>,

    #[serde(default)]
    pub members: Option<Vec<Uuid>>,
}

/// Board with its members and tasks
#[derive(Debug, Clone, Serialize)]
pub struct BoardDetail {
    pub id: Uuid,
    pub title: String,
    pub owner_id: Uuid,
    pub members: Vec<UserSummary>,
    pub tasks: Vec<TaskView>,
}

/// Stored member set for `requested` plus the owner, first occurrence wins
fn member_set(owner_id: Uuid, requested: &[Uuid]) -> Vec<Uuid> {
    let mut members = Vec::with_capacity(requested.len() + 1);
    members.push(owner_id);

    for id in requested {
        if !members.contains(id) {
            members.push(*id);
        }
    }

    members
}

async fn load_detail(conn: &mut PgConnection, board: Board) -> ServiceResult<BoardDetail> {
    let members = BoardMember::list_users(&mut *conn, board.id).await?;
    let tasks = TaskView::list_for_board(&mut *conn, board.id).await?;

    Ok(BoardDetail {
        id: board.id,
        title: board.title,
        owner_id: board.owner_id,
        members,
        tasks,
    })
}

fn board_not_found() -> ServiceError {
    ServiceError::not_found("Board not found.")
}

/// Every board `user_id` owns or is a member of, annotated with counters
pub async fn boards_visible_to(pool: &PgPool, user_id: Uuid) -> ServiceResult<Vec<BoardSummary>> {
    let boards = Board::list_visible_to(pool, user_id).await?;
    debug!(user_id = %user_id, count = boards.len(), "Listed visible boards");
    Ok(boards)
}

/// Creates a board owned by `creator` with members `new.members ∪ {creator}`
///
/// # Errors
///
/// `Validation` if the title is blank or too long, or if any member id is
/// not a user. Nothing is written in that case.
pub async fn create_board(pool: &PgPool, new: NewBoard, creator: Uuid) -> ServiceResult<BoardSummary> {
    let title = normalize_title(&new.title)?;
    let members = member_set(creator, &new.members);

    let mut tx = pool.begin().await?;

    ensure_users_exist(&mut tx, &members).await?;

    let board = Board::create(&mut *tx, &title, creator).await?;
    BoardMember::add_many(&mut *tx, board.id, &members).await?;

    let summary = Board::summary(&mut *tx, board.id)
        .await?
        .ok_or_else(board_not_found)?;

    tx.commit().await?;

    info!(
        board_id = %board.id,
        owner_id = %creator,
        member_count = summary.member_count,
        "Board created"
    );

    Ok(summary)
}

/// Board with members and tasks, for an owner or member
pub async fn board_detail(pool: &PgPool, board_id: Uuid, user_id: Uuid) -> ServiceResult<BoardDetail> {
    let mut conn = pool.acquire().await?;

    let board = Board::find_by_id(&mut *conn, board_id)
        .await?
        .ok_or_else(board_not_found)?;

    BoardMember::roster(&mut *conn, &board, &[user_id])
        .await?
        .require_access(user_id)?;

    load_detail(&mut conn, board).await
}

/// Renames the board and/or replaces its member set
///
/// The board row is locked for the whole transaction. Applying the same
/// changes twice leaves the same visible state.
pub async fn update_board(
    pool: &PgPool,
    board_id: Uuid,
    changes: BoardChanges,
    user_id: Uuid,
) -> ServiceResult<BoardDetail> {
    let mut tx = pool.begin().await?;

    let mut board = Board::find_for_update(&mut *tx, board_id)
        .await?
        .ok_or_else(board_not_found)?;

    BoardMember::roster(&mut *tx, &board, &[user_id])
        .await?
        .require_access(user_id)?;

    let title = changes.title.as_deref().map(normalize_title).transpose()?;
    let members = changes
        .members
        .as_deref()
        .map(|requested| member_set(board.owner_id, requested));

    if let Some(members) = &members {
        ensure_users_exist(&mut tx, members).await?;
    }

    match &title {
        Some(title) => board = Board::update_title(&mut *tx, board.id, title).await?,
        None if members.is_some() => Board::touch(&mut *tx, board.id).await?,
        None => {}
    }

    if let Some(members) = &members {
        BoardMember::replace(&mut tx, board.id, members).await?;
    }

    let detail = load_detail(&mut tx, board).await?;
    tx.commit().await?;

    info!(
        board_id = %board_id,
        user_id = %user_id,
        title_changed = title.is_some(),
        members_replaced = members.is_some(),
        "Board updated"
    );

    Ok(detail)
}

/// Deletes the board with its tasks and comments; owner only
pub async fn delete_board(pool: &PgPool, board_id: Uuid, user_id: Uuid) -> ServiceResult<()> {
    let mut tx = pool.begin().await?;

    let board = Board::find_for_update(&mut *tx, board_id)
        .await?
        .ok_or_else(board_not_found)?;

    require_board_owner(&board, user_id)?;

    Board::delete(&mut *tx, board.id).await?;
    tx.commit().await?;

    info!(board_id = %board_id, owner_id = %user_id, "Board deleted");
    Ok(())
}

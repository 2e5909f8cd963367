/// Task comments
///
/// Any owner or member of the task's board may read and write comments.
/// Deletion belongs to the author alone; owning the board grants nothing.

use sqlx::PgPool;
use tracing::info;
use uuid::Uuid;

use crate::auth::authorization::{require_board_access, require_comment_author};
use crate::error::{ServiceError, ServiceResult};
use crate::models::comment::{Comment, CommentView};
use crate::models::task::Task;

async fn authorized_task(pool: &PgPool, task_id: Uuid, user_id: Uuid) -> ServiceResult<Task> {
    let task = Task::find_by_id(pool, task_id)
        .await?
        .ok_or_else(|| ServiceError::not_found("Task not found."))?;

    require_board_access(pool, task.board_id, user_id).await?;
    Ok(task)
}

/// Comments on the task, oldest first
pub async fn list_comments(pool: &PgPool, task_id: Uuid, user_id: Uuid) -> ServiceResult<Vec<CommentView>> {
    let task = authorized_task(pool, task_id, user_id).await?;
    Ok(Comment::list_for_task(pool, task.id).await?)
}

/// Adds a comment authored by `user_id`; the timestamp comes from the database
pub async fn create_comment(
    pool: &PgPool,
    task_id: Uuid,
    user_id: Uuid,
    content: &str,
) -> ServiceResult<CommentView> {
    let task = authorized_task(pool, task_id, user_id).await?;

    let content = content.trim();
    if content.is_empty() {
        return Err(ServiceError::validation("Content must not be empty."));
    }

    let comment = Comment::create(pool, task.id, user_id, content).await?;

    info!(comment_id = %comment.id, task_id = %task.id, author_id = %user_id, "Comment created");
    Ok(comment)
}

/// Deletes a comment of `task_id`; author only
///
/// # Errors
///
/// - `NotFound` if the comment does not exist or belongs to another task
/// - `Permission` if `user_id` is not the author
pub async fn delete_comment(pool: &PgPool, task_id: Uuid, comment_id: Uuid, user_id: Uuid) -> ServiceResult<()> {
    let mut tx = pool.begin().await?;

    let comment = Comment::find_by_id(&mut *tx, comment_id)
        .await?
        .filter(|comment| comment.task_id == task_id)
        .ok_or_else(|| ServiceError::not_found("Comment not found for this task."))?;

    require_comment_author(&comment, user_id)?;

    Comment::delete(&mut *tx, comment.id).await?;
    tx.commit().await?;

    info!(comment_id = %comment_id, task_id = %task_id, author_id = %user_id, "Comment deleted");
    Ok(())
}

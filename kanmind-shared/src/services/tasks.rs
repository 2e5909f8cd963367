/// Task validator, mutator and query views
///
/// # Mutation pipeline
///
/// ```text
/// TaskChanges ──validate_task_mutation──▶ ValidatedChanges ──apply_task_mutation──▶ Task
///                 (pure, roster-based)                         (resolves users, saves)
/// ```
///
/// [`ValidatedChanges`] can only be produced by [`validate_task_mutation`],
/// so an unvalidated change cannot reach the store. [`update_task`] runs the
/// whole pipeline in one transaction with the board locked `FOR SHARE` and
/// then the task row locked `FOR UPDATE`, so the member set used for
/// validation is the one in force when the write commits.
///
/// # Lock order
///
/// Board before task, everywhere. Board deletion holds the board
/// `FOR UPDATE` while its cascade takes the task rows, so a task write
/// that locked its task first could deadlock against it.
///
/// # Validation order
///
/// 1. Caller must be owner or member of the task's board (`Permission`)
/// 2. The board reference must not be changed (`Validation`)
/// 3. A set assignee or reviewer must be owner or member (`Validation`)
/// 4. A present title must be non-blank (`Validation`)

use sqlx::{PgConnection, PgPool};
use std::collections::HashSet;
use tracing::{debug, info};
use uuid::Uuid;

use super::normalize_title;
use crate::auth::authorization::BoardRoster;
use crate::error::{ServiceError, ServiceResult};
use crate::models::board::Board;
use crate::models::board_member::BoardMember;
use crate::models::task::{NewTask, Task, TaskChanges, TaskView};
use crate::models::user::User;

/// Task changes that passed [`validate_task_mutation`]
#[derive(Debug, Clone, PartialEq)]
pub struct ValidatedChanges(TaskChanges);

impl ValidatedChanges {
    pub fn changes(&self) -> &TaskChanges {
        &self.0
    }

    pub fn into_inner(self) -> TaskChanges {
        self.0
    }
}

fn task_not_found() -> ServiceError {
    ServiceError::not_found("Task not found.")
}

fn board_not_found() -> ServiceError {
    ServiceError::not_found("Board not found.")
}

/// Fails unless every id is the owner or a member of the roster's board
fn ensure_assignable(roster: &BoardRoster, user_ids: impl IntoIterator<Item = Uuid>) -> ServiceResult<()> {
    for user_id in user_ids {
        if !roster.is_authorized(user_id) {
            return Err(ServiceError::validation(format!(
                "User with ID {user_id} is not a member of the board."
            )));
        }
    }
    Ok(())
}

/// Checks `changes` against the task's board without touching the store
///
/// `roster` must be the roster of `task.board_id`. The changes are returned
/// as they came in; this step validates, it does not transform.
pub fn validate_task_mutation(
    roster: &BoardRoster,
    task: &Task,
    changes: TaskChanges,
    user_id: Uuid,
) -> ServiceResult<ValidatedChanges> {
    debug_assert_eq!(roster.board_id, task.board_id);

    roster.require_access(user_id)?;

    if changes.board.is_some() {
        return Err(ServiceError::validation("The board ID must not be changed."));
    }

    ensure_assignable(roster, changes.referenced_user_ids())?;

    if let Some(title) = &changes.title {
        normalize_title(title)?;
    }

    Ok(ValidatedChanges(changes))
}

/// Resolves assignee and reviewer to users, applies every present field and
/// saves the task
///
/// # Errors
///
/// `NotFound` if an assignee or reviewer id does not reference a user.
pub async fn apply_task_mutation(
    conn: &mut PgConnection,
    mut task: Task,
    validated: ValidatedChanges,
) -> ServiceResult<Task> {
    let changes = validated.into_inner();
    let referenced: Vec<Uuid> = changes.referenced_user_ids().collect();

    if !referenced.is_empty() {
        let found: HashSet<Uuid> = User::existing_ids(&mut *conn, &referenced)
            .await?
            .into_iter()
            .collect();

        if let Some(missing) = referenced.iter().find(|id| !found.contains(*id)) {
            return Err(ServiceError::not_found(format!("User with ID {missing} not found.")));
        }
    }

    task.apply(&changes);
    Ok(task.save(&mut *conn).await?)
}

/// Board id of a task, read without locking
///
/// A task never changes boards, so the value stays valid once the board
/// lock is taken.
async fn task_board_id(pool: &PgPool, task_id: Uuid) -> ServiceResult<Uuid> {
    Task::find_by_id(pool, task_id)
        .await?
        .map(|task| task.board_id)
        .ok_or_else(task_not_found)
}

/// Validates and applies `changes` to a task in one transaction
pub async fn update_task(
    pool: &PgPool,
    task_id: Uuid,
    changes: TaskChanges,
    user_id: Uuid,
) -> ServiceResult<TaskView> {
    let board_id = task_board_id(pool, task_id).await?;

    let mut tx = pool.begin().await?;

    // A board deleted meanwhile took the task with it.
    let board = Board::find_for_share(&mut *tx, board_id)
        .await?
        .ok_or_else(task_not_found)?;

    let task = Task::find_for_update(&mut *tx, task_id)
        .await?
        .ok_or_else(task_not_found)?;

    let candidates: Vec<Uuid> = std::iter::once(user_id)
        .chain(changes.referenced_user_ids())
        .collect();
    let roster = BoardMember::roster(&mut *tx, &board, &candidates).await?;

    let validated = validate_task_mutation(&roster, &task, changes, user_id)?;
    let task = apply_task_mutation(&mut tx, task, validated).await?;

    let view = TaskView::find(&mut *tx, task.id)
        .await?
        .ok_or_else(task_not_found)?;

    tx.commit().await?;

    info!(task_id = %task_id, board_id = %task.board_id, user_id = %user_id, "Task updated");
    Ok(view)
}

/// Creates a task on `new.board_id`
///
/// # Errors
///
/// - `NotFound` if the board does not exist
/// - `Permission` if `creator` is neither owner nor member
/// - `Validation` for a blank title or a non-member assignee/reviewer;
///   the board is left unchanged
pub async fn create_task(pool: &PgPool, new: NewTask, creator: Uuid) -> ServiceResult<TaskView> {
    let mut tx = pool.begin().await?;

    let board = Board::find_for_share(&mut *tx, new.board_id)
        .await?
        .ok_or_else(board_not_found)?;
    let candidates: Vec<Uuid> = [Some(creator), new.assignee_id, new.reviewer_id]
        .into_iter()
        .flatten()
        .collect();
    let roster = BoardMember::roster(&mut *tx, &board, &candidates).await?;

    roster.require_access(creator)?;
    normalize_title(&new.title)?;
    ensure_assignable(&roster, new.assignee_id.into_iter().chain(new.reviewer_id))?;

    let task = Task::create(&mut *tx, &new, creator).await?;
    let view = TaskView::find(&mut *tx, task.id)
        .await?
        .ok_or_else(task_not_found)?;

    tx.commit().await?;

    info!(
        task_id = %task.id,
        board_id = %task.board_id,
        created_by = %creator,
        status = task.status.as_str(),
        priority = task.priority.as_str(),
        "Task created"
    );

    Ok(view)
}

/// Single task, readable by any authenticated user
///
/// Writes stay gated on board membership; reads are not.
pub async fn task_detail(pool: &PgPool, task_id: Uuid, user_id: Uuid) -> ServiceResult<TaskView> {
    let task = TaskView::find(pool, task_id)
        .await?
        .ok_or_else(task_not_found)?;

    debug!(task_id = %task_id, user_id = %user_id, "Task read");
    Ok(task)
}

/// Deletes a task and its comments, for an owner or member of its board
pub async fn delete_task(pool: &PgPool, task_id: Uuid, user_id: Uuid) -> ServiceResult<()> {
    let board_id = task_board_id(pool, task_id).await?;

    let mut tx = pool.begin().await?;

    let board = Board::find_for_share(&mut *tx, board_id)
        .await?
        .ok_or_else(task_not_found)?;

    BoardMember::roster(&mut *tx, &board, &[user_id])
        .await?
        .require_access(user_id)?;

    if !Task::delete(&mut *tx, task_id).await? {
        return Err(task_not_found());
    }
    tx.commit().await?;

    info!(task_id = %task_id, board_id = %board_id, user_id = %user_id, "Task deleted");
    Ok(())
}

/// Tasks on every board the user owns or is a member of
pub async fn list_tasks(pool: &PgPool, user_id: Uuid) -> ServiceResult<Vec<TaskView>> {
    Ok(TaskView::list_visible_to(pool, user_id).await?)
}

/// Tasks whose assignee is `user_id`
///
/// No extra membership filter: assignees are checked on every write.
pub async fn tasks_assigned_to(pool: &PgPool, user_id: Uuid) -> ServiceResult<Vec<TaskView>> {
    let tasks = TaskView::assigned_to(pool, user_id).await?;
    debug!(user_id = %user_id, count = tasks.len(), "Listed assigned tasks");
    Ok(tasks)
}

/// Tasks whose reviewer is `user_id`
pub async fn tasks_reviewed_by(pool: &PgPool, user_id: Uuid) -> ServiceResult<Vec<TaskView>> {
    let tasks = TaskView::reviewed_by(pool, user_id).await?;
    debug!(user_id = %user_id, count = tasks.len(), "Listed tasks under review");
    Ok(tasks)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::task::{TaskPriority, TaskStatus};
    use chrono::Utc;

    struct Sprint {
        alice: Uuid,
        bob: Uuid,
        carol: Uuid,
        roster: BoardRoster,
        task: Task,
    }

    /// "Sprint 1" owned by Alice with Bob as member; Carol is an outsider
    fn sprint() -> Sprint {
        let alice = Uuid::new_v4();
        let bob = Uuid::new_v4();
        let carol = Uuid::new_v4();
        let board_id = Uuid::new_v4();

        Sprint {
            alice,
            bob,
            carol,
            roster: BoardRoster::new(board_id, alice, [alice, bob]),
            task: Task {
                id: Uuid::new_v4(),
                board_id,
                title: "Fix bug".to_string(),
                description: String::new(),
                status: TaskStatus::ToDo,
                priority: TaskPriority::Medium,
                assignee_id: None,
                reviewer_id: None,
                due_date: None,
                created_by: Some(bob),
                created_at: Utc::now(),
                updated_at: Utc::now(),
            },
        }
    }

    #[test]
    fn test_member_may_assign_owner() {
        let s = sprint();
        let changes = TaskChanges {
            assignee_id: Some(Some(s.alice)),
            ..Default::default()
        };

        let validated = validate_task_mutation(&s.roster, &s.task, changes.clone(), s.bob).unwrap();
        assert_eq!(validated.changes(), &changes);
    }

    #[test]
    fn test_non_member_is_denied_before_anything_else() {
        let s = sprint();
        let changes = TaskChanges {
            board: Some(serde_json::json!(Uuid::new_v4())),
            ..Default::default()
        };

        let err = validate_task_mutation(&s.roster, &s.task, changes, s.carol).unwrap_err();
        assert_eq!(err.kind(), "permission");
    }

    #[test]
    fn test_board_change_rejected() {
        let s = sprint();
        let changes = TaskChanges {
            board: Some(serde_json::json!(s.task.board_id)),
            ..Default::default()
        };

        let err = validate_task_mutation(&s.roster, &s.task, changes, s.alice).unwrap_err();
        assert_eq!(err.to_string(), "The board ID must not be changed.");
    }

    #[test]
    fn test_non_member_reviewer_rejected_with_id() {
        let s = sprint();
        let changes = TaskChanges {
            reviewer_id: Some(Some(s.carol)),
            ..Default::default()
        };

        let err = validate_task_mutation(&s.roster, &s.task, changes, s.bob).unwrap_err();
        assert_eq!(err.kind(), "validation");
        assert_eq!(
            err.to_string(),
            format!("User with ID {} is not a member of the board.", s.carol)
        );
    }

    #[test]
    fn test_clearing_assignee_needs_no_membership() {
        let s = sprint();
        let changes = TaskChanges {
            assignee_id: Some(None),
            reviewer_id: Some(None),
            ..Default::default()
        };

        assert!(validate_task_mutation(&s.roster, &s.task, changes, s.bob).is_ok());
    }

    #[test]
    fn test_blank_title_rejected() {
        let s = sprint();
        let changes = TaskChanges {
            title: Some("   ".to_string()),
            ..Default::default()
        };

        let err = validate_task_mutation(&s.roster, &s.task, changes, s.alice).unwrap_err();
        assert_eq!(err.kind(), "validation");
    }

    #[test]
    fn test_any_status_allowed() {
        let s = sprint();
        for status in [TaskStatus::Done, TaskStatus::ToDo, TaskStatus::Review, TaskStatus::InProgress] {
            let changes = TaskChanges {
                status: Some(status),
                ..Default::default()
            };
            assert!(validate_task_mutation(&s.roster, &s.task, changes, s.bob).is_ok());
        }
    }

    #[test]
    fn test_ensure_assignable_accepts_owner_and_members() {
        let s = sprint();
        assert!(ensure_assignable(&s.roster, [s.alice, s.bob]).is_ok());
        assert!(ensure_assignable(&s.roster, [s.bob, s.carol]).is_err());
    }
}

/// Board model and database operations
///
/// A board has exactly one owner and a set of members (see
/// [`board_member`](super::board_member)). The owner is always stored in the
/// member set as well, and authorization checks `owner_id` directly, so both
/// views agree.
///
/// # Schema
///
/// ```sql
/// CREATE TABLE boards (
///     id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
///     title VARCHAR(255) NOT NULL CHECK (btrim(title) <> ''),
///     owner_id UUID NOT NULL REFERENCES users(id) ON DELETE CASCADE,
///     created_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
///     updated_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
/// );
/// ```
///
/// # Derived counters
///
/// [`BoardSummary`] carries four counters that are never stored; every read
/// recomputes them with correlated subqueries, so they cannot drift.

use chrono::{DateTime, Utc};
use serde::Serialize;
use sqlx::PgExecutor;
use uuid::Uuid;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, sqlx::FromRow)]
pub struct Board {
    pub id: Uuid,
    pub title: String,
    pub owner_id: Uuid,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Board annotated with member and task counters
///
/// Returned by board listing and creation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, sqlx::FromRow)]
pub struct BoardSummary {
    pub id: Uuid,
    pub title: String,

    /// Distinct members, owner included
    pub member_count: i64,

    /// All tasks on the board
    pub ticket_count: i64,

    /// Tasks with status `to-do`
    pub tasks_to_do_count: i64,

    /// Tasks with priority `high`
    pub tasks_high_prio_count: i64,

    pub owner_id: Uuid,
}

const SUMMARY_SELECT: &str = r#"
    SELECT
        b.id,
        b.title,
        (SELECT COUNT(*) FROM board_members m WHERE m.board_id = b.id) AS member_count,
        (SELECT COUNT(*) FROM tasks t WHERE t.board_id = b.id) AS ticket_count,
        (SELECT COUNT(*) FROM tasks t WHERE t.board_id = b.id AND t.status = 'to-do') AS tasks_to_do_count,
        (SELECT COUNT(*) FROM tasks t WHERE t.board_id = b.id AND t.priority = 'high') AS tasks_high_prio_count,
        b.owner_id
    FROM boards b
"#;

impl Board {
    /// Inserts the board row only; members are added separately
    pub async fn create<'e, E>(executor: E, title: &str, owner_id: Uuid) -> Result<Self, sqlx::Error>
    where
        E: PgExecutor<'e>,
    {
        sqlx::query_as::<_, Board>(
            r#"
            INSERT INTO boards (title, owner_id)
            VALUES ($1, $2)
            RETURNING id, title, owner_id, created_at, updated_at
            "#,
        )
        .bind(title)
        .bind(owner_id)
        .fetch_one(executor)
        .await
    }

    pub async fn find_by_id<'e, E>(executor: E, id: Uuid) -> Result<Option<Self>, sqlx::Error>
    where
        E: PgExecutor<'e>,
    {
        sqlx::query_as::<_, Board>(
            "SELECT id, title, owner_id, created_at, updated_at FROM boards WHERE id = $1",
        )
        .bind(id)
        .fetch_optional(executor)
        .await
    }

    /// Loads the board and locks its row until the transaction ends
    ///
    /// Used by board update and delete so concurrent changes to the same
    /// board serialize.
    pub async fn find_for_update<'e, E>(executor: E, id: Uuid) -> Result<Option<Self>, sqlx::Error>
    where
        E: PgExecutor<'e>,
    {
        sqlx::query_as::<_, Board>(
            "SELECT id, title, owner_id, created_at, updated_at FROM boards WHERE id = $1 FOR UPDATE",
        )
        .bind(id)
        .fetch_optional(executor)
        .await
    }

    /// Loads the board with a shared lock
    ///
    /// Task writes take this lock so the member set cannot change between
    /// validating an assignee and storing it.
    pub async fn find_for_share<'e, E>(executor: E, id: Uuid) -> Result<Option<Self>, sqlx::Error>
    where
        E: PgExecutor<'e>,
    {
        sqlx::query_as::<_, Board>(
            "SELECT id, title, owner_id, created_at, updated_at FROM boards WHERE id = $1 FOR SHARE",
        )
        .bind(id)
        .fetch_optional(executor)
        .await
    }

    pub async fn update_title<'e, E>(executor: E, id: Uuid, title: &str) -> Result<Self, sqlx::Error>
    where
        E: PgExecutor<'e>,
    {
        sqlx::query_as::<_, Board>(
            r#"
            UPDATE boards
            SET title = $2, updated_at = NOW()
            WHERE id = $1
            RETURNING id, title, owner_id, created_at, updated_at
            "#,
        )
        .bind(id)
        .bind(title)
        .fetch_one(executor)
        .await
    }

    /// Bumps `updated_at` without changing any column
    pub async fn touch<'e, E>(executor: E, id: Uuid) -> Result<(), sqlx::Error>
    where
        E: PgExecutor<'e>,
    {
        sqlx::query("UPDATE boards SET updated_at = NOW() WHERE id = $1")
            .bind(id)
            .execute(executor)
            .await?;
        Ok(())
    }

    /// Deletes the board; tasks, comments and member rows go with it
    pub async fn delete<'e, E>(executor: E, id: Uuid) -> Result<bool, sqlx::Error>
    where
        E: PgExecutor<'e>,
    {
        let result = sqlx::query("DELETE FROM boards WHERE id = $1")
            .bind(id)
            .execute(executor)
            .await?;

        Ok(result.rows_affected() > 0)
    }

    /// Membership predicate in one query
    ///
    /// Looks up the `boards` primary key and the `board_members (board_id,
    /// user_id)` primary key; it never scans a member list. False when the
    /// board does not exist.
    pub async fn is_authorized<'e, E>(
        executor: E,
        board_id: Uuid,
        user_id: Uuid,
    ) -> Result<bool, sqlx::Error>
    where
        E: PgExecutor<'e>,
    {
        sqlx::query_scalar(
            r#"
            SELECT EXISTS(
                SELECT 1 FROM boards b
                WHERE b.id = $1
                  AND (
                    b.owner_id = $2
                    OR EXISTS(
                        SELECT 1 FROM board_members m
                        WHERE m.board_id = b.id AND m.user_id = $2
                    )
                  )
            )
            "#,
        )
        .bind(board_id)
        .bind(user_id)
        .fetch_one(executor)
        .await
    }

    /// Every board `user_id` owns or is a member of, each exactly once
    ///
    /// The membership test lives in `WHERE`, so there is no join fan-out to
    /// deduplicate. Ordered by `(created_at, id)`.
    pub async fn list_visible_to<'e, E>(
        executor: E,
        user_id: Uuid,
    ) -> Result<Vec<BoardSummary>, sqlx::Error>
    where
        E: PgExecutor<'e>,
    {
        let sql = format!(
            r#"{SUMMARY_SELECT}
            WHERE b.owner_id = $1
               OR EXISTS(
                    SELECT 1 FROM board_members m
                    WHERE m.board_id = b.id AND m.user_id = $1
               )
            ORDER BY b.created_at, b.id
            "#
        );

        sqlx::query_as::<_, BoardSummary>(&sql)
            .bind(user_id)
            .fetch_all(executor)
            .await
    }

    pub async fn summary<'e, E>(executor: E, id: Uuid) -> Result<Option<BoardSummary>, sqlx::Error>
    where
        E: PgExecutor<'e>,
    {
        let sql = format!("{SUMMARY_SELECT} WHERE b.id = $1");

        sqlx::query_as::<_, BoardSummary>(&sql)
            .bind(id)
            .fetch_optional(executor)
            .await
    }
}

/// Comment model and database operations
///
/// Comments are append-only: once written, neither the task, the author nor
/// the timestamp changes. They are listed oldest first, with the id as a
/// tie-break for rows written in the same instant.
///
/// # Schema
///
/// ```sql
/// CREATE TABLE comments (
///     id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
///     task_id UUID NOT NULL REFERENCES tasks(id) ON DELETE CASCADE,
///     author_id UUID NOT NULL REFERENCES users(id) ON DELETE CASCADE,
///     content TEXT NOT NULL CHECK (btrim(content) <> ''),
///     created_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
/// );
/// ```

use chrono::{DateTime, Utc};
use serde::Serialize;
use sqlx::PgExecutor;
use uuid::Uuid;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, sqlx::FromRow)]
pub struct Comment {
    pub id: Uuid,
    pub task_id: Uuid,
    pub author_id: Uuid,
    pub content: String,

    /// Assigned by the database
    pub created_at: DateTime<Utc>,
}

/// Read representation: `author` is the author's display name
#[derive(Debug, Clone, PartialEq, Eq, Serialize, sqlx::FromRow)]
pub struct CommentView {
    pub id: Uuid,
    pub created_at: DateTime<Utc>,
    pub author: String,
    pub content: String,
}

impl Comment {
    /// Inserts a comment and returns it joined with the author's name
    pub async fn create<'e, E>(
        executor: E,
        task_id: Uuid,
        author_id: Uuid,
        content: &str,
    ) -> Result<CommentView, sqlx::Error>
    where
        E: PgExecutor<'e>,
    {
        sqlx::query_as::<_, CommentView>(
            r#"
            WITH inserted AS (
                INSERT INTO comments (task_id, author_id, content)
                VALUES ($1, $2, $3)
                RETURNING id, author_id, content, created_at
            )
            SELECT i.id, i.created_at, u.fullname AS author, i.content
            FROM inserted i
            JOIN users u ON u.id = i.author_id
            "#,
        )
        .bind(task_id)
        .bind(author_id)
        .bind(content)
        .fetch_one(executor)
        .await
    }

    pub async fn find_by_id<'e, E>(executor: E, id: Uuid) -> Result<Option<Self>, sqlx::Error>
    where
        E: PgExecutor<'e>,
    {
        sqlx::query_as::<_, Comment>(
            "SELECT id, task_id, author_id, content, created_at FROM comments WHERE id = $1",
        )
        .bind(id)
        .fetch_optional(executor)
        .await
    }

    pub async fn list_for_task<'e, E>(executor: E, task_id: Uuid) -> Result<Vec<CommentView>, sqlx::Error>
    where
        E: PgExecutor<'e>,
    {
        sqlx::query_as::<_, CommentView>(
            r#"
            SELECT c.id, c.created_at, u.fullname AS author, c.content
            FROM comments c
            JOIN users u ON u.id = c.author_id
            WHERE c.task_id = $1
            ORDER BY c.created_at, c.id
            "#,
        )
        .bind(task_id)
        .fetch_all(executor)
        .await
    }

    pub async fn delete<'e, E>(executor: E, id: Uuid) -> Result<bool, sqlx::Error>
    where
        E: PgExecutor<'e>,
    {
        let result = sqlx::query("DELETE FROM comments WHERE id = $1")
            .bind(id)
            .execute(executor)
            .await?;

        Ok(result.rows_affected() > 0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_view_shape() {
        let view = CommentView {
            id: Uuid::nil(),
            created_at: Utc::now(),
            author: "Alice Example".to_string(),
            content: "Done on staging".to_string(),
        };

        let json = serde_json::to_value(&view).unwrap();
        let keys: Vec<_> = json.as_object().unwrap().keys().cloned().collect();
        assert_eq!(keys.len(), 4);
        assert_eq!(json["author"], "Alice Example");
    }
}

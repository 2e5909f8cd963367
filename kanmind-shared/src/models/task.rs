/// Task model and database operations
///
/// Tasks belong to exactly one board for their whole life. Status is a flat
/// enum with no transition rules: any authorized user may set any value.
///
/// # Schema
///
/// ```sql
/// CREATE TYPE task_status AS ENUM ('to-do', 'in-progress', 'review', 'done');
/// CREATE TYPE task_priority AS ENUM ('low', 'medium', 'high');
///
/// CREATE TABLE tasks (
///     id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
///     board_id UUID NOT NULL REFERENCES boards(id) ON DELETE CASCADE,
///     title VARCHAR(255) NOT NULL CHECK (btrim(title) <> ''),
///     description TEXT NOT NULL DEFAULT '',
///     status task_status NOT NULL DEFAULT 'to-do',
///     priority task_priority NOT NULL DEFAULT 'medium',
///     assignee_id UUID REFERENCES users(id) ON DELETE SET NULL,
///     reviewer_id UUID REFERENCES users(id) ON DELETE SET NULL,
///     due_date DATE,
///     created_by UUID REFERENCES users(id) ON DELETE SET NULL,
///     created_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
///     updated_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
/// );
/// ```
///
/// # Partial updates
///
/// [`TaskChanges`] distinguishes an absent key from an explicit `null`:
///
/// ```
/// use kanmind_shared::models::task::TaskChanges;
///
/// let absent: TaskChanges = serde_json::from_str(r#"{"title": "Ship it"}"#).unwrap();
/// assert_eq!(absent.assignee_id, None);
///
/// let cleared: TaskChanges = serde_json::from_str(r#"{"assignee_id": null}"#).unwrap();
/// assert_eq!(cleared.assignee_id, Some(None));
/// ```

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use sqlx::PgExecutor;
use uuid::Uuid;

use crate::models::user::UserSummary;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "task_status")]
pub enum TaskStatus {
    #[default]
    #[serde(rename = "to-do")]
    #[sqlx(rename = "to-do")]
    ToDo,

    #[serde(rename = "in-progress")]
    #[sqlx(rename = "in-progress")]
    InProgress,

    #[serde(rename = "review")]
    #[sqlx(rename = "review")]
    Review,

    #[serde(rename = "done")]
    #[sqlx(rename = "done")]
    Done,
}

impl TaskStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            TaskStatus::ToDo => "to-do",
            TaskStatus::InProgress => "in-progress",
            TaskStatus::Review => "review",
            TaskStatus::Done => "done",
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "task_priority", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum TaskPriority {
    Low,
    #[default]
    Medium,
    High,
}

impl TaskPriority {
    pub fn as_str(&self) -> &'static str {
        match self {
            TaskPriority::Low => "low",
            TaskPriority::Medium => "medium",
            TaskPriority::High => "high",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, sqlx::FromRow)]
pub struct Task {
    pub id: Uuid,

    /// Fixed at creation
    pub board_id: Uuid,

    pub title: String,
    pub description: String,
    pub status: TaskStatus,
    pub priority: TaskPriority,

    /// Member or owner of the board, if set
    pub assignee_id: Option<Uuid>,

    /// Member or owner of the board, if set
    pub reviewer_id: Option<Uuid>,

    pub due_date: Option<NaiveDate>,

    /// Creator; cleared if the user is deleted
    pub created_by: Option<Uuid>,

    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Fields of a task to create
///
/// Deserializes from the create-task request body, where the board is sent
/// as `board`.
#[derive(Debug, Clone, Deserialize)]
pub struct NewTask {
    #[serde(rename = "board")]
    pub board_id: Uuid,

    pub title: String,

    #[serde(default)]
    pub description: String,

    #[serde(default)]
    pub status: TaskStatus,

    #[serde(default)]
    pub priority: TaskPriority,

    #[serde(default)]
    pub assignee_id: Option<Uuid>,

    #[serde(default)]
    pub reviewer_id: Option<Uuid>,

    #[serde(default)]
    pub due_date: Option<NaiveDate>,
}

/// Partial update of a task
///
/// `None` means "leave unchanged". For the nullable columns
/// (`assignee_id`, `reviewer_id`, `due_date`) `Some(None)` means "clear".
/// `board` is captured only so the update can be rejected: a task never
/// moves between boards.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct TaskChanges {
    #[serde(default, deserialize_with = "present")]
    pub board: Option<serde_json::Value>,

    #[serde(default)]
    pub title: Option<String>,

    #[serde(default)]
    pub description: Option<String>,

    #[serde(default)]
    pub status: Option<TaskStatus>,

    #[serde(default)]
    pub priority: Option<TaskPriority>,

    #[serde(default, deserialize_with = "present")]
    pub assignee_id: Option<Option<Uuid>>,

    #[serde(default, deserialize_with = "present")]
    pub reviewer_id: Option<Option<Uuid>>,

    #[serde(default, deserialize_with = "present")]
    pub due_date: Option<Option<NaiveDate>>,
}

/// Wraps any present value, `null` included, in `Some`
///
/// Combined with `#[serde(default)]` an absent key stays `None`.
fn present<'de, T, D>(deserializer: D) -> Result<Option<T>, D::Error>
where
    T: Deserialize<'de>,
    D: Deserializer<'de>,
{
    T::deserialize(deserializer).map(Some)
}

impl TaskChanges {
    /// Assignee and reviewer ids that are set to a user (not cleared)
    pub fn referenced_user_ids(&self) -> impl Iterator<Item = Uuid> + '_ {
        [self.assignee_id, self.reviewer_id]
            .into_iter()
            .filter_map(|field| field.flatten())
    }
}

impl Task {
    /// Applies every present field of `changes` in memory
    pub fn apply(&mut self, changes: &TaskChanges) {
        if let Some(title) = &changes.title {
            self.title = title.trim().to_string();
        }
        if let Some(description) = &changes.description {
            self.description = description.clone();
        }
        if let Some(status) = changes.status {
            self.status = status;
        }
        if let Some(priority) = changes.priority {
            self.priority = priority;
        }
        if let Some(assignee_id) = changes.assignee_id {
            self.assignee_id = assignee_id;
        }
        if let Some(reviewer_id) = changes.reviewer_id {
            self.reviewer_id = reviewer_id;
        }
        if let Some(due_date) = changes.due_date {
            self.due_date = due_date;
        }
    }

    pub async fn create<'e, E>(executor: E, data: &NewTask, created_by: Uuid) -> Result<Self, sqlx::Error>
    where
        E: PgExecutor<'e>,
    {
        sqlx::query_as::<_, Task>(
            r#"
            INSERT INTO tasks
                (board_id, title, description, status, priority,
                 assignee_id, reviewer_id, due_date, created_by)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
            RETURNING id, board_id, title, description, status, priority,
                      assignee_id, reviewer_id, due_date, created_by, created_at, updated_at
            "#,
        )
        .bind(data.board_id)
        .bind(data.title.trim())
        .bind(&data.description)
        .bind(data.status)
        .bind(data.priority)
        .bind(data.assignee_id)
        .bind(data.reviewer_id)
        .bind(data.due_date)
        .bind(created_by)
        .fetch_one(executor)
        .await
    }

    pub async fn find_by_id<'e, E>(executor: E, id: Uuid) -> Result<Option<Self>, sqlx::Error>
    where
        E: PgExecutor<'e>,
    {
        sqlx::query_as::<_, Task>(
            r#"
            SELECT id, board_id, title, description, status, priority,
                   assignee_id, reviewer_id, due_date, created_by, created_at, updated_at
            FROM tasks
            WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(executor)
        .await
    }

    /// Loads the task and locks its row until the transaction ends
    pub async fn find_for_update<'e, E>(executor: E, id: Uuid) -> Result<Option<Self>, sqlx::Error>
    where
        E: PgExecutor<'e>,
    {
        sqlx::query_as::<_, Task>(
            r#"
            SELECT id, board_id, title, description, status, priority,
                   assignee_id, reviewer_id, due_date, created_by, created_at, updated_at
            FROM tasks
            WHERE id = $1
            FOR UPDATE
            "#,
        )
        .bind(id)
        .fetch_optional(executor)
        .await
    }

    /// Writes every mutable column of `self` and bumps `updated_at`
    ///
    /// `board_id`, `created_by` and `created_at` are never written.
    pub async fn save<'e, E>(&self, executor: E) -> Result<Self, sqlx::Error>
    where
        E: PgExecutor<'e>,
    {
        sqlx::query_as::<_, Task>(
            r#"
            UPDATE tasks
            SET title = $2,
                description = $3,
                status = $4,
                priority = $5,
                assignee_id = $6,
                reviewer_id = $7,
                due_date = $8,
                updated_at = NOW()
            WHERE id = $1
            RETURNING id, board_id, title, description, status, priority,
                      assignee_id, reviewer_id, due_date, created_by, created_at, updated_at
            "#,
        )
        .bind(self.id)
        .bind(&self.title)
        .bind(&self.description)
        .bind(self.status)
        .bind(self.priority)
        .bind(self.assignee_id)
        .bind(self.reviewer_id)
        .bind(self.due_date)
        .fetch_one(executor)
        .await
    }

    pub async fn delete<'e, E>(executor: E, id: Uuid) -> Result<bool, sqlx::Error>
    where
        E: PgExecutor<'e>,
    {
        let result = sqlx::query("DELETE FROM tasks WHERE id = $1")
            .bind(id)
            .execute(executor)
            .await?;

        Ok(result.rows_affected() > 0)
    }
}

/// Read representation of a task
///
/// Assignee and reviewer are nested user objects; `comments_count` is
/// computed per query.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TaskView {
    pub id: Uuid,
    pub board: Uuid,
    pub title: String,
    pub description: String,
    pub status: TaskStatus,
    pub priority: TaskPriority,
    pub assignee: Option<UserSummary>,
    pub reviewer: Option<UserSummary>,
    pub due_date: Option<NaiveDate>,
    pub comments_count: i64,
}

/// Flat row behind [`TaskView`]
#[derive(Debug, sqlx::FromRow)]
struct TaskViewRow {
    id: Uuid,
    board_id: Uuid,
    title: String,
    description: String,
    status: TaskStatus,
    priority: TaskPriority,
    due_date: Option<NaiveDate>,
    assignee_id: Option<Uuid>,
    assignee_email: Option<String>,
    assignee_fullname: Option<String>,
    reviewer_id: Option<Uuid>,
    reviewer_email: Option<String>,
    reviewer_fullname: Option<String>,
    comments_count: i64,
}

fn user_summary(id: Option<Uuid>, email: Option<String>, fullname: Option<String>) -> Option<UserSummary> {
    match (id, email, fullname) {
        (Some(id), Some(email), Some(fullname)) => Some(UserSummary { id, email, fullname }),
        _ => None,
    }
}

impl From<TaskViewRow> for TaskView {
    fn from(row: TaskViewRow) -> Self {
        Self {
            id: row.id,
            board: row.board_id,
            title: row.title,
            description: row.description,
            status: row.status,
            priority: row.priority,
            assignee: user_summary(row.assignee_id, row.assignee_email, row.assignee_fullname),
            reviewer: user_summary(row.reviewer_id, row.reviewer_email, row.reviewer_fullname),
            due_date: row.due_date,
            comments_count: row.comments_count,
        }
    }
}

const VIEW_SELECT: &str = r#"
    SELECT
        t.id, t.board_id, t.title, t.description, t.status, t.priority, t.due_date,
        a.id AS assignee_id, a.email AS assignee_email, a.fullname AS assignee_fullname,
        r.id AS reviewer_id, r.email AS reviewer_email, r.fullname AS reviewer_fullname,
        (SELECT COUNT(*) FROM comments c WHERE c.task_id = t.id) AS comments_count
    FROM tasks t
    LEFT JOIN users a ON a.id = t.assignee_id
    LEFT JOIN users r ON r.id = t.reviewer_id
"#;

async fn fetch_views<'e, E>(executor: E, filter: &str, id: Uuid) -> Result<Vec<TaskView>, sqlx::Error>
where
    E: PgExecutor<'e>,
{
    let sql = format!("{VIEW_SELECT} WHERE {filter} ORDER BY t.created_at, t.id");

    let rows = sqlx::query_as::<_, TaskViewRow>(&sql)
        .bind(id)
        .fetch_all(executor)
        .await?;

    Ok(rows.into_iter().map(TaskView::from).collect())
}

impl TaskView {
    pub async fn find<'e, E>(executor: E, task_id: Uuid) -> Result<Option<Self>, sqlx::Error>
    where
        E: PgExecutor<'e>,
    {
        Ok(fetch_views(executor, "t.id = $1", task_id).await?.into_iter().next())
    }

    pub async fn list_for_board<'e, E>(executor: E, board_id: Uuid) -> Result<Vec<Self>, sqlx::Error>
    where
        E: PgExecutor<'e>,
    {
        fetch_views(executor, "t.board_id = $1", board_id).await
    }

    /// Tasks on every board `user_id` owns or is a member of
    pub async fn list_visible_to<'e, E>(executor: E, user_id: Uuid) -> Result<Vec<Self>, sqlx::Error>
    where
        E: PgExecutor<'e>,
    {
        fetch_views(
            executor,
            r#"EXISTS(
                SELECT 1 FROM boards b
                WHERE b.id = t.board_id
                  AND (b.owner_id = $1
                       OR EXISTS(SELECT 1 FROM board_members m
                                 WHERE m.board_id = b.id AND m.user_id = $1))
            )"#,
            user_id,
        )
        .await
    }

    pub async fn assigned_to<'e, E>(executor: E, user_id: Uuid) -> Result<Vec<Self>, sqlx::Error>
    where
        E: PgExecutor<'e>,
    {
        fetch_views(executor, "t.assignee_id = $1", user_id).await
    }

    pub async fn reviewed_by<'e, E>(executor: E, user_id: Uuid) -> Result<Vec<Self>, sqlx::Error>
    where
        E: PgExecutor<'e>,
    {
        fetch_views(executor, "t.reviewer_id = $1", user_id).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn task() -> Task {
        Task {
            id: Uuid::new_v4(),
            board_id: Uuid::new_v4(),
            title: "Write release notes".to_string(),
            description: String::new(),
            status: TaskStatus::ToDo,
            priority: TaskPriority::Medium,
            assignee_id: Some(Uuid::new_v4()),
            reviewer_id: None,
            due_date: NaiveDate::from_ymd_opt(2025, 7, 1),
            created_by: None,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[test]
    fn test_status_wire_names() {
        assert_eq!(serde_json::to_string(&TaskStatus::ToDo).unwrap(), "\"to-do\"");
        assert_eq!(serde_json::to_string(&TaskStatus::InProgress).unwrap(), "\"in-progress\"");
        assert_eq!(
            serde_json::from_str::<TaskStatus>("\"review\"").unwrap(),
            TaskStatus::Review
        );
        assert!(serde_json::from_str::<TaskStatus>("\"blocked\"").is_err());
        assert_eq!(TaskStatus::Done.as_str(), "done");
    }

    #[test]
    fn test_defaults() {
        assert_eq!(TaskStatus::default(), TaskStatus::ToDo);
        assert_eq!(TaskPriority::default(), TaskPriority::Medium);
        assert_eq!(serde_json::to_string(&TaskPriority::High).unwrap(), "\"high\"");
    }

    #[test]
    fn test_new_task_from_request_body() {
        let board = Uuid::new_v4();
        let body = format!(r#"{{"board": "{board}", "title": "Fix login"}}"#);
        let new_task: NewTask = serde_json::from_str(&body).unwrap();

        assert_eq!(new_task.board_id, board);
        assert_eq!(new_task.status, TaskStatus::ToDo);
        assert_eq!(new_task.priority, TaskPriority::Medium);
        assert!(new_task.description.is_empty());
        assert!(new_task.assignee_id.is_none());
    }

    #[test]
    fn test_changes_distinguish_absent_from_null() {
        let changes: TaskChanges =
            serde_json::from_str(r#"{"reviewer_id": null, "due_date": "2025-08-01"}"#).unwrap();

        assert_eq!(changes.assignee_id, None);
        assert_eq!(changes.reviewer_id, Some(None));
        assert_eq!(changes.due_date, Some(NaiveDate::from_ymd_opt(2025, 8, 1)));
        assert!(changes.board.is_none());
    }

    #[test]
    fn test_changes_capture_board_key_even_when_null() {
        let changes: TaskChanges = serde_json::from_str(r#"{"board": null}"#).unwrap();
        assert!(changes.board.is_some());
    }

    #[test]
    fn test_referenced_user_ids_skips_cleared() {
        let assignee = Uuid::new_v4();
        let changes = TaskChanges {
            assignee_id: Some(Some(assignee)),
            reviewer_id: Some(None),
            ..Default::default()
        };

        assert_eq!(changes.referenced_user_ids().collect::<Vec<_>>(), vec![assignee]);
    }

    #[test]
    fn test_apply_only_touches_present_fields() {
        let mut task = task();
        let original = task.clone();

        task.apply(&TaskChanges {
            status: Some(TaskStatus::Review),
            assignee_id: Some(None),
            ..Default::default()
        });

        assert_eq!(task.status, TaskStatus::Review);
        assert_eq!(task.assignee_id, None);
        assert_eq!(task.title, original.title);
        assert_eq!(task.due_date, original.due_date);
        assert_eq!(task.board_id, original.board_id);
    }

    #[test]
    fn test_view_row_without_assignee() {
        let row = TaskViewRow {
            id: Uuid::new_v4(),
            board_id: Uuid::new_v4(),
            title: "t".to_string(),
            description: String::new(),
            status: TaskStatus::Done,
            priority: TaskPriority::Low,
            due_date: None,
            assignee_id: None,
            assignee_email: None,
            assignee_fullname: None,
            reviewer_id: Some(Uuid::nil()),
            reviewer_email: Some("r@example.com".to_string()),
            reviewer_fullname: Some("Rita".to_string()),
            comments_count: 3,
        };

        let view = TaskView::from(row);
        assert!(view.assignee.is_none());
        assert_eq!(view.reviewer.map(|r| r.fullname), Some("Rita".to_string()));
        assert_eq!(view.comments_count, 3);
    }
}

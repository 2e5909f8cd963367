/// Integration tests for schema migrations
///
/// Run with: cargo test -p kanmind-shared --test db_migrations_tests

mod common;

use kanmind_shared::db::migrations::{ensure_database_exists, run_migrations};

#[tokio::test]
async fn test_ensure_database_exists() {
    let Some(url) = common::database_url() else { return };

    let result = ensure_database_exists(&url).await;
    assert!(result.is_ok(), "Failed to ensure database exists: {:?}", result.err());
}

#[tokio::test]
async fn test_migrations_are_idempotent() {
    let Some(pool) = common::test_pool().await else { return };

    assert!(run_migrations(&pool).await.is_ok());
    assert!(run_migrations(&pool).await.is_ok());
}

#[tokio::test]
async fn test_migration_creates_all_tables() {
    let Some(pool) = common::test_pool().await else { return };

    for table in ["users", "boards", "board_members", "tasks", "comments"] {
        let exists: bool = sqlx::query_scalar(
            "SELECT EXISTS(SELECT 1 FROM information_schema.tables WHERE table_name = $1)",
        )
        .bind(table)
        .fetch_one(&pool)
        .await
        .unwrap();

        assert!(exists, "Table {table} should exist");
    }
}

#[tokio::test]
async fn test_migration_creates_enums() {
    let Some(pool) = common::test_pool().await else { return };

    let statuses: Vec<String> = sqlx::query_scalar(
        "SELECT unnest(enum_range(NULL::task_status))::text",
    )
    .fetch_all(&pool)
    .await
    .unwrap();
    assert_eq!(statuses, vec!["to-do", "in-progress", "review", "done"]);

    let priorities: Vec<String> = sqlx::query_scalar(
        "SELECT unnest(enum_range(NULL::task_priority))::text",
    )
    .fetch_all(&pool)
    .await
    .unwrap();
    assert_eq!(priorities, vec!["low", "medium", "high"]);
}

#[tokio::test]
async fn test_email_is_case_insensitive_unique() {
    let Some(pool) = common::test_pool().await else { return };

    let local = uuid::Uuid::new_v4();
    let insert = "INSERT INTO users (email, fullname, password_hash) VALUES ($1, 'Dup', 'x')";

    sqlx::query(insert)
        .bind(format!("{local}@example.com"))
        .execute(&pool)
        .await
        .unwrap();

    let duplicate = sqlx::query(insert)
        .bind(format!("{}@EXAMPLE.com", local.to_string().to_uppercase()))
        .execute(&pool)
        .await;

    assert!(duplicate.is_err(), "Email uniqueness should ignore case");
}

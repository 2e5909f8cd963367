/// Database layer for KanMind
///
/// - `pool`: PostgreSQL connection pool with health checks
/// - `migrations`: Embedded schema migrations (`migrations/` at the workspace root)
///
/// Models live in the crate-level `models` module.
///
/// # Example
///
/// ```no_run
/// use kanmind_shared::db::pool::{create_pool, DatabaseConfig};
/// use kanmind_shared::db::migrations::run_migrations;
///
/// #[tokio::main]
/// async fn main() -> Result<(), Box<dyn std::error::Error>> {
///     let config = DatabaseConfig {
///         url: std::env::var("DATABASE_URL")?,
///         ..Default::default()
///     };
///
///     let pool = create_pool(config).await?;
///     run_migrations(&pool).await?;
///     Ok(())
/// }
/// ```

pub mod migrations;
pub mod pool;

/// Database models
///
/// - [`user`]: accounts and the public `UserSummary` projection
/// - [`board`]: boards and the annotated `BoardSummary` listing
/// - [`board_member`]: board membership rows
/// - [`task`]: tasks, partial updates and the `TaskView` read model
/// - [`comment`]: task comments
///
/// Every query function is generic over `sqlx::PgExecutor`, so it runs
/// against the pool or inside a transaction (`&mut *tx`) alike.

pub mod board;
pub mod board_member;
pub mod comment;
pub mod task;
pub mod user;

/// Board, task and comment operations
///
/// Each public function is one use case: it gates on the membership
/// predicate, validates its input, and performs its writes inside a single
/// transaction. Nothing is written until every check has passed.
///
/// - [`boards`]: listing, lifecycle and detail of boards
/// - [`tasks`]: task validator and mutator, task query views
/// - [`comments`]: ordered comments with author-only deletion

use std::collections::HashSet;

use sqlx::PgConnection;
use uuid::Uuid;

use crate::error::{ServiceError, ServiceResult};
use crate::models::user::User;

pub mod boards;
pub mod comments;
pub mod tasks;

/// Longest accepted board or task title, in characters
pub const MAX_TITLE_LENGTH: usize = 255;

/// Trims `title` and checks it is non-blank and not too long
pub fn normalize_title(title: &str) -> ServiceResult<String> {
    let trimmed = title.trim();

    if trimmed.is_empty() {
        return Err(ServiceError::validation("Title must not be empty."));
    }
    if trimmed.chars().count() > MAX_TITLE_LENGTH {
        return Err(ServiceError::validation(format!(
            "Title must be at most {MAX_TITLE_LENGTH} characters."
        )));
    }

    Ok(trimmed.to_string())
}

/// Fails with a validation error listing every id that is not a user
async fn ensure_users_exist(conn: &mut PgConnection, ids: &[Uuid]) -> ServiceResult<()> {
    let found: HashSet<Uuid> = User::existing_ids(conn, ids).await?.into_iter().collect();

    let missing: Vec<String> = ids
        .iter()
        .filter(|id| !found.contains(*id))
        .map(Uuid::to_string)
        .collect();

    if missing.is_empty() {
        Ok(())
    } else {
        Err(ServiceError::validation(format!(
            "Unknown user IDs: {}",
            missing.join(", ")
        )))
    }
}

/// Board membership predicate and permission checks
///
/// # Permission Model
///
/// A user is *authorized* on a board iff they own it or are in its member
/// set. Authorization grants every read and write on the board, its tasks
/// and its comments, with two exceptions:
///
/// 1. **Deleting a board** requires ownership
/// 2. **Deleting a comment** requires authorship (board ownership grants nothing)
///
/// Two forms of the predicate exist. [`BoardRoster::is_authorized`] is pure
/// and works on a roster that was already loaded for the ids in play,
/// usually with the board row locked inside a transaction. [`require_board_access`] asks the store directly
/// with a single `EXISTS` query.
///
/// # Example
///
/// ```no_run
/// use kanmind_shared::auth::authorization::require_board_access;
/// use sqlx::PgPool;
/// use uuid::Uuid;
///
/// # async fn example(pool: PgPool, board_id: Uuid, user_id: Uuid) -> Result<(), Box<dyn std::error::Error>> {
/// require_board_access(&pool, board_id, user_id).await?;
/// # Ok(())
/// # }
/// ```

use std::collections::HashSet;

use sqlx::PgExecutor;
use uuid::Uuid;

use crate::models::board::Board;
use crate::models::comment::Comment;

#[derive(Debug, thiserror::Error)]
pub enum AuthzError {
    /// Caller is neither owner nor member of the board
    #[error("You are not a member of board {0}")]
    NotBoardMember(Uuid),

    /// Operation is reserved to the board owner
    #[error("Only the owner of board {0} may do this")]
    NotBoardOwner(Uuid),

    #[error("Only the author of a comment may delete it")]
    NotCommentAuthor,

    #[error("Database error: {0}")]
    DatabaseError(#[from] sqlx::Error),
}

/// How a user relates to a board
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BoardAccess {
    Owner,
    Member,
    None,
}

impl BoardAccess {
    pub fn is_authorized(&self) -> bool {
        !matches!(self, BoardAccess::None)
    }
}

/// Owner of one board plus the members among the ids a check is about
///
/// Loaded by [`BoardMember::roster`](crate::models::board_member::BoardMember::roster)
/// for a handful of candidate ids, never the whole member list. Lookups are
/// O(1); an id that was not a candidate reads as a non-member.
#[derive(Debug, Clone)]
pub struct BoardRoster {
    pub board_id: Uuid,
    pub owner_id: Uuid,
    pub member_ids: HashSet<Uuid>,
}

impl BoardRoster {
    pub fn new(board_id: Uuid, owner_id: Uuid, member_ids: impl IntoIterator<Item = Uuid>) -> Self {
        Self {
            board_id,
            owner_id,
            member_ids: member_ids.into_iter().collect(),
        }
    }

    pub fn access(&self, user_id: Uuid) -> BoardAccess {
        if user_id == self.owner_id {
            BoardAccess::Owner
        } else if self.member_ids.contains(&user_id) {
            BoardAccess::Member
        } else {
            BoardAccess::None
        }
    }

    /// True iff `user_id` is the owner or a member
    pub fn is_authorized(&self, user_id: Uuid) -> bool {
        self.access(user_id).is_authorized()
    }

    pub fn require_access(&self, user_id: Uuid) -> Result<BoardAccess, AuthzError> {
        match self.access(user_id) {
            BoardAccess::None => Err(AuthzError::NotBoardMember(self.board_id)),
            access => Ok(access),
        }
    }
}

/// Fails with [`AuthzError::NotBoardMember`] unless `user_id` is authorized
/// on the board
///
/// A missing board also fails this check; callers that need to tell 404
/// from 403 load the board first.
pub async fn require_board_access<'e, E>(
    executor: E,
    board_id: Uuid,
    user_id: Uuid,
) -> Result<(), AuthzError>
where
    E: PgExecutor<'e>,
{
    if Board::is_authorized(executor, board_id, user_id).await? {
        Ok(())
    } else {
        tracing::debug!(board_id = %board_id, user_id = %user_id, "Board access denied");
        Err(AuthzError::NotBoardMember(board_id))
    }
}

pub fn require_board_owner(board: &Board, user_id: Uuid) -> Result<(), AuthzError> {
    if board.owner_id == user_id {
        Ok(())
    } else {
        Err(AuthzError::NotBoardOwner(board.id))
    }
}

pub fn require_comment_author(comment: &Comment, user_id: Uuid) -> Result<(), AuthzError> {
    if comment.author_id == user_id {
        Ok(())
    } else {
        Err(AuthzError::NotCommentAuthor)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn roster() -> (BoardRoster, Uuid, Uuid) {
        let owner = Uuid::new_v4();
        let member = Uuid::new_v4();
        (BoardRoster::new(Uuid::new_v4(), owner, [owner, member]), owner, member)
    }

    #[test]
    fn test_roster_access_levels() {
        let (roster, owner, member) = roster();

        assert_eq!(roster.access(owner), BoardAccess::Owner);
        assert_eq!(roster.access(member), BoardAccess::Member);
        assert_eq!(roster.access(Uuid::new_v4()), BoardAccess::None);
    }

    #[test]
    fn test_owner_authorized_without_member_row() {
        let owner = Uuid::new_v4();
        let roster = BoardRoster::new(Uuid::new_v4(), owner, []);
        assert!(roster.is_authorized(owner));
    }

    #[test]
    fn test_require_access_reports_board() {
        let (roster, _, _) = roster();
        let err = roster.require_access(Uuid::new_v4()).unwrap_err();
        assert!(matches!(err, AuthzError::NotBoardMember(id) if id == roster.board_id));
    }

    #[test]
    fn test_require_board_owner() {
        let owner = Uuid::new_v4();
        let board = Board {
            id: Uuid::new_v4(),
            title: "Roadmap".to_string(),
            owner_id: owner,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        };

        assert!(require_board_owner(&board, owner).is_ok());
        assert!(matches!(
            require_board_owner(&board, Uuid::new_v4()),
            Err(AuthzError::NotBoardOwner(_))
        ));
    }

    #[test]
    fn test_require_comment_author() {
        let author = Uuid::new_v4();
        let comment = Comment {
            id: Uuid::new_v4(),
            task_id: Uuid::new_v4(),
            author_id: author,
            content: "Looks good".to_string(),
            created_at: Utc::now(),
        };

        assert!(require_comment_author(&comment, author).is_ok());
        assert!(matches!(
            require_comment_author(&comment, Uuid::new_v4()),
            Err(AuthzError::NotCommentAuthor)
        ));
    }
}

/// Board membership rows
///
/// # Schema
///
/// ```sql
/// CREATE TABLE board_members (
///     board_id UUID NOT NULL REFERENCES boards(id) ON DELETE CASCADE,
///     user_id UUID NOT NULL REFERENCES users(id) ON DELETE CASCADE,
///     created_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
///     PRIMARY KEY (board_id, user_id)
/// );
/// CREATE INDEX idx_board_members_user_id ON board_members(user_id);
/// ```

use sqlx::{PgConnection, PgExecutor};
use uuid::Uuid;

use crate::auth::authorization::BoardRoster;
use crate::models::board::Board;
use crate::models::user::UserSummary;

pub struct BoardMember;

impl BoardMember {
    /// Adds `user_ids` to the board, ignoring ids that are already members
    pub async fn add_many<'e, E>(executor: E, board_id: Uuid, user_ids: &[Uuid]) -> Result<(), sqlx::Error>
    where
        E: PgExecutor<'e>,
    {
        if user_ids.is_empty() {
            return Ok(());
        }

        sqlx::query(
            r#"
            INSERT INTO board_members (board_id, user_id)
            SELECT $1, u FROM UNNEST($2::uuid[]) AS u
            ON CONFLICT (board_id, user_id) DO NOTHING
            "#,
        )
        .bind(board_id)
        .bind(user_ids)
        .execute(executor)
        .await?;

        Ok(())
    }

    /// Makes the member set exactly `user_ids`
    ///
    /// Rows for users who stay are left untouched, so their `created_at`
    /// survives. Call inside a transaction.
    pub async fn replace(conn: &mut PgConnection, board_id: Uuid, user_ids: &[Uuid]) -> Result<(), sqlx::Error> {
        sqlx::query("DELETE FROM board_members WHERE board_id = $1 AND user_id <> ALL($2)")
            .bind(board_id)
            .bind(user_ids)
            .execute(&mut *conn)
            .await?;

        Self::add_many(&mut *conn, board_id, user_ids).await
    }

    /// Which of `candidates` are members of the board
    ///
    /// One `(board_id, user_id)` primary-key lookup per candidate; the
    /// board's full member list is never read.
    pub async fn members_among<'e, E>(
        executor: E,
        board_id: Uuid,
        candidates: &[Uuid],
    ) -> Result<Vec<Uuid>, sqlx::Error>
    where
        E: PgExecutor<'e>,
    {
        if candidates.is_empty() {
            return Ok(Vec::new());
        }

        sqlx::query_scalar(
            "SELECT user_id FROM board_members WHERE board_id = $1 AND user_id = ANY($2)",
        )
        .bind(board_id)
        .bind(candidates)
        .fetch_all(executor)
        .await
    }

    /// Members as public user projections, in joining order
    pub async fn list_users<'e, E>(executor: E, board_id: Uuid) -> Result<Vec<UserSummary>, sqlx::Error>
    where
        E: PgExecutor<'e>,
    {
        sqlx::query_as::<_, UserSummary>(
            r#"
            SELECT u.id, u.email, u.fullname
            FROM board_members m
            JOIN users u ON u.id = m.user_id
            WHERE m.board_id = $1
            ORDER BY m.created_at, u.id
            "#,
        )
        .bind(board_id)
        .fetch_all(executor)
        .await
    }

    /// Roster of an already-loaded board, restricted to `candidates`
    ///
    /// Only the requester and the users a write references need to be
    /// passed; any other id reads as a non-member on the returned roster.
    pub async fn roster<'e, E>(
        executor: E,
        board: &Board,
        candidates: &[Uuid],
    ) -> Result<BoardRoster, sqlx::Error>
    where
        E: PgExecutor<'e>,
    {
        let members = Self::members_among(executor, board.id, candidates).await?;
        Ok(BoardRoster::new(board.id, board.owner_id, members))
    }
}

//! Repository for the `messages` table.

use beehive_core::roles::ROLE_ADMIN;
use beehive_core::types::DbId;
use sqlx::PgPool;

use crate::models::message::Message;

const COLUMNS: &str =
    "id, from_account_id, from_role, to_account_id, to_role, content, created_at";

pub struct MessageRepo;

impl MessageRepo {
    /// Persist a message, returning the created row.
    pub async fn create(
        pool: &PgPool,
        from_account_id: DbId,
        from_role: &str,
        to_account_id: DbId,
        to_role: &str,
        content: &str,
    ) -> Result<Message, sqlx::Error> {
        let query = format!(
            "INSERT INTO messages (from_account_id, from_role, to_account_id, to_role, content)
             VALUES ($1, $2, $3, $4, $5)
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Message>(&query)
            .bind(from_account_id)
            .bind(from_role)
            .bind(to_account_id)
            .bind(to_role)
            .bind(content)
            .fetch_one(pool)
            .await
    }

    /// The admin<->user thread visible to one account, oldest first.
    ///
    /// A user sees their exchange with the admin side. An admin's view is
    /// everything addressed to or sent by them: incoming user messages carry
    /// `from_role = 'user'`, so the user-side filter would hide them.
    pub async fn thread_for_account(
        pool: &PgPool,
        account_id: DbId,
        role: &str,
    ) -> Result<Vec<Message>, sqlx::Error> {
        let filter = if role == ROLE_ADMIN {
            "from_account_id = $1 OR to_account_id = $1"
        } else {
            "(from_account_id = $1 AND to_role = 'admin')
                OR (to_account_id = $1 AND from_role = 'admin')"
        };
        let query = format!(
            "SELECT {COLUMNS} FROM messages
             WHERE {filter}
             ORDER BY created_at ASC"
        );
        sqlx::query_as::<_, Message>(&query)
            .bind(account_id)
            .fetch_all(pool)
            .await
    }
}

//! Repository for the `media_items` table.
//!
//! Every mutating query is owner-scoped (`AND account_id = $n`) so ownership
//! is enforced in the same statement as the write.

use beehive_core::types::DbId;
use sqlx::PgPool;

use crate::models::media::{CreateMediaItem, MediaItem, UpdateMediaItem};

const COLUMNS: &str = "id, account_id, filename, title, description, sentiment, \
                        audio_filename, created_at, updated_at";

pub struct MediaRepo;

impl MediaRepo {
    /// Record a new upload's metadata, returning the created row.
    pub async fn create(
        pool: &PgPool,
        account_id: DbId,
        input: &CreateMediaItem,
    ) -> Result<MediaItem, sqlx::Error> {
        let query = format!(
            "INSERT INTO media_items (account_id, filename, title, description, sentiment, audio_filename)
             VALUES ($1, $2, $3, $4, $5, $6)
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, MediaItem>(&query)
            .bind(account_id)
            .bind(&input.filename)
            .bind(&input.title)
            .bind(&input.description)
            .bind(&input.sentiment)
            .bind(&input.audio_filename)
            .fetch_one(pool)
            .await
    }

    /// List an account's uploads, most recent first.
    pub async fn list_by_account(
        pool: &PgPool,
        account_id: DbId,
    ) -> Result<Vec<MediaItem>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM media_items
             WHERE account_id = $1
             ORDER BY created_at DESC"
        );
        sqlx::query_as::<_, MediaItem>(&query)
            .bind(account_id)
            .fetch_all(pool)
            .await
    }

    /// Edit metadata on an item owned by `account_id`.
    ///
    /// Returns `None` if no such item exists for that owner.
    pub async fn update_owned(
        pool: &PgPool,
        id: DbId,
        account_id: DbId,
        input: &UpdateMediaItem,
    ) -> Result<Option<MediaItem>, sqlx::Error> {
        let query = format!(
            "UPDATE media_items SET
                title = COALESCE($3, title),
                description = COALESCE($4, description),
                sentiment = COALESCE($5, sentiment),
                updated_at = NOW()
             WHERE id = $1 AND account_id = $2
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, MediaItem>(&query)
            .bind(id)
            .bind(account_id)
            .bind(&input.title)
            .bind(&input.description)
            .bind(&input.sentiment)
            .fetch_optional(pool)
            .await
    }

    /// Delete an item owned by `account_id`. Returns `true` if deleted.
    pub async fn delete_owned(
        pool: &PgPool,
        id: DbId,
        account_id: DbId,
    ) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM media_items WHERE id = $1 AND account_id = $2")
            .bind(id)
            .bind(account_id)
            .execute(pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}

//! Repository for the `notifications` table.

use beehive_core::types::DbId;
use sqlx::PgPool;

use crate::models::notification::Notification;

const COLUMNS: &str = "id, account_id, username, filename, title, sentiment, seen, created_at";

pub struct NotificationRepo;

impl NotificationRepo {
    /// Record an upload notification for the admin dashboard.
    pub async fn create(
        pool: &PgPool,
        account_id: DbId,
        username: &str,
        filename: &str,
        title: &str,
        sentiment: Option<&str>,
    ) -> Result<Notification, sqlx::Error> {
        let query = format!(
            "INSERT INTO notifications (account_id, username, filename, title, sentiment)
             VALUES ($1, $2, $3, $4, $5)
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Notification>(&query)
            .bind(account_id)
            .bind(username)
            .bind(filename)
            .bind(title)
            .bind(sentiment)
            .fetch_one(pool)
            .await
    }

    /// List unseen notifications, newest first.
    pub async fn list_unseen(pool: &PgPool) -> Result<Vec<Notification>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM notifications
             WHERE seen = false
             ORDER BY created_at DESC"
        );
        sqlx::query_as::<_, Notification>(&query).fetch_all(pool).await
    }

    /// Atomically mark all unseen notifications seen and return them, newest
    /// first. One statement, so a concurrent reader never observes a
    /// half-marked batch.
    pub async fn take_unseen(pool: &PgPool) -> Result<Vec<Notification>, sqlx::Error> {
        let query = format!(
            "UPDATE notifications SET seen = true
             WHERE seen = false
             RETURNING {COLUMNS}"
        );
        let mut rows = sqlx::query_as::<_, Notification>(&query)
            .fetch_all(pool)
            .await?;
        rows.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(rows)
    }
}

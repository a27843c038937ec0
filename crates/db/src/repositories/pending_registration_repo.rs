//! Repository for the `pending_registrations` table.

use sqlx::PgPool;

use crate::models::pending_registration::PendingRegistration;

const COLUMNS: &str =
    "id, external_id, email, given_name, family_name, created_at, expires_at";

/// How long a parked registration stays claimable.
const TTL_MINUTES: i32 = 15;

/// Stores verified OAuth claims between the callback and the explicit
/// registration call, so account creation never re-verifies the token.
pub struct PendingRegistrationRepo;

impl PendingRegistrationRepo {
    /// Park verified claims for an external subject.
    ///
    /// Upsert keyed on `external_id`: a repeated callback for the same
    /// subject refreshes the claims and the expiry instead of duplicating.
    pub async fn upsert(
        pool: &PgPool,
        external_id: &str,
        email: &str,
        given_name: Option<&str>,
        family_name: Option<&str>,
    ) -> Result<PendingRegistration, sqlx::Error> {
        let query = format!(
            "INSERT INTO pending_registrations (external_id, email, given_name, family_name, expires_at)
             VALUES ($1, $2, $3, $4, NOW() + make_interval(mins => $5))
             ON CONFLICT (external_id)
             DO UPDATE SET email = EXCLUDED.email,
                           given_name = EXCLUDED.given_name,
                           family_name = EXCLUDED.family_name,
                           expires_at = EXCLUDED.expires_at
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, PendingRegistration>(&query)
            .bind(external_id)
            .bind(email)
            .bind(given_name)
            .bind(family_name)
            .bind(TTL_MINUTES)
            .fetch_one(pool)
            .await
    }

    /// Find a still-valid pending registration by external subject id.
    pub async fn find_valid(
        pool: &PgPool,
        external_id: &str,
    ) -> Result<Option<PendingRegistration>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM pending_registrations
             WHERE external_id = $1 AND expires_at > NOW()"
        );
        sqlx::query_as::<_, PendingRegistration>(&query)
            .bind(external_id)
            .fetch_optional(pool)
            .await
    }

    /// Remove a pending registration once consumed.
    pub async fn delete(pool: &PgPool, external_id: &str) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM pending_registrations WHERE external_id = $1")
            .bind(external_id)
            .execute(pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    /// Delete expired rows. Returns the deleted count.
    pub async fn purge_expired(pool: &PgPool) -> Result<u64, sqlx::Error> {
        let result = sqlx::query("DELETE FROM pending_registrations WHERE expires_at < NOW()")
            .execute(pool)
            .await?;
        Ok(result.rows_affected())
    }
}

//! Repository for the `oauth_states` table.

use sqlx::PgPool;

use crate::models::oauth_state::OAuthState;

const COLUMNS: &str = "state, nonce, pkce_verifier, created_at, expires_at";

/// Transient authorization-redirect state, keyed by the CSRF `state` nonce.
pub struct OAuthStateRepo;

impl OAuthStateRepo {
    /// Persist handshake state at the start of an authorization redirect.
    pub async fn insert(
        pool: &PgPool,
        state: &str,
        nonce: &str,
        pkce_verifier: &str,
    ) -> Result<(), sqlx::Error> {
        sqlx::query(
            "INSERT INTO oauth_states (state, nonce, pkce_verifier, expires_at)
             VALUES ($1, $2, $3, NOW() + interval '10 minutes')",
        )
        .bind(state)
        .bind(nonce)
        .bind(pkce_verifier)
        .execute(pool)
        .await?;
        Ok(())
    }

    /// Consume handshake state: delete-and-return in one statement, so a
    /// replayed callback with the same `state` finds nothing.
    pub async fn take(pool: &PgPool, state: &str) -> Result<Option<OAuthState>, sqlx::Error> {
        let query = format!(
            "DELETE FROM oauth_states
             WHERE state = $1 AND expires_at > NOW()
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, OAuthState>(&query)
            .bind(state)
            .fetch_optional(pool)
            .await
    }

    /// Delete expired handshake rows. Returns the deleted count.
    pub async fn purge_expired(pool: &PgPool) -> Result<u64, sqlx::Error> {
        let result = sqlx::query("DELETE FROM oauth_states WHERE expires_at < NOW()")
            .execute(pool)
            .await?;
        Ok(result.rows_affected())
    }
}

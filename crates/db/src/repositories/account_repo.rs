//! Repository for the `accounts` table.

use beehive_core::roles::ROLE_ADMIN;
use beehive_core::types::DbId;
use sqlx::PgPool;

use crate::models::account::{Account, CreateAccount};

/// Column list shared across queries to avoid repetition.
const COLUMNS: &str = "id, username, email, password_hash, external_id, role, \
                        first_name, last_name, security_question, security_answer_hash, \
                        is_active, last_login_at, created_at, updated_at";

/// Provides CRUD and credential operations for accounts.
pub struct AccountRepo;

impl AccountRepo {
    /// Insert a new account, returning the created row.
    ///
    /// Fails with a unique-constraint violation (`uq_accounts_*`) on a
    /// duplicate username, email, or external id, and with a check-constraint
    /// violation if neither credential field is set.
    pub async fn create(pool: &PgPool, input: &CreateAccount) -> Result<Account, sqlx::Error> {
        let query = format!(
            "INSERT INTO accounts
                (username, email, password_hash, external_id, role,
                 first_name, last_name, security_question, security_answer_hash)
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Account>(&query)
            .bind(&input.username)
            .bind(&input.email)
            .bind(&input.password_hash)
            .bind(&input.external_id)
            .bind(&input.role)
            .bind(&input.first_name)
            .bind(&input.last_name)
            .bind(&input.security_question)
            .bind(&input.security_answer_hash)
            .fetch_one(pool)
            .await
    }

    /// Find an account by internal id.
    pub async fn find_by_id(pool: &PgPool, id: DbId) -> Result<Option<Account>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM accounts WHERE id = $1");
        sqlx::query_as::<_, Account>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// Find an account by username (case-sensitive).
    pub async fn find_by_username(
        pool: &PgPool,
        username: &str,
    ) -> Result<Option<Account>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM accounts WHERE username = $1");
        sqlx::query_as::<_, Account>(&query)
            .bind(username)
            .fetch_optional(pool)
            .await
    }

    /// Find an account by email (case-insensitive).
    pub async fn find_by_email(pool: &PgPool, email: &str) -> Result<Option<Account>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM accounts WHERE lower(email) = lower($1)");
        sqlx::query_as::<_, Account>(&query)
            .bind(email)
            .fetch_optional(pool)
            .await
    }

    /// Find an account by external provider subject id.
    pub async fn find_by_external_id(
        pool: &PgPool,
        external_id: &str,
    ) -> Result<Option<Account>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM accounts WHERE external_id = $1");
        sqlx::query_as::<_, Account>(&query)
            .bind(external_id)
            .fetch_optional(pool)
            .await
    }

    /// List all accounts ordered by most recently created first.
    pub async fn list(pool: &PgPool) -> Result<Vec<Account>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM accounts ORDER BY created_at DESC");
        sqlx::query_as::<_, Account>(&query).fetch_all(pool).await
    }

    /// Read only the current role and active flag for an account.
    ///
    /// Used by privileged checks that must not rely on a cached role.
    pub async fn current_role(
        pool: &PgPool,
        id: DbId,
    ) -> Result<Option<(String, bool)>, sqlx::Error> {
        let row: Option<(String, bool)> =
            sqlx::query_as("SELECT role, is_active FROM accounts WHERE id = $1")
                .bind(id)
                .fetch_optional(pool)
                .await?;
        Ok(row)
    }

    /// Attach an external subject id to an existing account (first SSO login
    /// against an account previously matched by email). Only succeeds if the
    /// account has no external id yet; returns the updated row.
    pub async fn link_external_id(
        pool: &PgPool,
        id: DbId,
        external_id: &str,
    ) -> Result<Option<Account>, sqlx::Error> {
        let query = format!(
            "UPDATE accounts SET external_id = $2, updated_at = NOW()
             WHERE id = $1 AND external_id IS NULL
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Account>(&query)
            .bind(id)
            .bind(external_id)
            .fetch_optional(pool)
            .await
    }

    /// Replace the password hash. Returns `true` if the row was updated.
    pub async fn update_password_hash(
        pool: &PgPool,
        id: DbId,
        password_hash: &str,
    ) -> Result<bool, sqlx::Error> {
        let result =
            sqlx::query("UPDATE accounts SET password_hash = $2, updated_at = NOW() WHERE id = $1")
                .bind(id)
                .bind(password_hash)
                .execute(pool)
                .await?;
        Ok(result.rows_affected() > 0)
    }

    /// Change the username. Fails on `uq_accounts_username` if taken.
    pub async fn update_username(
        pool: &PgPool,
        id: DbId,
        username: &str,
    ) -> Result<bool, sqlx::Error> {
        let result =
            sqlx::query("UPDATE accounts SET username = $2, updated_at = NOW() WHERE id = $1")
                .bind(id)
                .bind(username)
                .execute(pool)
                .await?;
        Ok(result.rows_affected() > 0)
    }

    /// Change the email. Fails on `uq_accounts_email` if taken.
    pub async fn update_email(pool: &PgPool, id: DbId, email: &str) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("UPDATE accounts SET email = $2, updated_at = NOW() WHERE id = $1")
            .bind(id)
            .bind(email)
            .execute(pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    /// Set the account role. Returns the updated row, or `None` if absent.
    pub async fn update_role(
        pool: &PgPool,
        id: DbId,
        role: &str,
    ) -> Result<Option<Account>, sqlx::Error> {
        let query = format!(
            "UPDATE accounts SET role = $2, updated_at = NOW()
             WHERE id = $1
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Account>(&query)
            .bind(id)
            .bind(role)
            .fetch_optional(pool)
            .await
    }

    /// One-time elevation of an existing account to `admin`.
    ///
    /// A single conditional UPDATE, so concurrent logins race harmlessly:
    /// whichever statement runs first performs the elevation and the rest
    /// match zero rows. Returns `true` if this call performed the elevation.
    pub async fn promote_admin_if_absent(pool: &PgPool, id: DbId) -> Result<bool, sqlx::Error> {
        let result = sqlx::query(
            "UPDATE accounts SET role = $2, updated_at = NOW()
             WHERE id = $1 AND role <> $2",
        )
        .bind(id)
        .bind(ROLE_ADMIN)
        .execute(pool)
        .await?;
        Ok(result.rows_affected() > 0)
    }

    /// Create-or-elevate an admin account keyed by external subject id.
    ///
    /// One atomic upsert: the unique index on `external_id` guarantees that
    /// N concurrent first-time logins produce exactly one row, never
    /// duplicates. Existing rows are elevated in the same statement.
    pub async fn upsert_admin_if_absent(
        pool: &PgPool,
        external_id: &str,
        username: &str,
        email: &str,
        first_name: Option<&str>,
        last_name: Option<&str>,
    ) -> Result<Account, sqlx::Error> {
        let query = format!(
            "INSERT INTO accounts (username, email, external_id, role, first_name, last_name)
             VALUES ($1, $2, $3, $4, $5, $6)
             ON CONFLICT (external_id)
             DO UPDATE SET role = EXCLUDED.role, updated_at = NOW()
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Account>(&query)
            .bind(username)
            .bind(email)
            .bind(external_id)
            .bind(ROLE_ADMIN)
            .bind(first_name)
            .bind(last_name)
            .fetch_one(pool)
            .await
    }

    /// Record a successful login.
    pub async fn record_login(pool: &PgPool, id: DbId) -> Result<(), sqlx::Error> {
        sqlx::query("UPDATE accounts SET last_login_at = NOW() WHERE id = $1")
            .bind(id)
            .execute(pool)
            .await?;
        Ok(())
    }

    /// Soft-deactivate an account. Returns `true` if the row was updated.
    pub async fn deactivate(pool: &PgPool, id: DbId) -> Result<bool, sqlx::Error> {
        let result =
            sqlx::query("UPDATE accounts SET is_active = false, updated_at = NOW() WHERE id = $1 AND is_active = true")
                .bind(id)
                .execute(pool)
                .await?;
        Ok(result.rows_affected() > 0)
    }
}

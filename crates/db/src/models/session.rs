//! Session model and DTOs.

use beehive_core::types::{DbId, Timestamp};
use sqlx::FromRow;

/// A session row from the `sessions` table.
///
/// `role_at_login` is a snapshot taken when the session was issued. It is
/// advisory: privileged checks re-read the account's current role.
#[derive(Debug, Clone, FromRow)]
pub struct Session {
    pub id: DbId,
    pub account_id: DbId,
    pub refresh_token_hash: String,
    pub role_at_login: String,
    pub issued_at: Timestamp,
    pub expires_at: Timestamp,
    pub revoked_at: Option<Timestamp>,
}

/// DTO for creating a new session.
pub struct CreateSession {
    pub account_id: DbId,
    pub refresh_token_hash: String,
    pub role_at_login: String,
    pub expires_at: Timestamp,
}

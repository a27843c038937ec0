//! Account entity model and DTOs.

use beehive_core::types::{DbId, Timestamp};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// Full account row from the `accounts` table.
///
/// Contains credential hashes -- NEVER serialize this to API responses
/// directly. Use [`AccountResponse`] for external-facing output.
///
/// Invariant (also enforced by a CHECK constraint): at least one of
/// `password_hash` or `external_id` is set, so every account has a usable
/// sign-in method.
#[derive(Debug, Clone, FromRow)]
pub struct Account {
    pub id: DbId,
    pub username: String,
    pub email: String,
    /// Absent for OAuth-only accounts.
    pub password_hash: Option<String>,
    /// Provider subject id (Google `sub`). Absent for local-only accounts.
    pub external_id: Option<String>,
    pub role: String,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub security_question: Option<String>,
    /// Hashed like a password; the plaintext answer is never stored.
    pub security_answer_hash: Option<String>,
    pub is_active: bool,
    pub last_login_at: Option<Timestamp>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

impl Account {
    /// Whether this account can only sign in through the external provider.
    pub fn is_external_only(&self) -> bool {
        self.password_hash.is_none() && self.external_id.is_some()
    }
}

/// Safe account representation for API responses (no credential material).
#[derive(Debug, Clone, Serialize)]
pub struct AccountResponse {
    pub id: DbId,
    pub username: String,
    pub email: String,
    pub role: String,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub is_active: bool,
    pub last_login_at: Option<Timestamp>,
    pub created_at: Timestamp,
}

impl From<Account> for AccountResponse {
    fn from(a: Account) -> Self {
        Self {
            id: a.id,
            username: a.username,
            email: a.email,
            role: a.role,
            first_name: a.first_name,
            last_name: a.last_name,
            is_active: a.is_active,
            last_login_at: a.last_login_at,
            created_at: a.created_at,
        }
    }
}

/// DTO for creating a new account.
#[derive(Debug, Deserialize)]
pub struct CreateAccount {
    pub username: String,
    pub email: String,
    pub password_hash: Option<String>,
    pub external_id: Option<String>,
    pub role: String,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub security_question: Option<String>,
    pub security_answer_hash: Option<String>,
}

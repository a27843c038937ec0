//! Admin/user chat message model.

use beehive_core::types::{DbId, Timestamp};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Message {
    pub id: DbId,
    pub from_account_id: DbId,
    pub from_role: String,
    pub to_account_id: DbId,
    pub to_role: String,
    pub content: String,
    pub created_at: Timestamp,
}

/// DTO for sending a message.
#[derive(Debug, Deserialize)]
pub struct CreateMessage {
    pub to_account_id: DbId,
    pub content: String,
}

//! Upload notification model for the admin dashboard.

use beehive_core::types::{DbId, Timestamp};
use serde::Serialize;
use sqlx::FromRow;

#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Notification {
    pub id: DbId,
    pub account_id: DbId,
    pub username: String,
    pub filename: String,
    pub title: String,
    pub sentiment: Option<String>,
    pub seen: bool,
    pub created_at: Timestamp,
}

//! Pending OAuth registration model.

use beehive_core::types::{DbId, Timestamp};
use sqlx::FromRow;

/// Verified external-identity claims parked until the user completes
/// registration with a chosen username. Short-lived; rows past `expires_at`
/// are ignored and periodically purged.
#[derive(Debug, Clone, FromRow)]
pub struct PendingRegistration {
    pub id: DbId,
    pub external_id: String,
    pub email: String,
    pub given_name: Option<String>,
    pub family_name: Option<String>,
    pub created_at: Timestamp,
    pub expires_at: Timestamp,
}

//! Media item metadata model and DTOs.
//!
//! Only metadata lives here; file bytes and thumbnail rendering are handled
//! outside this system.

use beehive_core::types::{DbId, Timestamp};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// An upload's metadata row from the `media_items` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct MediaItem {
    pub id: DbId,
    pub account_id: DbId,
    pub filename: String,
    pub title: String,
    pub description: String,
    pub sentiment: Option<String>,
    pub audio_filename: Option<String>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// DTO for recording a new upload.
#[derive(Debug, Deserialize)]
pub struct CreateMediaItem {
    pub filename: String,
    pub title: String,
    pub description: String,
    pub sentiment: Option<String>,
    pub audio_filename: Option<String>,
}

/// DTO for editing an upload's metadata. All fields optional.
#[derive(Debug, Deserialize)]
pub struct UpdateMediaItem {
    pub title: Option<String>,
    pub description: Option<String>,
    pub sentiment: Option<String>,
}

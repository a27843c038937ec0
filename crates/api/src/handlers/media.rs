//! Handlers for the `/media` resource (upload metadata CRUD).
//!
//! File bytes never pass through here; clients upload elsewhere and record
//! the metadata. Every query is owner-scoped, so one user can never read or
//! mutate another's items regardless of what ids they guess.

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::Json;
use beehive_core::error::CoreError;
use beehive_core::types::DbId;
use beehive_db::models::media::{CreateMediaItem, MediaItem, UpdateMediaItem};
use beehive_db::repositories::{AccountRepo, MediaRepo, NotificationRepo};

use crate::error::{AppError, AppResult};
use crate::middleware::rbac::RequireUser;
use crate::state::AppState;

/// POST /api/v1/media
///
/// Record a new upload's metadata and raise a dashboard notification.
pub async fn create_media(
    State(state): State<AppState>,
    RequireUser(user): RequireUser,
    Json(input): Json<CreateMediaItem>,
) -> AppResult<(StatusCode, Json<MediaItem>)> {
    if input.title.trim().is_empty() {
        return Err(AppError::Core(CoreError::Validation(
            "Title must not be empty".into(),
        )));
    }
    if input.description.trim().is_empty() {
        return Err(AppError::Core(CoreError::Validation(
            "Description must not be empty".into(),
        )));
    }
    if input.filename.trim().is_empty() {
        return Err(AppError::Core(CoreError::Validation(
            "Filename must not be empty".into(),
        )));
    }

    let item = MediaRepo::create(&state.pool, user.account_id, &input).await?;

    // Notification failure must not fail the upload.
    match AccountRepo::find_by_id(&state.pool, user.account_id).await {
        Ok(Some(account)) => {
            if let Err(e) = NotificationRepo::create(
                &state.pool,
                user.account_id,
                &account.username,
                &item.filename,
                &item.title,
                item.sentiment.as_deref(),
            )
            .await
            {
                tracing::error!(error = %e, media_id = item.id, "Failed to record notification");
            }
        }
        Ok(None) => {}
        Err(e) => {
            tracing::error!(error = %e, media_id = item.id, "Failed to load uploader for notification");
        }
    }

    Ok((StatusCode::CREATED, Json(item)))
}

/// GET /api/v1/media
pub async fn list_media(
    State(state): State<AppState>,
    RequireUser(user): RequireUser,
) -> AppResult<Json<Vec<MediaItem>>> {
    let items = MediaRepo::list_by_account(&state.pool, user.account_id).await?;
    Ok(Json(items))
}

/// PUT /api/v1/media/{id}
///
/// Edit title/description/sentiment on an item the caller owns. A missing
/// or foreign item is a plain 404; the response never reveals whether the
/// id exists under someone else.
pub async fn update_media(
    State(state): State<AppState>,
    RequireUser(user): RequireUser,
    Path(id): Path<DbId>,
    Json(input): Json<UpdateMediaItem>,
) -> AppResult<Json<MediaItem>> {
    let item = MediaRepo::update_owned(&state.pool, id, user.account_id, &input)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound {
            entity: "media item",
            id,
        }))?;
    Ok(Json(item))
}

/// DELETE /api/v1/media/{id}
pub async fn delete_media(
    State(state): State<AppState>,
    RequireUser(user): RequireUser,
    Path(id): Path<DbId>,
) -> AppResult<StatusCode> {
    let deleted = MediaRepo::delete_owned(&state.pool, id, user.account_id).await?;
    if !deleted {
        return Err(AppError::Core(CoreError::NotFound {
            entity: "media item",
            id,
        }));
    }
    Ok(StatusCode::NO_CONTENT)
}

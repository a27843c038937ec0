//! Handlers for the `/admin` resource.
//!
//! Every handler here takes [`RequireAdmin`], which re-reads the caller's
//! current role from the store on each request. A session handle minted
//! before a demotion buys nothing.

use axum::extract::{Path, Query, State};
use axum::Json;
use beehive_core::error::CoreError;
use beehive_core::roles::{ROLE_ADMIN, ROLE_USER};
use beehive_core::types::DbId;
use beehive_db::models::account::AccountResponse;
use beehive_db::models::media::MediaItem;
use beehive_db::models::notification::Notification;
use beehive_db::repositories::{AccountRepo, MediaRepo, NotificationRepo};
use serde::Deserialize;

use crate::error::{AppError, AppResult};
use crate::middleware::rbac::RequireAdmin;
use crate::state::AppState;

/// Request body for `PUT /admin/users/{id}/role`.
#[derive(Debug, Deserialize)]
pub struct UpdateRoleRequest {
    pub role: String,
}

/// Query parameters for `GET /admin/notifications`.
#[derive(Debug, Deserialize)]
pub struct NotificationParams {
    /// When true, atomically mark the returned batch seen.
    #[serde(default)]
    pub mark_seen: bool,
}

/// GET /api/v1/admin/users
pub async fn list_users(
    State(state): State<AppState>,
    RequireAdmin(_admin): RequireAdmin,
) -> AppResult<Json<Vec<AccountResponse>>> {
    let accounts = AccountRepo::list(&state.pool).await?;
    Ok(Json(accounts.into_iter().map(Into::into).collect()))
}

/// GET /api/v1/admin/users/{id}/media
pub async fn user_media(
    State(state): State<AppState>,
    RequireAdmin(_admin): RequireAdmin,
    Path(id): Path<DbId>,
) -> AppResult<Json<Vec<MediaItem>>> {
    AccountRepo::find_by_id(&state.pool, id)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound {
            entity: "account",
            id,
        }))?;

    let items = MediaRepo::list_by_account(&state.pool, id).await?;
    Ok(Json(items))
}

/// PUT /api/v1/admin/users/{id}/role
pub async fn update_role(
    State(state): State<AppState>,
    RequireAdmin(admin): RequireAdmin,
    Path(id): Path<DbId>,
    Json(input): Json<UpdateRoleRequest>,
) -> AppResult<Json<AccountResponse>> {
    if input.role != ROLE_USER && input.role != ROLE_ADMIN {
        return Err(AppError::Core(CoreError::Validation(format!(
            "Unknown role: {}",
            input.role
        ))));
    }

    let account = AccountRepo::update_role(&state.pool, id, &input.role)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound {
            entity: "account",
            id,
        }))?;

    tracing::info!(
        admin_id = admin.account_id,
        account_id = account.id,
        role = %account.role,
        "Role updated"
    );

    Ok(Json(account.into()))
}

/// GET /api/v1/admin/notifications
///
/// Unseen upload notifications, newest first. With `?mark_seen=true` the
/// batch is marked seen in the same statement that reads it, so concurrent
/// dashboard polls never double-deliver.
pub async fn notifications(
    State(state): State<AppState>,
    RequireAdmin(_admin): RequireAdmin,
    Query(params): Query<NotificationParams>,
) -> AppResult<Json<Vec<Notification>>> {
    let rows = if params.mark_seen {
        NotificationRepo::take_unseen(&state.pool).await?
    } else {
        NotificationRepo::list_unseen(&state.pool).await?
    };
    Ok(Json(rows))
}

//! Handlers for the `/chat` resource (user <-> admin messaging).

use axum::extract::State;
use axum::http::StatusCode;
use axum::Json;
use beehive_core::error::CoreError;
use beehive_db::models::message::{CreateMessage, Message};
use beehive_db::repositories::{AccountRepo, MessageRepo};

use crate::error::{AppError, AppResult};
use crate::middleware::rbac::RequireUser;
use crate::state::AppState;

/// GET /api/v1/chat/messages
///
/// The caller's thread, oldest first: a user's exchange with the admin
/// side, or everything sent to or by an admin caller.
pub async fn list_messages(
    State(state): State<AppState>,
    RequireUser(user): RequireUser,
) -> AppResult<Json<Vec<Message>>> {
    let messages =
        MessageRepo::thread_for_account(&state.pool, user.account_id, &user.role).await?;
    Ok(Json(messages))
}

/// POST /api/v1/chat/messages
///
/// Send a message. The recipient's role is read at send time so the thread
/// query stays correct even if the recipient was promoted or demoted since.
pub async fn send_message(
    State(state): State<AppState>,
    RequireUser(user): RequireUser,
    Json(input): Json<CreateMessage>,
) -> AppResult<(StatusCode, Json<Message>)> {
    if input.content.trim().is_empty() {
        return Err(AppError::Core(CoreError::Validation(
            "Message content must not be empty".into(),
        )));
    }

    let recipient = AccountRepo::find_by_id(&state.pool, input.to_account_id)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound {
            entity: "account",
            id: input.to_account_id,
        }))?;

    let message = MessageRepo::create(
        &state.pool,
        user.account_id,
        &user.role,
        recipient.id,
        &recipient.role,
        input.content.trim(),
    )
    .await?;

    Ok((StatusCode::CREATED, Json(message)))
}

//! Handlers for the `/account` resource (self-service credential changes).

use axum::extract::State;
use axum::http::StatusCode;
use axum::Json;
use beehive_core::auth::AuthFailure;
use beehive_core::error::CoreError;
use beehive_core::validation::{is_valid_email, is_valid_username};
use beehive_db::repositories::AccountRepo;
use serde::Deserialize;

use crate::auth::password::{hash_secret, validate_password_strength, verify_secret};
use crate::error::{AppError, AppResult};
use crate::handlers::auth::MIN_PASSWORD_LENGTH;
use crate::middleware::rbac::RequireUser;
use crate::state::AppState;

/// Request body for `POST /account/change-password`.
#[derive(Debug, Deserialize)]
pub struct ChangePasswordRequest {
    pub current_password: String,
    pub new_password: String,
}

/// Request body for `POST /account/change-username`.
#[derive(Debug, Deserialize)]
pub struct ChangeUsernameRequest {
    pub username: String,
}

/// Request body for `POST /account/change-email`.
#[derive(Debug, Deserialize)]
pub struct ChangeEmailRequest {
    pub email: String,
}

/// POST /api/v1/account/change-password
///
/// The current password is re-verified even though the caller holds a valid
/// session, so a hijacked session cannot silently rotate the credential.
pub async fn change_password(
    State(state): State<AppState>,
    RequireUser(user): RequireUser,
    Json(input): Json<ChangePasswordRequest>,
) -> AppResult<StatusCode> {
    let account = AccountRepo::find_by_id(&state.pool, user.account_id)
        .await?
        .ok_or(AppError::Auth(AuthFailure::InvalidToken))?;

    let Some(hash) = account.password_hash.as_deref() else {
        return Err(AppError::Auth(AuthFailure::WrongMethod));
    };

    let matches = verify_secret(&input.current_password, hash).map_err(|e| {
        tracing::error!(account_id = account.id, error = %e, "Stored password hash is unreadable");
        AppError::Auth(AuthFailure::InvalidCredentials)
    })?;
    if !matches {
        return Err(AppError::Auth(AuthFailure::InvalidCredentials));
    }

    validate_password_strength(&input.new_password, MIN_PASSWORD_LENGTH)
        .map_err(|msg| AppError::Core(CoreError::Validation(msg)))?;

    let new_hash = hash_secret(&input.new_password)
        .map_err(|e| AppError::InternalError(format!("Password hashing error: {e}")))?;
    AccountRepo::update_password_hash(&state.pool, account.id, &new_hash).await?;

    tracing::info!(account_id = account.id, "Password changed");
    Ok(StatusCode::NO_CONTENT)
}

/// POST /api/v1/account/change-username
pub async fn change_username(
    State(state): State<AppState>,
    RequireUser(user): RequireUser,
    Json(input): Json<ChangeUsernameRequest>,
) -> AppResult<StatusCode> {
    if !is_valid_username(&input.username) {
        return Err(AppError::Core(CoreError::Validation(
            "Username must be 4-25 characters (letters, digits, '_', '.', '-')".into(),
        )));
    }

    if let Some(existing) = AccountRepo::find_by_username(&state.pool, &input.username).await? {
        if existing.id != user.account_id {
            return Err(AppError::Core(CoreError::Conflict(
                "Username is already taken".into(),
            )));
        }
    }

    AccountRepo::update_username(&state.pool, user.account_id, &input.username).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// POST /api/v1/account/change-email
pub async fn change_email(
    State(state): State<AppState>,
    RequireUser(user): RequireUser,
    Json(input): Json<ChangeEmailRequest>,
) -> AppResult<StatusCode> {
    if !is_valid_email(&input.email) {
        return Err(AppError::Core(CoreError::Validation(
            "Invalid email address".into(),
        )));
    }

    if let Some(existing) = AccountRepo::find_by_email(&state.pool, &input.email).await? {
        if existing.id != user.account_id {
            return Err(AppError::Core(CoreError::Conflict(
                "An account with this email already exists".into(),
            )));
        }
    }

    AccountRepo::update_email(&state.pool, user.account_id, &input.email).await?;
    Ok(StatusCode::NO_CONTENT)
}

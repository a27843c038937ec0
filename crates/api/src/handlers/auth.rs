//! Handlers for the `/auth` resource (register, login, refresh, logout,
//! password recovery).

use axum::extract::State;
use axum::http::StatusCode;
use axum::Json;
use beehive_core::auth::{AuthFailure, Credential};
use beehive_core::error::CoreError;
use beehive_core::roles::ROLE_USER;
use beehive_core::types::DbId;
use beehive_core::validation::{is_valid_email, is_valid_username};
use beehive_db::models::account::{Account, CreateAccount};
use beehive_db::models::session::CreateSession;
use beehive_db::repositories::{AccountRepo, SessionRepo};
use chrono::Utc;
use serde::{Deserialize, Serialize};

use crate::auth::password::{hash_secret, validate_password_strength, verify_secret};
use crate::auth::resolver::{resolve_credential, Resolved};
use crate::auth::token::{generate_refresh_token, generate_session_token, hash_refresh_token};
use crate::error::{AppError, AppResult};
use crate::middleware::auth::CurrentUser;
use crate::state::AppState;

/// Minimum password length for registration and resets.
pub const MIN_PASSWORD_LENGTH: usize = 8;

// ---------------------------------------------------------------------------
// Request / response types
// ---------------------------------------------------------------------------

/// Request body for `POST /auth/register`.
#[derive(Debug, Deserialize)]
pub struct RegisterRequest {
    pub username: String,
    pub email: String,
    pub password: String,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    /// Optional recovery question; if present, `security_answer` is required.
    pub security_question: Option<String>,
    pub security_answer: Option<String>,
}

/// Request body for `POST /auth/login`.
#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub username: String,
    pub password: String,
}

/// Request body for `POST /auth/refresh`.
#[derive(Debug, Deserialize)]
pub struct RefreshRequest {
    pub refresh_token: String,
}

/// Request body for `POST /auth/forgot-password`.
#[derive(Debug, Deserialize)]
pub struct ForgotPasswordRequest {
    pub username: String,
    pub security_answer: String,
    pub new_password: String,
}

/// Successful authentication response returned by login, refresh, and the
/// OAuth flows.
#[derive(Debug, Serialize)]
pub struct AuthResponse {
    pub access_token: String,
    pub refresh_token: String,
    /// Access token lifetime in seconds.
    pub expires_in: i64,
    pub user: UserInfo,
}

/// Public user info embedded in [`AuthResponse`].
#[derive(Debug, Serialize)]
pub struct UserInfo {
    pub id: DbId,
    pub username: String,
    pub email: String,
    pub role: String,
}

// ---------------------------------------------------------------------------
// Handlers
// ---------------------------------------------------------------------------

/// POST /api/v1/auth/register
///
/// Create a local password account. Returns 201 with tokens, so the client
/// does not need a second login round-trip.
pub async fn register(
    State(state): State<AppState>,
    Json(input): Json<RegisterRequest>,
) -> AppResult<(StatusCode, Json<AuthResponse>)> {
    if !is_valid_username(&input.username) {
        return Err(AppError::Core(CoreError::Validation(
            "Username must be 4-25 characters (letters, digits, '_', '.', '-')".into(),
        )));
    }
    if !is_valid_email(&input.email) {
        return Err(AppError::Core(CoreError::Validation(
            "Invalid email address".into(),
        )));
    }
    validate_password_strength(&input.password, MIN_PASSWORD_LENGTH)
        .map_err(|msg| AppError::Core(CoreError::Validation(msg)))?;

    if input.security_question.is_some() != input.security_answer.is_some() {
        return Err(AppError::Core(CoreError::Validation(
            "Security question and answer must be provided together".into(),
        )));
    }

    // Friendly pre-checks; the unique constraints still win any race.
    if AccountRepo::find_by_username(&state.pool, &input.username)
        .await?
        .is_some()
    {
        return Err(AppError::Core(CoreError::Conflict(
            "Username is already taken".into(),
        )));
    }
    if AccountRepo::find_by_email(&state.pool, &input.email)
        .await?
        .is_some()
    {
        return Err(AppError::Core(CoreError::Conflict(
            "An account with this email already exists".into(),
        )));
    }

    let password_hash = hash_secret(&input.password)
        .map_err(|e| AppError::InternalError(format!("Password hashing error: {e}")))?;
    let security_answer_hash = match &input.security_answer {
        Some(answer) => Some(
            hash_secret(&answer.trim().to_lowercase())
                .map_err(|e| AppError::InternalError(format!("Answer hashing error: {e}")))?,
        ),
        None => None,
    };

    let account = AccountRepo::create(
        &state.pool,
        &CreateAccount {
            username: input.username,
            email: input.email,
            password_hash: Some(password_hash),
            external_id: None,
            role: ROLE_USER.to_string(),
            first_name: input.first_name,
            last_name: input.last_name,
            security_question: input.security_question,
            security_answer_hash,
        },
    )
    .await?;

    tracing::info!(account_id = account.id, "Registered new local account");

    let response = create_auth_response(&state, &account).await?;
    Ok((StatusCode::CREATED, Json(response)))
}

/// POST /api/v1/auth/login
///
/// Authenticate with username + password. Returns access and refresh tokens.
pub async fn login(
    State(state): State<AppState>,
    Json(input): Json<LoginRequest>,
) -> AppResult<Json<AuthResponse>> {
    let resolved = resolve_credential(
        &state.pool,
        &state.config,
        state.oidc.as_deref(),
        Credential::Password {
            username: input.username,
            password: input.password,
        },
    )
    .await?;

    let Resolved::Account(account) = resolved else {
        return Err(AppError::InternalError(
            "Password resolution produced a non-account outcome".into(),
        ));
    };

    AccountRepo::record_login(&state.pool, account.id).await?;

    let response = create_auth_response(&state, &account).await?;
    Ok(Json(response))
}

/// POST /api/v1/auth/refresh
///
/// Exchange a valid refresh token for new access + refresh tokens. The old
/// session is revoked (rotation), and the new session handle carries the
/// account's *current* role, not the one at original login.
pub async fn refresh(
    State(state): State<AppState>,
    Json(input): Json<RefreshRequest>,
) -> AppResult<Json<AuthResponse>> {
    let token_hash = hash_refresh_token(&input.refresh_token);

    let session = SessionRepo::find_by_refresh_token_hash(&state.pool, &token_hash)
        .await?
        .ok_or(AppError::Auth(AuthFailure::InvalidToken))?;

    SessionRepo::revoke(&state.pool, session.id).await?;

    let account = AccountRepo::find_by_id(&state.pool, session.account_id)
        .await?
        .ok_or(AppError::Auth(AuthFailure::InvalidToken))?;

    if !account.is_active {
        return Err(AppError::Auth(AuthFailure::Forbidden));
    }

    let response = create_auth_response(&state, &account).await?;
    Ok(Json(response))
}

/// POST /api/v1/auth/logout
///
/// Revoke all sessions for the authenticated caller. Returns 204 No Content.
pub async fn logout(State(state): State<AppState>, user: CurrentUser) -> AppResult<StatusCode> {
    SessionRepo::revoke_all_for_account(&state.pool, user.account_id).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// POST /api/v1/auth/forgot-password
///
/// Security-question password reset. On a correct answer the password hash
/// is replaced and every session for the account is revoked, so a stolen
/// session does not survive a legitimate reset.
pub async fn forgot_password(
    State(state): State<AppState>,
    Json(input): Json<ForgotPasswordRequest>,
) -> AppResult<StatusCode> {
    let account = AccountRepo::find_by_username(&state.pool, &input.username)
        .await?
        .ok_or(AppError::Auth(AuthFailure::NotFound))?;

    // OAuth-only accounts and accounts that never set a question have
    // nothing to recover with.
    let Some(answer_hash) = account.security_answer_hash.as_deref() else {
        return Err(AppError::Auth(AuthFailure::WrongMethod));
    };

    let answer = input.security_answer.trim().to_lowercase();
    let matches = verify_secret(&answer, answer_hash).map_err(|e| {
        tracing::error!(account_id = account.id, error = %e, "Stored answer hash is unreadable");
        AppError::Auth(AuthFailure::WrongAnswer)
    })?;
    if !matches {
        tracing::warn!(account_id = account.id, "Password recovery with wrong answer");
        return Err(AppError::Auth(AuthFailure::WrongAnswer));
    }

    validate_password_strength(&input.new_password, MIN_PASSWORD_LENGTH)
        .map_err(|msg| AppError::Core(CoreError::Validation(msg)))?;

    let new_hash = hash_secret(&input.new_password)
        .map_err(|e| AppError::InternalError(format!("Password hashing error: {e}")))?;
    AccountRepo::update_password_hash(&state.pool, account.id, &new_hash).await?;

    let revoked = SessionRepo::revoke_all_for_account(&state.pool, account.id).await?;
    tracing::info!(
        account_id = account.id,
        revoked_sessions = revoked,
        "Password reset via security question"
    );

    Ok(StatusCode::NO_CONTENT)
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

/// Generate access + refresh tokens, persist a session row, and build the
/// response. Shared by the password and OAuth login paths.
pub(crate) async fn create_auth_response(
    state: &AppState,
    account: &Account,
) -> AppResult<AuthResponse> {
    let access_token = generate_session_token(account.id, &account.role, &state.config.session)
        .map_err(|e| AppError::InternalError(format!("Token generation error: {e}")))?;

    let (refresh_plaintext, refresh_hash) = generate_refresh_token();

    let expires_at =
        Utc::now() + chrono::Duration::days(state.config.session.refresh_token_expiry_days);

    SessionRepo::create(
        &state.pool,
        &CreateSession {
            account_id: account.id,
            refresh_token_hash: refresh_hash,
            role_at_login: account.role.clone(),
            expires_at,
        },
    )
    .await?;

    let expires_in = state.config.session.access_token_expiry_mins * 60;

    Ok(AuthResponse {
        access_token,
        refresh_token: refresh_plaintext,
        expires_in,
        user: UserInfo {
            id: account.id,
            username: account.username.clone(),
            email: account.email.clone(),
            role: account.role.clone(),
        },
    })
}

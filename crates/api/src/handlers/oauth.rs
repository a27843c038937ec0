//! Handlers for the Google SSO flow (`/auth/google*`).
//!
//! The handshake is stateless on the server process: the CSRF state, nonce,
//! and PKCE verifier live in the `oauth_states` table between the redirect
//! and the callback, and are consumed exactly once.

use std::sync::Arc;

use axum::extract::{Query, State};
use axum::http::StatusCode;
use axum::response::Redirect;
use axum::Json;
use beehive_core::auth::{AuthFailure, Credential};
use beehive_core::error::CoreError;
use beehive_core::validation::is_valid_username;
use beehive_db::repositories::{AccountRepo, OAuthStateRepo};
use serde::{Deserialize, Serialize};

use crate::auth::oidc::OidcClient;
use crate::auth::resolver::{
    complete_external_registration, resolve_credential, resolve_external, Resolved,
};
use crate::error::{AppError, AppResult};
use crate::handlers::auth::{create_auth_response, AuthResponse};
use crate::state::AppState;

// ---------------------------------------------------------------------------
// Request / response types
// ---------------------------------------------------------------------------

/// Query parameters Google sends to the callback.
#[derive(Debug, Deserialize)]
pub struct CallbackParams {
    pub code: String,
    pub state: String,
}

/// Request body for `POST /auth/google/register`.
#[derive(Debug, Deserialize)]
pub struct CompleteRegistrationRequest {
    pub external_id: String,
    pub username: String,
}

/// Request body for `POST /auth/google/token`.
#[derive(Debug, Deserialize)]
pub struct GoogleTokenRequest {
    pub id_token: String,
}

/// Callback outcome: either a normal login or a parked registration.
#[derive(Debug, Serialize)]
#[serde(untagged)]
pub enum CallbackResponse {
    LoggedIn(AuthResponse),
    RegistrationRequired {
        registration_required: bool,
        external_id: String,
        email: String,
        given_name: Option<String>,
        family_name: Option<String>,
    },
}

// ---------------------------------------------------------------------------
// Handlers
// ---------------------------------------------------------------------------

/// GET /api/v1/auth/google
///
/// Persist handshake state and redirect the browser to Google.
pub async fn google_start(State(state): State<AppState>) -> AppResult<Redirect> {
    let oidc = require_oidc(&state)?;

    let (auth_url, handshake) = oidc.authorization_url();

    OAuthStateRepo::insert(
        &state.pool,
        &handshake.state,
        &handshake.nonce,
        &handshake.pkce_verifier,
    )
    .await?;

    Ok(Redirect::temporary(&auth_url))
}

/// GET /api/v1/auth/google/callback
///
/// Consume the handshake state, exchange the code, and resolve the verified
/// identity. An unknown identity gets a 200 with `registration_required`,
/// never a silently created account.
pub async fn google_callback(
    State(state): State<AppState>,
    Query(params): Query<CallbackParams>,
) -> AppResult<Json<CallbackResponse>> {
    let oidc = require_oidc(&state)?;

    // Single-use: a replayed callback with the same state finds nothing.
    let handshake = OAuthStateRepo::take(&state.pool, &params.state)
        .await?
        .ok_or(AppError::Auth(AuthFailure::InvalidToken))?;

    // The code exchange already binds the token to this handshake's nonce,
    // so the verified claims resolve directly.
    let claims = oidc
        .exchange_code(&params.code, &handshake.nonce, &handshake.pkce_verifier)
        .await?;

    let resolved = resolve_external(&state.pool, &state.config, &claims).await?;
    login_or_park(&state, resolved).await
}

/// POST /api/v1/auth/google/token
///
/// API-style login with a Google ID token obtained client-side, without the
/// redirect handshake. The token's signature, audience, and expiry are
/// verified before resolution.
pub async fn google_token_login(
    State(state): State<AppState>,
    Json(input): Json<GoogleTokenRequest>,
) -> AppResult<Json<CallbackResponse>> {
    // Checked up front for a clear message when SSO is off.
    require_oidc(&state)?;

    let resolved = resolve_credential(
        &state.pool,
        &state.config,
        state.oidc.as_deref(),
        Credential::ExternalToken {
            id_token: input.id_token,
        },
    )
    .await?;

    login_or_park(&state, resolved).await
}

/// Shared outcome handling for the two SSO login paths.
async fn login_or_park(
    state: &AppState,
    resolved: Resolved,
) -> AppResult<Json<CallbackResponse>> {
    match resolved {
        Resolved::Account(account) => {
            AccountRepo::record_login(&state.pool, account.id).await?;
            let response = create_auth_response(state, &account).await?;
            Ok(Json(CallbackResponse::LoggedIn(response)))
        }
        Resolved::RegistrationRequired(pending) => {
            Ok(Json(CallbackResponse::RegistrationRequired {
                registration_required: true,
                external_id: pending.external_id,
                email: pending.email,
                given_name: pending.given_name,
                family_name: pending.family_name,
            }))
        }
        Resolved::Session(_) => Err(AppError::InternalError(
            "External resolution produced a session outcome".into(),
        )),
    }
}

/// POST /api/v1/auth/google/register
///
/// Claim a parked registration with a chosen username. The identity was
/// verified at callback time; this step never re-verifies a token.
pub async fn google_register(
    State(state): State<AppState>,
    Json(input): Json<CompleteRegistrationRequest>,
) -> AppResult<(StatusCode, Json<AuthResponse>)> {
    if !is_valid_username(&input.username) {
        return Err(AppError::Core(CoreError::Validation(
            "Username must be 4-25 characters (letters, digits, '_', '.', '-')".into(),
        )));
    }
    if AccountRepo::find_by_username(&state.pool, &input.username)
        .await?
        .is_some()
    {
        return Err(AppError::Core(CoreError::Conflict(
            "Username is already taken".into(),
        )));
    }

    let account = complete_external_registration(
        &state.pool,
        &state.config,
        &input.external_id,
        &input.username,
    )
    .await?;

    tracing::info!(account_id = account.id, "Completed external registration");

    AccountRepo::record_login(&state.pool, account.id).await?;
    let response = create_auth_response(&state, &account).await?;
    Ok((StatusCode::CREATED, Json(response)))
}

fn require_oidc(state: &AppState) -> Result<Arc<OidcClient>, AppError> {
    state
        .oidc
        .clone()
        .ok_or_else(|| AppError::BadRequest("Google Sign-In is not configured".into()))
}

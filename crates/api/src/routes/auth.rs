//! Route definitions for the `/auth` resource.

use axum::routing::{get, post};
use axum::Router;

use crate::handlers::{auth, oauth};
use crate::state::AppState;

/// Routes mounted at `/auth`.
///
/// ```text
/// POST /register         -> register
/// POST /login            -> login
/// POST /refresh          -> refresh
/// POST /logout           -> logout (requires auth)
/// POST /forgot-password  -> forgot_password
/// GET  /google           -> google_start
/// GET  /google/callback  -> google_callback
/// POST /google/token     -> google_token_login
/// POST /google/register  -> google_register
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/register", post(auth::register))
        .route("/login", post(auth::login))
        .route("/refresh", post(auth::refresh))
        .route("/logout", post(auth::logout))
        .route("/forgot-password", post(auth::forgot_password))
        .route("/google", get(oauth::google_start))
        .route("/google/callback", get(oauth::google_callback))
        .route("/google/token", post(oauth::google_token_login))
        .route("/google/register", post(oauth::google_register))
}

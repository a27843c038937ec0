//! Route definitions for the `/account` resource.

use axum::routing::post;
use axum::Router;

use crate::handlers::account;
use crate::state::AppState;

/// Routes mounted at `/account`. All require authentication.
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/change-password", post(account::change_password))
        .route("/change-username", post(account::change_username))
        .route("/change-email", post(account::change_email))
}

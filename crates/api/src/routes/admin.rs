//! Route definitions for the `/admin` resource.

use axum::routing::{get, put};
use axum::Router;

use crate::handlers::admin;
use crate::state::AppState;

/// Routes mounted at `/admin`. Every handler authorizes through the
/// fresh-role `RequireAdmin` extractor.
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/users", get(admin::list_users))
        .route("/users/{id}/media", get(admin::user_media))
        .route("/users/{id}/role", put(admin::update_role))
        .route("/notifications", get(admin::notifications))
}

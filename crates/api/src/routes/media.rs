//! Route definitions for the `/media` resource.

use axum::routing::{get, put};
use axum::Router;

use crate::handlers::media;
use crate::state::AppState;

/// Routes mounted at `/media`. All require authentication and are scoped to
/// the caller's own items.
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(media::list_media).post(media::create_media))
        .route("/{id}", put(media::update_media).delete(media::delete_media))
}

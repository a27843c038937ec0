//! Route definitions for the `/chat` resource.

use axum::routing::get;
use axum::Router;

use crate::handlers::chat;
use crate::state::AppState;

/// Routes mounted at `/chat`. All require authentication.
pub fn router() -> Router<AppState> {
    Router::new().route("/messages", get(chat::list_messages).post(chat::send_message))
}

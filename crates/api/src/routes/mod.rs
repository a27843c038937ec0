pub mod account;
pub mod admin;
pub mod auth;
pub mod chat;
pub mod health;
pub mod media;

use axum::Router;

use crate::state::AppState;

/// Build the `/api/v1` route tree.
///
/// Route hierarchy:
///
/// ```text
/// /auth/register                 local registration (public)
/// /auth/login                    password login (public)
/// /auth/refresh                  refresh rotation (public)
/// /auth/logout                   revoke sessions (requires auth)
/// /auth/forgot-password          security-question reset (public)
/// /auth/google                   redirect to Google (public)
/// /auth/google/callback          code exchange (public)
/// /auth/google/register          complete pending registration (public)
///
/// /account/change-password       (requires auth)
/// /account/change-username       (requires auth)
/// /account/change-email          (requires auth)
///
/// /media                         create, list own (requires auth)
/// /media/{id}                    edit, delete own (requires auth)
///
/// /chat/messages                 thread, send (requires auth)
///
/// /admin/users                   list accounts (admin, fresh role)
/// /admin/users/{id}/media        a user's uploads (admin, fresh role)
/// /admin/users/{id}/role         update role (admin, fresh role)
/// /admin/notifications           unseen uploads, ?mark_seen (admin, fresh role)
/// ```
pub fn api_routes() -> Router<AppState> {
    Router::new()
        // Authentication: local, SSO, recovery.
        .nest("/auth", auth::router())
        // Self-service credential changes.
        .nest("/account", account::router())
        // Upload metadata.
        .nest("/media", media::router())
        // User <-> admin messaging.
        .nest("/chat", chat::router())
        // Privileged operations; every handler re-reads the caller's role.
        .nest("/admin", admin::router())
}

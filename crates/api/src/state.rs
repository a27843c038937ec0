use std::sync::Arc;

use crate::auth::oidc::OidcClient;
use crate::config::ServerConfig;

/// Shared application state available to all Axum handlers via `State<AppState>`.
///
/// This is cheaply cloneable (inner data is behind `Arc`). There are no
/// process-wide singletons: everything a handler touches is initialized at
/// startup and injected here.
#[derive(Clone)]
pub struct AppState {
    /// Database connection pool.
    pub pool: beehive_db::DbPool,
    /// Server configuration.
    pub config: Arc<ServerConfig>,
    /// Google SSO client; `None` when SSO is not configured.
    pub oidc: Option<Arc<OidcClient>>,
}

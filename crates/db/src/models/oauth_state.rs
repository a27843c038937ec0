//! Transient OAuth handshake state.

use beehive_core::types::Timestamp;
use sqlx::FromRow;

/// One in-flight authorization redirect, keyed by the `state` nonce the
/// provider echoes back. Single-use: consumed (deleted) on callback.
#[derive(Debug, Clone, FromRow)]
pub struct OAuthState {
    pub state: String,
    pub nonce: String,
    pub pkce_verifier: String,
    pub created_at: Timestamp,
    pub expires_at: Timestamp,
}

//! Bearer-assertion authentication extractor for Axum handlers.

use axum::extract::FromRequestParts;
use axum::http::request::Parts;
use beehive_core::auth::{AuthFailure, Credential};
use beehive_core::types::DbId;

use crate::auth::resolver::{resolve_credential, Resolved};
use crate::error::AppError;
use crate::state::AppState;

/// Authenticated caller extracted from a bearer assertion in the
/// `Authorization` header.
///
/// Use this as an extractor parameter in any handler that requires
/// authentication:
///
/// ```ignore
/// async fn my_handler(user: CurrentUser) -> AppResult<Json<()>> {
///     tracing::info!(account_id = user.account_id, "handling request");
///     Ok(Json(()))
/// }
/// ```
///
/// The `role` field is the login-time snapshot from the assertion. It is
/// fine for non-privileged paths; privileged handlers must go through
/// [`RequireAdmin`](crate::middleware::rbac::RequireAdmin), which re-reads
/// the current role.
#[derive(Debug, Clone)]
pub struct CurrentUser {
    /// The account's internal database id (from `claims.sub`).
    pub account_id: DbId,
    /// Role snapshot at login time. Advisory only.
    pub role: String,
}

impl FromRequestParts<AppState> for CurrentUser {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let auth_header = parts
            .headers
            .get("authorization")
            .and_then(|v| v.to_str().ok())
            .ok_or(AppError::Auth(AuthFailure::Unauthenticated))?;

        // A present-but-malformed header is a malformed credential, not an
        // anonymous caller.
        let token = auth_header
            .strip_prefix("Bearer ")
            .ok_or(AppError::Auth(AuthFailure::InvalidToken))?;

        let resolved = resolve_credential(
            &state.pool,
            &state.config,
            state.oidc.as_deref(),
            Credential::BearerAssertion {
                token: token.to_string(),
            },
        )
        .await?;

        let Resolved::Session(claims) = resolved else {
            return Err(AppError::Auth(AuthFailure::InvalidToken));
        };

        Ok(CurrentUser {
            account_id: claims.sub,
            role: claims.role,
        })
    }
}

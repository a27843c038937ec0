//! Role-based access control extractors.
//!
//! [`RequireUser`] checks the role snapshot carried in the bearer
//! assertion. [`RequireAdmin`] does not: privileged operations always
//! re-read the account's current role from the store, so a demotion takes
//! effect on the very next privileged request even while old assertions
//! are still circulating.

use axum::extract::FromRequestParts;
use axum::http::request::Parts;
use beehive_core::auth::{decide, AuthFailure};
use beehive_core::roles::{ROLE_ADMIN, ROLE_USER};

use super::auth::CurrentUser;
use crate::auth::resolver::authorize_privileged;
use crate::error::AppError;
use crate::state::AppState;

/// Requires any authenticated, role-satisfying user.
///
/// Trusts the login-time role snapshot -- acceptable for operations scoped
/// to the caller's own data.
///
/// ```ignore
/// async fn my_media(RequireUser(user): RequireUser) -> AppResult<Json<()>> {
///     Ok(Json(()))
/// }
/// ```
pub struct RequireUser(pub CurrentUser);

impl FromRequestParts<AppState> for RequireUser {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let user = CurrentUser::from_request_parts(parts, state).await?;
        let decision = decide(user.account_id, ROLE_USER, &user.role, true);
        if !decision.allowed {
            return Err(AppError::Auth(AuthFailure::Forbidden));
        }
        Ok(RequireUser(user))
    }
}

/// Requires the `admin` role, verified against the store on every request.
///
/// The snapshot in the assertion is ignored for the decision; only the
/// current stored role counts. A stale assertion for a deleted account is
/// rejected as an invalid token.
///
/// ```ignore
/// async fn admin_only(RequireAdmin(user): RequireAdmin) -> AppResult<Json<()>> {
///     // user's stored role is admin as of this request
///     Ok(Json(()))
/// }
/// ```
pub struct RequireAdmin(pub CurrentUser);

impl FromRequestParts<AppState> for RequireAdmin {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let user = CurrentUser::from_request_parts(parts, state).await?;

        let decision = authorize_privileged(&state.pool, user.account_id, ROLE_ADMIN).await?;
        if !decision.allowed {
            tracing::warn!(
                account_id = user.account_id,
                reason = decision.reason,
                "Privileged request denied"
            );
            return Err(AppError::Auth(AuthFailure::Forbidden));
        }

        // Carry the *current* role forward, not the snapshot.
        Ok(RequireAdmin(CurrentUser {
            account_id: user.account_id,
            role: decision.role,
        }))
    }
}

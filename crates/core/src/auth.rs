//! The credential and authorization decision model.
//!
//! Three credential schemes coexist in Beehive: local password, a
//! Google-issued ID token, and a bearer session assertion. They are modelled
//! as one tagged union so every request path handles each scheme explicitly;
//! there is no fallthrough that treats an unrecognized credential as an
//! anonymous caller.

use serde::{Deserialize, Serialize};

use crate::roles::role_satisfies;
use crate::types::DbId;

/// A credential presented by a request, before verification.
#[derive(Debug, Clone)]
pub enum Credential {
    /// Local username + plaintext password.
    Password { username: String, password: String },
    /// Raw provider-issued ID token (signature not yet checked).
    ExternalToken { id_token: String },
    /// Opaque bearer assertion from the `Authorization` header.
    BearerAssertion { token: String },
}

/// Claims extracted from a *verified* external identity token.
///
/// Constructing this type asserts that the token's signature and audience
/// have already been checked; the resolver never builds one from unverified
/// input.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VerifiedClaims {
    /// Provider subject id (e.g. the Google `sub` claim).
    pub subject: String,
    pub email: String,
    pub given_name: Option<String>,
    pub family_name: Option<String>,
}

impl VerifiedClaims {
    /// Display name assembled from the name claims, falling back to the
    /// email's local part.
    pub fn display_name(&self) -> String {
        let full = format!(
            "{} {}",
            self.given_name.as_deref().unwrap_or(""),
            self.family_name.as_deref().unwrap_or("")
        );
        let full = full.trim();
        if full.is_empty() {
            self.email
                .split('@')
                .next()
                .unwrap_or(&self.email)
                .to_string()
        } else {
            full.to_string()
        }
    }
}

/// Why a verification or authorization attempt failed.
///
/// Every failure is one of these variants, never a bare boolean, so the HTTP
/// layer can produce the right user-facing message without conflating "wrong
/// password" with "no such account".
#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum AuthFailure {
    /// No account matches the presented identifier.
    #[error("account not found")]
    NotFound,

    /// The account exists but does not support this credential scheme
    /// (e.g. password login against an OAuth-only account).
    #[error("account uses a different sign-in method")]
    WrongMethod,

    /// The password did not match the stored hash.
    #[error("invalid credentials")]
    InvalidCredentials,

    /// A bearer or external token was malformed, unsigned, expired, or
    /// failed signature/audience verification. Always fatal to the request.
    #[error("invalid token")]
    InvalidToken,

    /// Security-question recovery: the answer did not match.
    #[error("incorrect security answer")]
    WrongAnswer,

    /// A verified external identity has no account yet; the caller must
    /// complete registration explicitly.
    #[error("registration required")]
    RegistrationRequired,

    /// Authenticated, but the resolved role does not permit the operation.
    #[error("forbidden")]
    Forbidden,

    /// No usable credential was presented.
    #[error("unauthenticated")]
    Unauthenticated,

    /// The identity store could not be reached. Distinct from [`NotFound`]:
    /// a connectivity failure must never read as "no such account".
    ///
    /// [`NotFound`]: AuthFailure::NotFound
    #[error("identity store unavailable")]
    StoreUnavailable,
}

/// Output of the role resolution step.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthorizationDecision {
    pub account_id: DbId,
    /// The role the decision was made against.
    pub role: String,
    pub allowed: bool,
    pub reason: &'static str,
}

impl AuthorizationDecision {
    pub fn allow(account_id: DbId, role: &str) -> Self {
        Self {
            account_id,
            role: role.to_string(),
            allowed: true,
            reason: "role requirement met",
        }
    }

    pub fn deny(account_id: DbId, role: &str, reason: &'static str) -> Self {
        Self {
            account_id,
            role: role.to_string(),
            allowed: false,
            reason,
        }
    }
}

/// Decide whether an account with `actual_role` may perform an operation
/// requiring `required_role`.
///
/// Pure and idempotent: the same inputs always yield the same decision.
/// Deactivated accounts are denied regardless of role. Callers are
/// responsible for passing the *current* role for privileged operations
/// (see the fresh-read rule in the api crate's `RequireAdmin`).
pub fn decide(
    account_id: DbId,
    required_role: &str,
    actual_role: &str,
    is_active: bool,
) -> AuthorizationDecision {
    if !is_active {
        return AuthorizationDecision::deny(account_id, actual_role, "account deactivated");
    }
    if role_satisfies(required_role, actual_role) {
        AuthorizationDecision::allow(account_id, actual_role)
    } else {
        AuthorizationDecision::deny(account_id, actual_role, "insufficient role")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::roles::{ROLE_ADMIN, ROLE_USER};

    #[test]
    fn decide_allows_matching_role() {
        let d = decide(7, ROLE_USER, ROLE_USER, true);
        assert!(d.allowed);
        assert_eq!(d.account_id, 7);
    }

    #[test]
    fn decide_denies_user_for_admin_operation() {
        let d = decide(7, ROLE_ADMIN, ROLE_USER, true);
        assert!(!d.allowed);
        assert_eq!(d.reason, "insufficient role");
    }

    #[test]
    fn decide_denies_deactivated_account_even_if_admin() {
        let d = decide(7, ROLE_ADMIN, ROLE_ADMIN, false);
        assert!(!d.allowed);
        assert_eq!(d.reason, "account deactivated");
    }

    #[test]
    fn decide_is_idempotent() {
        let a = decide(42, ROLE_ADMIN, ROLE_ADMIN, true);
        let b = decide(42, ROLE_ADMIN, ROLE_ADMIN, true);
        assert_eq!(a, b);
    }

    #[test]
    fn display_name_prefers_name_claims() {
        let claims = VerifiedClaims {
            subject: "g-42".into(),
            email: "ada@example.com".into(),
            given_name: Some("Ada".into()),
            family_name: Some("Lovelace".into()),
        };
        assert_eq!(claims.display_name(), "Ada Lovelace");
    }

    #[test]
    fn display_name_falls_back_to_email_local_part() {
        let claims = VerifiedClaims {
            subject: "g-42".into(),
            email: "ada@example.com".into(),
            given_name: None,
            family_name: None,
        };
        assert_eq!(claims.display_name(), "ada");
    }
}

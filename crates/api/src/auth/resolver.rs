//! The access control resolver.
//!
//! Every presented credential passes through [`resolve_credential`], which
//! dispatches exhaustively over the credential scheme. There is no default
//! arm: a credential that is not recognized is a type error, not an
//! anonymous caller.
//!
//! Store connectivity failures are mapped to
//! [`AuthFailure::StoreUnavailable`] here, at the lowest level, so a
//! database outage can never masquerade as "no such account".

use beehive_core::auth::{
    decide, AuthFailure, AuthorizationDecision, Credential, VerifiedClaims,
};
use beehive_core::roles::{ROLE_ADMIN, ROLE_USER};
use beehive_core::types::DbId;
use beehive_db::models::account::{Account, CreateAccount};
use beehive_db::models::pending_registration::PendingRegistration;
use beehive_db::repositories::{AccountRepo, PendingRegistrationRepo};
use beehive_db::DbPool;

use crate::auth::oidc::OidcClient;
use crate::auth::password::verify_secret;
use crate::auth::token::{validate_bearer, Claims};
use crate::config::ServerConfig;

/// Successful output of credential resolution.
#[derive(Debug)]
pub enum Resolved {
    /// A fully verified account (password or external-token login).
    Account(Account),
    /// A verified bearer assertion; carries the login-time claims snapshot.
    Session(Claims),
    /// The external identity verified but has no account yet; the caller
    /// must complete registration explicitly.
    RegistrationRequired(PendingRegistration),
}

/// Map a store error to the resolver taxonomy.
///
/// Everything becomes [`AuthFailure::StoreUnavailable`]: from the caller's
/// point of view the identity store did not answer, and the distinction
/// from "account not found" is exactly what this variant preserves.
fn store_failure(err: sqlx::Error) -> AuthFailure {
    tracing::error!(error = %err, "Identity store error during resolution");
    AuthFailure::StoreUnavailable
}

/// Resolve a presented credential to a verified identity.
///
/// Dispatch is exhaustive over the three schemes:
///
/// - `Password` verifies against the stored Argon2id hash.
/// - `ExternalToken` verifies the Google ID token (signature, audience,
///   expiry) and then matches or parks the identity.
/// - `BearerAssertion` validates the session handle's signature and expiry.
///
/// Accounts whose email is on the admin allow-list are elevated after
/// verification succeeds, uniformly across both login schemes.
pub async fn resolve_credential(
    pool: &DbPool,
    config: &ServerConfig,
    oidc: Option<&OidcClient>,
    credential: Credential,
) -> Result<Resolved, AuthFailure> {
    match credential {
        Credential::Password { username, password } => {
            let account = verify_password_login(pool, &username, &password).await?;
            let account = apply_admin_allowlist(pool, config, account).await?;
            Ok(Resolved::Account(account))
        }
        Credential::ExternalToken { id_token } => {
            // SSO disabled means this scheme simply does not exist here.
            let oidc = oidc.ok_or(AuthFailure::WrongMethod)?;
            let claims = oidc.verify_id_token(&id_token)?;
            resolve_external(pool, config, &claims).await
        }
        Credential::BearerAssertion { token } => {
            let claims = validate_bearer(&token, &config.session)?;
            Ok(Resolved::Session(claims))
        }
    }
}

/// Verify a local username + password pair.
///
/// The failure variants are precise internally (`NotFound`, `WrongMethod`,
/// `InvalidCredentials`) even though the HTTP layer collapses the first and
/// last into one uniform message. Deactivated accounts fail with the same
/// uniform variant as a wrong password.
pub async fn verify_password_login(
    pool: &DbPool,
    username: &str,
    password: &str,
) -> Result<Account, AuthFailure> {
    let account = AccountRepo::find_by_username(pool, username)
        .await
        .map_err(store_failure)?
        .ok_or(AuthFailure::NotFound)?;

    let Some(hash) = account.password_hash.as_deref() else {
        // Exists, but external-only. The owner is told to use the Google
        // button instead of being shown "wrong password" forever.
        return Err(AuthFailure::WrongMethod);
    };

    let matches = verify_secret(password, hash).map_err(|e| {
        tracing::error!(account_id = account.id, error = %e, "Stored password hash is unreadable");
        AuthFailure::InvalidCredentials
    })?;
    if !matches {
        return Err(AuthFailure::InvalidCredentials);
    }

    if !account.is_active {
        tracing::warn!(account_id = account.id, "Login attempt on deactivated account");
        return Err(AuthFailure::InvalidCredentials);
    }

    Ok(account)
}

/// Match a verified external identity to an account.
///
/// Resolution order:
///
/// 1. By external subject id -- the normal repeat-login path.
/// 2. By email -- a pre-existing local account logging in with Google for
///    the first time; the subject id is linked to it.
/// 3. Allow-listed email with no account -- auto-provisioned as admin in a
///    single atomic upsert.
/// 4. Otherwise the claims are parked and the caller gets
///    [`Resolved::RegistrationRequired`]; an account is never created
///    silently for an unknown identity.
pub async fn resolve_external(
    pool: &DbPool,
    config: &ServerConfig,
    claims: &VerifiedClaims,
) -> Result<Resolved, AuthFailure> {
    if let Some(account) = AccountRepo::find_by_external_id(pool, &claims.subject)
        .await
        .map_err(store_failure)?
    {
        if !account.is_active {
            tracing::warn!(account_id = account.id, "SSO login attempt on deactivated account");
            return Err(AuthFailure::InvalidCredentials);
        }
        let account = apply_admin_allowlist(pool, config, account).await?;
        return Ok(Resolved::Account(account));
    }

    if let Some(existing) = AccountRepo::find_by_email(pool, &claims.email)
        .await
        .map_err(store_failure)?
    {
        if !existing.is_active {
            tracing::warn!(account_id = existing.id, "SSO login attempt on deactivated account");
            return Err(AuthFailure::InvalidCredentials);
        }
        return match AccountRepo::link_external_id(pool, existing.id, &claims.subject)
            .await
            .map_err(store_failure)?
        {
            Some(linked) => {
                tracing::info!(
                    account_id = linked.id,
                    "Linked external identity to existing account"
                );
                let linked = apply_admin_allowlist(pool, config, linked).await?;
                Ok(Resolved::Account(linked))
            }
            // The account is already bound to a *different* subject id.
            // Someone else controls an identity with this email; refuse.
            None => {
                tracing::warn!(
                    account_id = existing.id,
                    "Email matches an account bound to a different external subject"
                );
                Err(AuthFailure::InvalidCredentials)
            }
        };
    }

    if config.is_admin_email(&claims.email) {
        let account = provision_admin(pool, claims).await?;
        tracing::info!(
            account_id = account.id,
            email = %account.email,
            "Auto-provisioned allow-listed admin account"
        );
        return Ok(Resolved::Account(account));
    }

    let pending = PendingRegistrationRepo::upsert(
        pool,
        &claims.subject,
        &claims.email,
        claims.given_name.as_deref(),
        claims.family_name.as_deref(),
    )
    .await
    .map_err(store_failure)?;

    Ok(Resolved::RegistrationRequired(pending))
}

/// Create-or-elevate an allow-listed admin account.
///
/// The upsert is keyed on the unique external subject id, so concurrent
/// first logins collapse to one row. A username collision (someone already
/// owns the email's local part) is retried once with a subject-derived
/// suffix.
async fn provision_admin(pool: &DbPool, claims: &VerifiedClaims) -> Result<Account, AuthFailure> {
    let username = derive_username(&claims.email);

    let first = AccountRepo::upsert_admin_if_absent(
        pool,
        &claims.subject,
        &username,
        &claims.email,
        claims.given_name.as_deref(),
        claims.family_name.as_deref(),
    )
    .await;

    match first {
        Ok(account) => Ok(account),
        Err(e) if is_username_conflict(&e) => {
            let fallback = suffixed_username(&username, &claims.subject);
            AccountRepo::upsert_admin_if_absent(
                pool,
                &claims.subject,
                &fallback,
                &claims.email,
                claims.given_name.as_deref(),
                claims.family_name.as_deref(),
            )
            .await
            .map_err(store_failure)
        }
        Err(e) => Err(store_failure(e)),
    }
}

fn is_username_conflict(err: &sqlx::Error) -> bool {
    matches!(
        err,
        sqlx::Error::Database(db)
            if db.code().as_deref() == Some("23505")
                && db.constraint() == Some("uq_accounts_username")
    )
}

/// Derive a username from an email's local part.
fn derive_username(email: &str) -> String {
    let local = email.split('@').next().unwrap_or(email);
    let cleaned: String = local
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || c == '_' || c == '.' || c == '-' {
                c
            } else {
                '_'
            }
        })
        .collect();
    if cleaned.len() < 4 {
        format!("{cleaned:_<4}")
    } else {
        cleaned
    }
}

fn suffixed_username(base: &str, subject: &str) -> String {
    let suffix: String = subject.chars().take(6).collect();
    format!("{base}_{suffix}")
}

/// One-time allow-list elevation, applied after any successful login.
///
/// Elevation is a conditional UPDATE so concurrent logins race harmlessly,
/// and it is one-way: an admin later removed from the allow-list keeps the
/// role until explicitly demoted through the admin API.
async fn apply_admin_allowlist(
    pool: &DbPool,
    config: &ServerConfig,
    account: Account,
) -> Result<Account, AuthFailure> {
    if account.role == ROLE_ADMIN || !config.is_admin_email(&account.email) {
        return Ok(account);
    }

    let elevated = AccountRepo::promote_admin_if_absent(pool, account.id)
        .await
        .map_err(store_failure)?;
    if elevated {
        tracing::info!(
            account_id = account.id,
            email = %account.email,
            "Elevated allow-listed account to admin"
        );
    }

    // Re-read so the caller sees the role the rest of the request uses.
    AccountRepo::find_by_id(pool, account.id)
        .await
        .map_err(store_failure)?
        .ok_or(AuthFailure::NotFound)
}

/// Complete an explicit registration for a parked external identity.
///
/// The claims were verified when they were parked; this step only claims
/// them with a chosen username. An expired or missing parking record means
/// the user must restart the SSO flow.
pub async fn complete_external_registration(
    pool: &DbPool,
    config: &ServerConfig,
    external_id: &str,
    username: &str,
) -> Result<Account, AuthFailure> {
    let pending = PendingRegistrationRepo::find_valid(pool, external_id)
        .await
        .map_err(store_failure)?
        .ok_or(AuthFailure::InvalidToken)?;

    let role = if config.is_admin_email(&pending.email) {
        ROLE_ADMIN
    } else {
        ROLE_USER
    };

    let account = AccountRepo::create(
        pool,
        &CreateAccount {
            username: username.to_string(),
            email: pending.email.clone(),
            password_hash: None,
            external_id: Some(pending.external_id.clone()),
            role: role.to_string(),
            first_name: pending.given_name.clone(),
            last_name: pending.family_name.clone(),
            security_question: None,
            security_answer_hash: None,
        },
    )
    .await
    .map_err(store_failure)?;

    PendingRegistrationRepo::delete(pool, external_id)
        .await
        .map_err(store_failure)?;

    Ok(account)
}

/// Authorize a privileged operation with a fresh role read.
///
/// The role inside a bearer assertion is a login-time snapshot and is never
/// trusted for privileged paths: this reads the account's *current* role
/// and active flag, then applies the pure [`decide`] rule. A stale handle
/// for a deleted account fails as [`AuthFailure::InvalidToken`].
pub async fn authorize_privileged(
    pool: &DbPool,
    account_id: DbId,
    required_role: &str,
) -> Result<AuthorizationDecision, AuthFailure> {
    let (role, is_active) = AccountRepo::current_role(pool, account_id)
        .await
        .map_err(store_failure)?
        .ok_or(AuthFailure::InvalidToken)?;

    Ok(decide(account_id, required_role, &role, is_active))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn derive_username_uses_email_local_part() {
        assert_eq!(derive_username("ada.lovelace@example.com"), "ada.lovelace");
    }

    #[test]
    fn derive_username_replaces_forbidden_characters() {
        assert_eq!(derive_username("ada+spam@example.com"), "ada_spam");
    }

    #[test]
    fn derive_username_pads_short_local_parts() {
        assert_eq!(derive_username("al@example.com"), "al__");
    }

    #[test]
    fn suffixed_username_appends_subject_prefix() {
        assert_eq!(suffixed_username("ada", "1234567890"), "ada_123456");
    }
}

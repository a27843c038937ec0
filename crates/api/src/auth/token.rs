//! Session-handle generation/validation and refresh-token helpers.
//!
//! The session handle is an HS256-signed JWT containing a [`Claims`]
//! payload. Refresh tokens are opaque random strings; only their SHA-256
//! hash is stored server-side so a database leak does not compromise active
//! sessions.
//!
//! The role inside a validated handle is a login-time snapshot. It is good
//! enough for non-privileged user paths; privileged checks re-read the
//! account's current role (see `middleware::rbac::RequireAdmin`).

use beehive_core::auth::AuthFailure;
use beehive_core::types::DbId;
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use uuid::Uuid;

/// JWT claims embedded in every session handle.
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct Claims {
    /// Subject -- the account's internal database id.
    pub sub: DbId,
    /// Role snapshot at issue time (`"admin"`, `"user"`). Advisory only.
    pub role: String,
    /// Expiration time (UTC Unix timestamp).
    pub exp: i64,
    /// Issued-at time (UTC Unix timestamp).
    pub iat: i64,
    /// Unique token identifier (UUID v4) for audit.
    pub jti: String,
}

/// Configuration for session token generation and validation.
#[derive(Debug, Clone)]
pub struct SessionTokenConfig {
    /// HMAC-SHA256 secret used to sign and verify tokens.
    pub secret: String,
    /// Access token lifetime in minutes (default: 15).
    pub access_token_expiry_mins: i64,
    /// Refresh token lifetime in days (default: 30).
    pub refresh_token_expiry_days: i64,
}

/// Default access token expiry in minutes.
const DEFAULT_ACCESS_EXPIRY_MINS: i64 = 15;
/// Default refresh token expiry in days.
const DEFAULT_REFRESH_EXPIRY_DAYS: i64 = 30;

impl SessionTokenConfig {
    /// Load session token configuration from environment variables.
    ///
    /// | Env Var                        | Required | Default |
    /// |--------------------------------|----------|---------|
    /// | `SESSION_SECRET`               | **yes**  | --      |
    /// | `SESSION_ACCESS_EXPIRY_MINS`   | no       | `15`    |
    /// | `SESSION_REFRESH_EXPIRY_DAYS`  | no       | `30`    |
    ///
    /// # Panics
    ///
    /// Panics if `SESSION_SECRET` is not set or is empty.
    pub fn from_env() -> Self {
        let secret =
            std::env::var("SESSION_SECRET").expect("SESSION_SECRET must be set in the environment");
        assert!(!secret.is_empty(), "SESSION_SECRET must not be empty");

        let access_token_expiry_mins: i64 = std::env::var("SESSION_ACCESS_EXPIRY_MINS")
            .unwrap_or_else(|_| DEFAULT_ACCESS_EXPIRY_MINS.to_string())
            .parse()
            .expect("SESSION_ACCESS_EXPIRY_MINS must be a valid i64");

        let refresh_token_expiry_days: i64 = std::env::var("SESSION_REFRESH_EXPIRY_DAYS")
            .unwrap_or_else(|_| DEFAULT_REFRESH_EXPIRY_DAYS.to_string())
            .parse()
            .expect("SESSION_REFRESH_EXPIRY_DAYS must be a valid i64");

        Self {
            secret,
            access_token_expiry_mins,
            refresh_token_expiry_days,
        }
    }
}

/// Generate an HS256 session handle for the given account.
pub fn generate_session_token(
    account_id: DbId,
    role: &str,
    config: &SessionTokenConfig,
) -> Result<String, jsonwebtoken::errors::Error> {
    let now = chrono::Utc::now().timestamp();
    let exp = now + config.access_token_expiry_mins * 60;

    let claims = Claims {
        sub: account_id,
        role: role.to_string(),
        exp,
        iat: now,
        jti: Uuid::new_v4().to_string(),
    };

    encode(
        &Header::default(), // HS256
        &claims,
        &EncodingKey::from_secret(config.secret.as_bytes()),
    )
}

/// Validate a bearer assertion and return the embedded [`Claims`].
///
/// Structure is checked first: a token without exactly three dot-separated
/// segments is rejected before any decoding. Signature, expiration, and
/// issued-at validation follow. Every failure maps to
/// [`AuthFailure::InvalidToken`] -- a malformed token is fatal to the
/// request, never downgraded to an anonymous caller.
pub fn validate_bearer(token: &str, config: &SessionTokenConfig) -> Result<Claims, AuthFailure> {
    if token.split('.').count() != 3 {
        return Err(AuthFailure::InvalidToken);
    }

    let token_data = decode::<Claims>(
        token,
        &DecodingKey::from_secret(config.secret.as_bytes()),
        &Validation::default(), // HS256, validates exp
    )
    .map_err(|_| AuthFailure::InvalidToken)?;

    Ok(token_data.claims)
}

/// Generate a cryptographically random refresh token.
///
/// Returns a tuple of `(plaintext_token, sha256_hex_hash)`. The plaintext is
/// sent to the client; only the hash is persisted server-side.
pub fn generate_refresh_token() -> (String, String) {
    let plaintext = Uuid::new_v4().to_string();
    let hash = hash_refresh_token(&plaintext);
    (plaintext, hash)
}

/// Compute the SHA-256 hex digest of a refresh token.
pub fn hash_refresh_token(token: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(token.as_bytes());
    format!("{:x}", hasher.finalize())
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;

    /// Helper to build a test config with a known secret.
    fn test_config() -> SessionTokenConfig {
        SessionTokenConfig {
            secret: "test-secret-that-is-long-enough-for-hmac".to_string(),
            access_token_expiry_mins: 15,
            refresh_token_expiry_days: 30,
        }
    }

    #[test]
    fn test_generate_and_validate_session_token() {
        let config = test_config();
        let token = generate_session_token(42, "admin", &config)
            .expect("token generation should succeed");

        let claims = validate_bearer(&token, &config).expect("token validation should succeed");
        assert_eq!(claims.sub, 42);
        assert_eq!(claims.role, "admin");
        assert!(claims.exp > claims.iat);
        assert!(!claims.jti.is_empty());
    }

    #[test]
    fn test_wrong_segment_count_is_invalid_token() {
        let config = test_config();
        assert_matches!(
            validate_bearer("only.two", &config),
            Err(AuthFailure::InvalidToken)
        );
        assert_matches!(
            validate_bearer("a.b.c.d", &config),
            Err(AuthFailure::InvalidToken)
        );
        assert_matches!(validate_bearer("", &config), Err(AuthFailure::InvalidToken));
    }

    #[test]
    fn test_garbage_payload_is_invalid_token() {
        let config = test_config();
        assert_matches!(
            validate_bearer("not.a-real.jwt", &config),
            Err(AuthFailure::InvalidToken)
        );
    }

    #[test]
    fn test_expired_token_fails() {
        let config = test_config();

        // Manually create an already-expired token.
        // Use a margin well beyond the default 60-second leeway.
        let now = chrono::Utc::now().timestamp();
        let claims = Claims {
            sub: 1,
            role: "user".to_string(),
            exp: now - 300, // expired 5 minutes ago (well past leeway)
            iat: now - 600,
            jti: Uuid::new_v4().to_string(),
        };

        let token = encode(
            &Header::default(),
            &claims,
            &EncodingKey::from_secret(config.secret.as_bytes()),
        )
        .expect("encoding should succeed");

        assert_matches!(
            validate_bearer(&token, &config),
            Err(AuthFailure::InvalidToken)
        );
    }

    #[test]
    fn test_different_secrets_fail() {
        let config_a = SessionTokenConfig {
            secret: "secret-alpha".to_string(),
            ..test_config()
        };
        let config_b = SessionTokenConfig {
            secret: "secret-bravo".to_string(),
            ..test_config()
        };

        let token = generate_session_token(1, "user", &config_a)
            .expect("token generation should succeed");

        assert_matches!(
            validate_bearer(&token, &config_b),
            Err(AuthFailure::InvalidToken)
        );
    }

    #[test]
    fn test_refresh_token_hash_matches() {
        let (plaintext, hash) = generate_refresh_token();

        // Re-hashing the same plaintext must produce the same digest.
        let rehashed = hash_refresh_token(&plaintext);
        assert_eq!(hash, rehashed, "hash of the same token must be stable");

        // Sanity: the hash should be a 64-char hex string (SHA-256).
        assert_eq!(hash.len(), 64);
    }
}

//! Google OIDC client built on the openidconnect crate.
//!
//! Provider metadata (token endpoint, signing keys) is discovered once at
//! startup. ID-token signature and audience verification is delegated to the
//! crate; an unverifiable token is always fatal to the request -- claims are
//! never read from an unverified token.

use beehive_core::auth::{AuthFailure, VerifiedClaims};
use openidconnect::core::{
    CoreAuthenticationFlow, CoreClient, CoreIdToken, CoreIdTokenClaims, CoreProviderMetadata,
};
use openidconnect::{
    AuthorizationCode, ClientId, ClientSecret, CsrfToken, IssuerUrl, Nonce, PkceCodeChallenge,
    PkceCodeVerifier, RedirectUrl, Scope, TokenResponse,
};

use crate::config::GoogleConfig;

/// Handshake material persisted between the redirect and the callback.
#[derive(Debug, Clone)]
pub struct HandshakeState {
    pub state: String,
    pub nonce: String,
    pub pkce_verifier: String,
}

/// OIDC errors surfaced during startup discovery.
#[derive(Debug, thiserror::Error)]
pub enum OidcError {
    #[error("OIDC configuration error: {0}")]
    Configuration(String),

    #[error("OIDC discovery error: {0}")]
    Discovery(String),
}

/// Google SSO client.
pub struct OidcClient {
    provider_metadata: CoreProviderMetadata,
    client_id: ClientId,
    client_secret: ClientSecret,
    redirect_url: RedirectUrl,
    http_client: reqwest::Client,
}

impl OidcClient {
    /// Create a client by discovering the provider's metadata.
    pub async fn discover(config: &GoogleConfig) -> Result<Self, OidcError> {
        let issuer_url = IssuerUrl::new(config.issuer_url.clone())
            .map_err(|e| OidcError::Configuration(format!("invalid issuer URL: {e}")))?;

        // Redirect following is disabled to keep the token exchange pinned
        // to the discovered endpoints.
        let http_client = reqwest::Client::builder()
            .redirect(reqwest::redirect::Policy::none())
            .build()
            .map_err(|e| OidcError::Configuration(format!("failed to create HTTP client: {e}")))?;

        let provider_metadata = CoreProviderMetadata::discover_async(issuer_url, &http_client)
            .await
            .map_err(|e| OidcError::Discovery(format!("failed to discover provider: {e}")))?;

        let redirect_url = RedirectUrl::new(config.redirect_uri.clone())
            .map_err(|e| OidcError::Configuration(format!("invalid redirect URI: {e}")))?;

        Ok(Self {
            provider_metadata,
            client_id: ClientId::new(config.client_id.clone()),
            client_secret: ClientSecret::new(config.client_secret.clone()),
            redirect_url,
            http_client,
        })
    }

    fn client(
        &self,
    ) -> CoreClient<
        openidconnect::EndpointSet,
        openidconnect::EndpointNotSet,
        openidconnect::EndpointNotSet,
        openidconnect::EndpointNotSet,
        openidconnect::EndpointMaybeSet,
        openidconnect::EndpointMaybeSet,
    > {
        CoreClient::from_provider_metadata(
            self.provider_metadata.clone(),
            self.client_id.clone(),
            Some(self.client_secret.clone()),
        )
        .set_redirect_uri(self.redirect_url.clone())
    }

    /// Generate the authorization URL for redirecting the user to Google.
    ///
    /// The returned [`HandshakeState`] must be persisted and checked on the
    /// callback: `state` binds the callback to this request (CSRF), `nonce`
    /// binds the ID token, and `pkce_verifier` completes the code exchange.
    pub fn authorization_url(&self) -> (String, HandshakeState) {
        let (pkce_challenge, pkce_verifier) = PkceCodeChallenge::new_random_sha256();

        let (auth_url, csrf_token, nonce) = self
            .client()
            .authorize_url(
                CoreAuthenticationFlow::AuthorizationCode,
                CsrfToken::new_random,
                Nonce::new_random,
            )
            .add_scope(Scope::new("openid".to_string()))
            .add_scope(Scope::new("email".to_string()))
            .add_scope(Scope::new("profile".to_string()))
            .set_pkce_challenge(pkce_challenge)
            .url();

        let handshake = HandshakeState {
            state: csrf_token.secret().clone(),
            nonce: nonce.secret().clone(),
            pkce_verifier: pkce_verifier.secret().clone(),
        };

        (auth_url.to_string(), handshake)
    }

    /// Exchange an authorization code for tokens and return the verified
    /// ID-token claims.
    ///
    /// Signature, audience, expiry, and nonce are all checked; any failure
    /// is [`AuthFailure::InvalidToken`].
    pub async fn exchange_code(
        &self,
        code: &str,
        nonce: &str,
        pkce_verifier: &str,
    ) -> Result<VerifiedClaims, AuthFailure> {
        let client = self.client();

        let token_response = client
            .exchange_code(AuthorizationCode::new(code.to_string()))
            .map_err(|e| {
                tracing::warn!(error = %e, "Token endpoint not available");
                AuthFailure::InvalidToken
            })?
            .set_pkce_verifier(PkceCodeVerifier::new(pkce_verifier.to_string()))
            .request_async(&self.http_client)
            .await
            .map_err(|e| {
                tracing::warn!(error = %e, "Authorization code exchange failed");
                AuthFailure::InvalidToken
            })?;

        let id_token = token_response
            .id_token()
            .ok_or(AuthFailure::InvalidToken)?;

        let nonce = Nonce::new(nonce.to_string());
        let claims = id_token
            .claims(&client.id_token_verifier(), &nonce)
            .map_err(|e| {
                tracing::warn!(error = %e, "ID token verification failed");
                AuthFailure::InvalidToken
            })?;

        extract_claims(claims)
    }

    /// Verify a bare ID token presented directly (API-style login).
    ///
    /// Nonce checking is skipped -- there is no redirect handshake to bind
    /// to -- but signature, audience, and expiry are enforced exactly as on
    /// the callback path.
    pub fn verify_id_token(&self, raw: &str) -> Result<VerifiedClaims, AuthFailure> {
        let id_token: CoreIdToken = raw.parse().map_err(|_| AuthFailure::InvalidToken)?;

        let client = self.client();
        let claims = id_token
            .claims(&client.id_token_verifier(), |_: Option<&Nonce>| Ok(()))
            .map_err(|e| {
                tracing::warn!(error = %e, "ID token verification failed");
                AuthFailure::InvalidToken
            })?;

        extract_claims(claims)
    }
}

/// Pull the fields Beehive cares about out of verified standard claims.
fn extract_claims(claims: &CoreIdTokenClaims) -> Result<VerifiedClaims, AuthFailure> {
    // An identity without an email cannot be matched or registered.
    let email = claims
        .email()
        .map(|e| e.as_str().to_string())
        .ok_or(AuthFailure::InvalidToken)?;

    let given_name = claims
        .given_name()
        .and_then(|n| n.get(None))
        .map(|n| n.as_str().to_string());
    let family_name = claims
        .family_name()
        .and_then(|n| n.get(None))
        .map(|n| n.as_str().to_string());

    Ok(VerifiedClaims {
        subject: claims.subject().to_string(),
        email,
        given_name,
        family_name,
    })
}

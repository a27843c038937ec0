use crate::auth::token::SessionTokenConfig;

/// Server configuration loaded from environment variables.
///
/// All fields except secrets have defaults suitable for local development.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Bind address (default: `0.0.0.0`).
    pub host: String,
    /// Bind port (default: `3000`).
    pub port: u16,
    /// Allowed CORS origins, parsed from comma-separated `CORS_ORIGINS`.
    pub cors_origins: Vec<String>,
    /// HTTP request timeout in seconds (default: `30`).
    pub request_timeout_secs: u64,
    /// Session token configuration (secret, expiry durations).
    pub session: SessionTokenConfig,
    /// Emails granted one-time admin elevation on successful authentication,
    /// parsed from comma-separated `ADMIN_EMAILS`. Empty means nobody.
    pub admin_emails: Vec<String>,
    /// Google SSO configuration; `None` disables the SSO routes.
    pub google: Option<GoogleConfig>,
}

/// Google OIDC settings.
#[derive(Debug, Clone)]
pub struct GoogleConfig {
    pub client_id: String,
    pub client_secret: String,
    pub redirect_uri: String,
    /// Provider issuer URL (default: `https://accounts.google.com`).
    pub issuer_url: String,
}

impl ServerConfig {
    /// Load configuration from environment variables with defaults.
    ///
    /// | Env Var                | Default                    |
    /// |------------------------|----------------------------|
    /// | `HOST`                 | `0.0.0.0`                  |
    /// | `PORT`                 | `3000`                     |
    /// | `CORS_ORIGINS`         | `http://localhost:5173`    |
    /// | `REQUEST_TIMEOUT_SECS` | `30`                       |
    /// | `ADMIN_EMAILS`         | empty                      |
    ///
    /// Google SSO is enabled only when `GOOGLE_CLIENT_ID`,
    /// `GOOGLE_CLIENT_SECRET`, and `GOOGLE_REDIRECT_URI` are all present.
    pub fn from_env() -> Self {
        let host = std::env::var("HOST").unwrap_or_else(|_| "0.0.0.0".into());

        let port: u16 = std::env::var("PORT")
            .unwrap_or_else(|_| "3000".into())
            .parse()
            .expect("PORT must be a valid u16");

        let cors_origins: Vec<String> = std::env::var("CORS_ORIGINS")
            .unwrap_or_else(|_| "http://localhost:5173".into())
            .split(',')
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .collect();

        let request_timeout_secs: u64 = std::env::var("REQUEST_TIMEOUT_SECS")
            .unwrap_or_else(|_| "30".into())
            .parse()
            .expect("REQUEST_TIMEOUT_SECS must be a valid u64");

        let admin_emails: Vec<String> = std::env::var("ADMIN_EMAILS")
            .unwrap_or_default()
            .split(',')
            .map(|s| s.trim().to_lowercase())
            .filter(|s| !s.is_empty())
            .collect();

        let session = SessionTokenConfig::from_env();

        let google = GoogleConfig::from_env();

        Self {
            host,
            port,
            cors_origins,
            request_timeout_secs,
            session,
            admin_emails,
            google,
        }
    }

    /// Whether `email` is on the one-time admin elevation allow-list.
    pub fn is_admin_email(&self, email: &str) -> bool {
        let email = email.to_lowercase();
        self.admin_emails.iter().any(|e| *e == email)
    }
}

impl GoogleConfig {
    /// Read Google SSO settings; returns `None` (SSO disabled) unless all
    /// required variables are present.
    fn from_env() -> Option<Self> {
        let client_id = std::env::var("GOOGLE_CLIENT_ID").ok()?;
        let client_secret = std::env::var("GOOGLE_CLIENT_SECRET").ok()?;
        let redirect_uri = std::env::var("GOOGLE_REDIRECT_URI").ok()?;
        let issuer_url = std::env::var("GOOGLE_ISSUER_URL")
            .unwrap_or_else(|_| "https://accounts.google.com".into());

        Some(Self {
            client_id,
            client_secret,
            redirect_uri,
            issuer_url,
        })
    }
}

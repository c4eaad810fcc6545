//! Client configuration read from `ATTENDIFY_*` environment variables.

use std::path::PathBuf;
use std::time::Duration;

use attendify_core::env_config::{env_parse_with_default, optional_env, require_env};
use attendify_core::{CoreError, DEFAULT_HTTP_TIMEOUT_SECS, OAuthProvider, SERVICE_NAME};
use url::Url;

pub const ENV_API_URL: &str = "ATTENDIFY_API_URL";
pub const ENV_OIDC_URL: &str = "ATTENDIFY_OIDC_URL";
pub const ENV_CALLBACK_URL: &str = "ATTENDIFY_CALLBACK_URL";
pub const ENV_HTTP_TIMEOUT_SECS: &str = "ATTENDIFY_HTTP_TIMEOUT_SECS";
pub const ENV_CREDENTIALS_PATH: &str = "ATTENDIFY_CREDENTIALS_PATH";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientConfig {
    /// Base URL of the REST API, without a trailing slash.
    pub api_url: String,
    /// OpenID Connect gateway used for provider logins.
    pub oidc_url: Option<String>,
    /// Where the gateway sends the browser back with the token pair.
    pub callback_url: Option<String>,
    pub timeout: Duration,
    /// Overrides the default credentials file location.
    pub credentials_path: Option<PathBuf>,
}

impl ClientConfig {
    #[must_use]
    pub fn new(api_url: impl Into<String>) -> Self {
        Self {
            api_url: api_url.into().trim_end_matches('/').to_owned(),
            oidc_url: None,
            callback_url: None,
            timeout: Duration::from_secs(DEFAULT_HTTP_TIMEOUT_SECS),
            credentials_path: None,
        }
    }

    /// Reads the configuration from the environment.
    ///
    /// # Errors
    /// Returns `CoreError::MissingEnv` when `ATTENDIFY_API_URL` is unset.
    pub fn from_env() -> Result<Self, CoreError> {
        let mut config = Self::new(require_env(ENV_API_URL)?);
        config.oidc_url = optional_env(ENV_OIDC_URL);
        config.callback_url = optional_env(ENV_CALLBACK_URL);
        config.timeout = Duration::from_secs(env_parse_with_default(
            ENV_HTTP_TIMEOUT_SECS,
            DEFAULT_HTTP_TIMEOUT_SECS,
        ));
        config.credentials_path = optional_env(ENV_CREDENTIALS_PATH).map(PathBuf::from);
        Ok(config)
    }

    #[must_use]
    pub const fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    #[must_use]
    pub fn with_oauth(mut self, oidc_url: impl Into<String>, callback_url: impl Into<String>) -> Self {
        self.oidc_url = Some(oidc_url.into());
        self.callback_url = Some(callback_url.into());
        self
    }

    /// Browser URL that starts a provider login:
    /// `{oidc}/auth/{provider}?service=attendify&redirect={callback}`.
    ///
    /// # Errors
    /// Returns `CoreError::MissingEnv` when either URL is not configured and
    /// `CoreError::InvalidInput` when the gateway URL does not parse.
    pub fn oauth_login_url(&self, provider: OAuthProvider) -> Result<Url, CoreError> {
        let oidc = self
            .oidc_url
            .as_deref()
            .ok_or_else(|| CoreError::MissingEnv(ENV_OIDC_URL.to_owned()))?;
        let callback = self
            .callback_url
            .as_deref()
            .ok_or_else(|| CoreError::MissingEnv(ENV_CALLBACK_URL.to_owned()))?;

        let raw = format!("{}/auth/{}", oidc.trim_end_matches('/'), provider.as_str());
        let mut url = Url::parse(&raw)
            .map_err(|e| CoreError::InvalidInput(format!("{ENV_OIDC_URL}: {e}")))?;
        url.query_pairs_mut().append_pair("service", SERVICE_NAME).append_pair("redirect", callback);
        Ok(url)
    }
}

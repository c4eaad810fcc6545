//! Authentication endpoints and OAuth callback parsing.

use attendify_core::endpoints;
use attendify_core::{Credentials, UserProfile};
use reqwest::Method;
use serde::{Deserialize, Serialize};

use crate::client::ApiClient;
use crate::envelope::decode_data;
use crate::error::ApiError;

/// Body of a successful `POST /auth/login`.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct LoginResponse {
    pub user: UserProfile,
    pub credentials: Credentials,
}

#[derive(Serialize)]
struct LoginRequest<'a> {
    email: &'a str,
    password: &'a str,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct RefreshRequest<'a> {
    refresh_token: &'a str,
}

impl ApiClient {
    /// Exchanges an email/password pair for a profile and a token pair.
    ///
    /// The returned credentials are not stored; the session decides that.
    ///
    /// # Errors
    /// Returns `ApiError::Status` with 401 on bad credentials.
    pub async fn login(&self, email: &str, password: &str) -> Result<LoginResponse, ApiError> {
        let context = format!("POST {}", endpoints::AUTH_LOGIN);
        let request = self
            .request(Method::POST, endpoints::AUTH_LOGIN)
            .json(&LoginRequest { email, password });
        let body = self.send(request, &context).await?;
        Ok(decode_data(&body, &context)?)
    }

    /// Profile of the user owning the stored access token.
    ///
    /// # Errors
    /// Returns `ApiError::Status` with 401 when the token is missing or expired.
    pub async fn me(&self) -> Result<UserProfile, ApiError> {
        self.get_data(endpoints::AUTH_ME).await
    }

    /// Exchanges a refresh token for a new pair.
    ///
    /// # Errors
    /// Returns `ApiError` when the refresh token is rejected.
    pub async fn refresh(&self, refresh_token: &str) -> Result<Credentials, ApiError> {
        let context = format!("POST {}", endpoints::AUTH_REFRESH);
        let request = self
            .request(Method::POST, endpoints::AUTH_REFRESH)
            .json(&RefreshRequest { refresh_token });
        let body = self.send(request, &context).await?;
        Ok(decode_data(&body, &context)?)
    }

    /// Tells the server the session is over.
    ///
    /// # Errors
    /// Returns `ApiError` when the server cannot be reached or refuses.
    pub async fn logout(&self) -> Result<(), ApiError> {
        self.mutate::<()>(Method::POST, endpoints::AUTH_LOGOUT, None).await
    }
}

/// Extracts the token pair from an OAuth callback query string.
///
/// Returns `None` unless both `accessToken` and `refreshToken` are present
/// and non-empty.
#[must_use]
pub fn parse_oauth_callback(query: &str) -> Option<Credentials> {
    let query = query.strip_prefix('?').unwrap_or(query);
    let mut access_token = None;
    let mut refresh_token = None;
    for (key, value) in url::form_urlencoded::parse(query.as_bytes()) {
        match key.as_ref() {
            "accessToken" if !value.is_empty() => access_token = Some(value.into_owned()),
            "refreshToken" if !value.is_empty() => refresh_token = Some(value.into_owned()),
            _ => {},
        }
    }
    Some(Credentials { access_token: access_token?, refresh_token: refresh_token? })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_callback_with_both_tokens() {
        let creds = parse_oauth_callback("?accessToken=abc&refreshToken=def").unwrap();
        assert_eq!(creds.access_token, "abc");
        assert_eq!(creds.refresh_token, "def");
    }

    #[test]
    fn test_parse_callback_decodes_values() {
        let creds = parse_oauth_callback("accessToken=a%2Bb&refreshToken=c").unwrap();
        assert_eq!(creds.access_token, "a+b");
    }

    #[test]
    fn test_parse_callback_missing_token() {
        assert!(parse_oauth_callback("?accessToken=abc").is_none());
        assert!(parse_oauth_callback("?refreshToken=def").is_none());
        assert!(parse_oauth_callback("?accessToken=&refreshToken=def").is_none());
        assert!(parse_oauth_callback("").is_none());
    }
}

//! Authentication session: an explicit state machine over the signed-in
//! user, backed by the client's credential store.

use std::sync::{Arc, PoisonError, RwLock};

use attendify_client::{ApiClient, CredentialStore, parse_oauth_callback};
use attendify_core::{Credentials, UserProfile, routes};

use crate::error::ServiceError;

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum SessionState {
    #[default]
    Anonymous,
    /// Credentials are being exchanged for a profile.
    Authenticating,
    Authenticated(UserProfile),
    /// The token pair is being renewed; the user stays signed in meanwhile.
    Refreshing(UserProfile),
}

impl SessionState {
    #[must_use]
    pub const fn name(&self) -> &'static str {
        match self {
            Self::Anonymous => "anonymous",
            Self::Authenticating => "authenticating",
            Self::Authenticated(_) => "authenticated",
            Self::Refreshing(_) => "refreshing",
        }
    }

    #[must_use]
    pub const fn user(&self) -> Option<&UserProfile> {
        match self {
            Self::Authenticated(user) | Self::Refreshing(user) => Some(user),
            Self::Anonymous | Self::Authenticating => None,
        }
    }

    #[must_use]
    pub const fn is_authenticated(&self) -> bool {
        self.user().is_some()
    }

    #[must_use]
    pub const fn is_loading(&self) -> bool {
        matches!(self, Self::Authenticating)
    }
}

/// How an OAuth callback was resolved.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CallbackOutcome {
    SignedIn(UserProfile),
    /// The callback lacked a token; the user goes back to the login page.
    MissingTokens,
}

impl CallbackOutcome {
    #[must_use]
    pub const fn redirect(&self) -> &'static str {
        match self {
            Self::SignedIn(_) => routes::HOME,
            Self::MissingTokens => routes::LOGIN,
        }
    }
}

/// The session of one user of the client, passed explicitly to whatever
/// needs it.
#[derive(Debug)]
pub struct SessionContext {
    client: Arc<ApiClient>,
    state: RwLock<SessionState>,
}

impl SessionContext {
    #[must_use]
    pub fn new(client: Arc<ApiClient>) -> Self {
        Self { client, state: RwLock::new(SessionState::Anonymous) }
    }

    #[must_use]
    pub const fn client(&self) -> &Arc<ApiClient> {
        &self.client
    }

    #[must_use]
    pub fn state(&self) -> SessionState {
        self.state.read().unwrap_or_else(PoisonError::into_inner).clone()
    }

    #[must_use]
    pub fn user(&self) -> Option<UserProfile> {
        self.state().user().cloned()
    }

    #[must_use]
    pub fn is_authenticated(&self) -> bool {
        self.state().is_authenticated()
    }

    #[must_use]
    pub fn has_role(&self, role: &str) -> bool {
        self.state().user().is_some_and(|u| u.has_role(role))
    }

    #[must_use]
    pub fn has_permission(&self, permission: &str) -> bool {
        self.state().user().is_some_and(|u| u.has_permission(permission))
    }

    fn store(&self) -> &Arc<dyn CredentialStore> {
        self.client.credentials()
    }

    fn transition(&self, next: SessionState) {
        let mut state = self.state.write().unwrap_or_else(PoisonError::into_inner);
        tracing::debug!(from = state.name(), to = next.name(), "Session transition");
        *state = next;
    }

    /// Resumes a session from stored credentials at startup.
    ///
    /// An expired access token is renewed once with the refresh token; if
    /// that fails too, the stored credentials are discarded.
    ///
    /// # Errors
    /// Returns the API error when the server cannot confirm the session.
    pub async fn restore(&self) -> Result<SessionState, ServiceError> {
        let Some(credentials) = self.store().load()? else {
            self.transition(SessionState::Anonymous);
            return Ok(SessionState::Anonymous);
        };
        self.transition(SessionState::Authenticating);

        let profile = match self.client.me().await {
            Ok(profile) => profile,
            Err(err) if err.is_unauthorized() => {
                tracing::info!("Stored access token rejected, renewing");
                match self.renew(&credentials).await {
                    Ok(()) => self.client.me().await.map_err(|e| self.abandon(e))?,
                    Err(e) => return Err(self.abandon(e)),
                }
            },
            Err(err) => {
                self.transition(SessionState::Anonymous);
                return Err(err.into());
            },
        };
        self.transition(SessionState::Authenticated(profile));
        Ok(self.state())
    }

    /// Signs in with email and password and stores the issued tokens.
    ///
    /// # Errors
    /// Returns the API error (401 for bad credentials) or the storage error
    /// when the tokens cannot be saved; the session is left anonymous.
    pub async fn login(&self, email: &str, password: &str) -> Result<UserProfile, ServiceError> {
        self.transition(SessionState::Authenticating);
        let response = match self.client.login(email, password).await {
            Ok(response) => response,
            Err(err) => {
                self.transition(SessionState::Anonymous);
                return Err(err.into());
            },
        };
        self.store().save(&response.credentials).map_err(|e| self.abandon(e))?;
        tracing::info!(user = %response.user.user.username, "Signed in");
        self.transition(SessionState::Authenticated(response.user.clone()));
        Ok(response.user)
    }

    /// Completes a provider login from the callback query string.
    ///
    /// # Errors
    /// Returns the API error when the issued token cannot be exchanged for a
    /// profile; the stored credentials are discarded in that case.
    pub async fn complete_oauth_callback(&self, query: &str) -> Result<CallbackOutcome, ServiceError> {
        let Some(credentials) = parse_oauth_callback(query) else {
            tracing::warn!("OAuth callback without both tokens");
            return Ok(CallbackOutcome::MissingTokens);
        };
        self.store().save(&credentials)?;
        self.transition(SessionState::Authenticating);

        let profile = self.client.me().await.map_err(|e| self.abandon(e))?;
        self.transition(SessionState::Authenticated(profile.clone()));
        Ok(CallbackOutcome::SignedIn(profile))
    }

    /// Renews the token pair while staying signed in.
    ///
    /// # Errors
    /// `ServiceError::NotAuthenticated` without a session; otherwise the API
    /// error, after which the session is anonymous and credentials are gone.
    pub async fn refresh(&self) -> Result<(), ServiceError> {
        let Some(profile) = self.user() else {
            return Err(ServiceError::NotAuthenticated);
        };
        let Some(credentials) = self.store().load()? else {
            return Err(self.abandon(ServiceError::NotAuthenticated));
        };
        self.transition(SessionState::Refreshing(profile.clone()));

        match self.renew(&credentials).await {
            Ok(()) => {
                self.transition(SessionState::Authenticated(profile));
                Ok(())
            },
            Err(e) => Err(self.abandon(e)),
        }
    }

    /// Ends the session: notifies the server, then clears every stored
    /// token. A server failure does not keep the user signed in.
    ///
    /// # Errors
    /// Returns an error only if the credential store cannot be cleared.
    pub async fn logout(&self) -> Result<(), ServiceError> {
        match self.store().load() {
            Ok(Some(_)) => {
                if let Err(e) = self.client.logout().await {
                    tracing::warn!(error = %e, "Server logout failed, clearing local session anyway");
                }
            },
            Ok(None) => {},
            Err(e) => tracing::warn!(error = %e, "Unreadable credentials, skipping server logout"),
        }
        self.store().clear()?;
        self.transition(SessionState::Anonymous);
        tracing::info!("Signed out");
        Ok(())
    }

    async fn renew(&self, credentials: &Credentials) -> Result<(), ServiceError> {
        let renewed = self.client.refresh(&credentials.refresh_token).await?;
        self.store().save(&renewed)?;
        Ok(())
    }

    /// Drops stored credentials and returns to `Anonymous`, passing `err`
    /// through.
    fn abandon(&self, err: impl Into<ServiceError>) -> ServiceError {
        if let Err(clear_err) = self.store().clear() {
            tracing::warn!(error = %clear_err, "Failed to clear credentials");
        }
        self.transition(SessionState::Anonymous);
        err.into()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_state_flags() {
        assert!(!SessionState::Anonymous.is_authenticated());
        assert!(SessionState::Authenticating.is_loading());
        assert!(SessionState::Authenticating.user().is_none());
    }

    #[test]
    fn test_callback_redirects() {
        assert_eq!(CallbackOutcome::MissingTokens.redirect(), "/login");
    }
}

use std::sync::Arc;

use anyhow::{Result, bail};
use attendify_client::{ApiClient, ClientConfig, CredentialStore, FileCredentialStore};
use attendify_core::UserProfile;
use attendify_service::guard::private_route;
use attendify_service::{GuardDecision, NoticeLog, SessionContext};

use crate::render;

/// Everything a command needs, built once from the environment.
pub(crate) struct AppContext {
    pub(crate) client: Arc<ApiClient>,
    pub(crate) session: SessionContext,
    pub(crate) notices: Arc<NoticeLog>,
}

impl AppContext {
    pub(crate) fn from_env() -> Result<Self> {
        let config = ClientConfig::from_env()?;
        let store: Arc<dyn CredentialStore> = match &config.credentials_path {
            Some(path) => Arc::new(FileCredentialStore::new(path.clone())),
            None => Arc::new(FileCredentialStore::in_config_dir()?),
        };
        let client = Arc::new(ApiClient::new(&config, store)?);
        tracing::debug!(api = %client.base_url(), "Client ready");
        Ok(Self {
            session: SessionContext::new(Arc::clone(&client)),
            client,
            notices: Arc::new(NoticeLog::new()),
        })
    }

    /// Resumes the stored session and applies the private-route guard.
    pub(crate) async fn signed_in(&self) -> Result<UserProfile> {
        let state = self.session.restore().await?;
        match (private_route(&state), state.user()) {
            (GuardDecision::Render, Some(user)) => Ok(user.clone()),
            (GuardDecision::Redirect(route), _) => {
                bail!("not signed in; run `attendify login` ({route})")
            },
            (GuardDecision::Loading | GuardDecision::Render, _) => bail!("session is still being resolved"),
        }
    }

    /// Prints and clears the notices raised by the last operation.
    pub(crate) fn flush_notices(&self) {
        render::print_notices(&self.notices.drain());
    }
}

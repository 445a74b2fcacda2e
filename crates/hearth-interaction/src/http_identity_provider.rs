//! HttpIdentityProvider - fetches the signed-in caller's profile.

use async_trait::async_trait;
use hearth_core::config::AssistantConfig;
use hearth_core::context::{AuthenticatedProfile, IdentityProvider};
use hearth_core::{HearthError, Result};
use reqwest::Client;
use std::time::Duration;

/// Identity provider reached with `GET {identity_url}`.
///
/// Every failure, transport or decoding, is reported as `ContextUnavailable`.
#[derive(Clone)]
pub struct HttpIdentityProvider {
    client: Client,
    profile_url: String,
    access_token: Option<String>,
    timeout: Duration,
}

impl HttpIdentityProvider {
    pub fn new(profile_url: impl Into<String>, access_token: Option<String>) -> Self {
        Self {
            client: Client::new(),
            profile_url: profile_url.into(),
            access_token,
            timeout: Duration::from_secs(10),
        }
    }

    pub fn from_config(config: &AssistantConfig) -> Self {
        Self::new(config.identity_url.clone(), config.access_token.clone())
            .with_timeout(config.dispatch_timeout())
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }
}

#[async_trait]
impl IdentityProvider for HttpIdentityProvider {
    async fn current_profile(&self) -> Result<AuthenticatedProfile> {
        let mut request = self.client.get(&self.profile_url).timeout(self.timeout);
        if let Some(token) = &self.access_token {
            request = request.bearer_auth(token);
        }

        let response = request
            .send()
            .await
            .map_err(|e| HearthError::context_unavailable(format!("profile lookup failed: {}", e)))?;

        if !response.status().is_success() {
            return Err(HearthError::context_unavailable(format!(
                "profile lookup returned {}",
                response.status()
            )));
        }

        let profile: AuthenticatedProfile = response
            .json()
            .await
            .map_err(|e| HearthError::context_unavailable(format!("invalid profile: {}", e)))?;

        tracing::debug!(
            "[Identity] Profile for {} (role: {:?})",
            profile.user_id,
            profile.role
        );
        Ok(profile)
    }
}

use crate::context::RolePolicy;
use serde::{Deserialize, Serialize};
use std::time::Duration;

pub const DEFAULT_SERVICE_URL: &str = "http://localhost:8080/api/assistant";
pub const DEFAULT_IDENTITY_URL: &str = "http://localhost:8080/api/auth/profile";
pub const DEFAULT_MODIFY_PROMPT: &str =
    "I'd like to change the suggested issue \"{{ title }}\" before creating it.";
pub const DEFAULT_CONFIRM_ACTION_KIND: &str = "create_issue";

/// Root configuration of the assistant (`config.toml`).
#[derive(Deserialize, Serialize, Debug, Clone, PartialEq)]
#[serde(default)]
pub struct AssistantConfig {
    pub service_url: String,
    pub identity_url: String,
    /// Bearer token sent to both the identity provider and the conversation service.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub access_token: Option<String>,
    pub dispatch_timeout_secs: u64,
    pub greeting_timeout_secs: u64,
    pub role_policy: RolePolicy,
    /// Template for the message sent when the user wants to change a draft.
    /// Receives `title`, `description`, `category` and `priority`.
    pub modify_prompt: String,
    pub confirm_action_kind: String,
    pub log_level: String,
}

impl Default for AssistantConfig {
    fn default() -> Self {
        Self {
            service_url: DEFAULT_SERVICE_URL.to_string(),
            identity_url: DEFAULT_IDENTITY_URL.to_string(),
            access_token: None,
            dispatch_timeout_secs: 30,
            greeting_timeout_secs: 30,
            role_policy: RolePolicy::default(),
            modify_prompt: DEFAULT_MODIFY_PROMPT.to_string(),
            confirm_action_kind: DEFAULT_CONFIRM_ACTION_KIND.to_string(),
            log_level: "info".to_string(),
        }
    }
}

impl AssistantConfig {
    pub fn dispatch_timeout(&self) -> Duration {
        Duration::from_secs(self.dispatch_timeout_secs)
    }

    pub fn greeting_timeout(&self) -> Duration {
        Duration::from_secs(self.greeting_timeout_secs)
    }
}

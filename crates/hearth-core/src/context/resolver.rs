//! Resolution of a caller's profile into a conversation context.

use super::model::{AuthenticatedProfile, CallerRole, ConversationContext};
use crate::error::{HearthError, Result};
use serde::{Deserialize, Serialize};

const TENANT_TOKEN: &str = "tenant";
const LANDLORD_TOKENS: [&str; 3] = ["landlord", "manager", "owner"];

/// Supplies the authenticated profile of the current caller.
///
/// A single best-effort lookup; any failure means there is no profile.
#[async_trait::async_trait]
pub trait IdentityProvider: Send + Sync {
    async fn current_profile(&self) -> Result<AuthenticatedProfile>;
}

/// How role strings that are not recognizably tenant roles are treated.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RolePolicy {
    /// Anything that is not a tenant role, including a missing role, is a landlord.
    #[default]
    Lenient,
    /// Only explicit tenant or landlord-like roles are accepted.
    Strict,
}

/// Classifies a raw role string.
///
/// Matching is a case-insensitive substring test, so `"Tenant-Portal"`
/// is a tenant role.
pub fn classify_role(role: Option<&str>, policy: RolePolicy) -> Result<CallerRole> {
    let normalized = role.map(|r| r.trim().to_lowercase()).unwrap_or_default();

    if normalized.contains(TENANT_TOKEN) {
        return Ok(CallerRole::Tenant);
    }

    match policy {
        RolePolicy::Lenient => Ok(CallerRole::Landlord),
        RolePolicy::Strict => {
            if LANDLORD_TOKENS.iter().any(|t| normalized.contains(t)) {
                Ok(CallerRole::Landlord)
            } else if normalized.is_empty() {
                Err(HearthError::context_unavailable("profile carries no role"))
            } else {
                Err(HearthError::context_unavailable(format!(
                    "unrecognized role '{}'",
                    role.unwrap_or_default()
                )))
            }
        }
    }
}

/// Derives the [`ConversationContext`] for a session.
#[derive(Debug, Clone, Copy, Default)]
pub struct ContextResolver {
    policy: RolePolicy,
}

impl ContextResolver {
    pub fn new(policy: RolePolicy) -> Self {
        Self { policy }
    }

    /// Looks up the caller's profile and classifies it.
    ///
    /// # Errors
    ///
    /// Returns `ContextUnavailable` when the lookup fails or, under the
    /// strict policy, when the role is not recognized.
    pub async fn resolve(&self, identity: &dyn IdentityProvider) -> Result<ConversationContext> {
        let profile = identity.current_profile().await.map_err(|e| match e {
            HearthError::ContextUnavailable { .. } => e,
            other => HearthError::context_unavailable(other.to_string()),
        })?;
        self.resolve_profile(&profile)
    }

    pub fn resolve_profile(&self, profile: &AuthenticatedProfile) -> Result<ConversationContext> {
        let role = classify_role(profile.role.as_deref(), self.policy)?;
        tracing::debug!(
            "[Context] Resolved caller {} as {}",
            profile.user_id,
            role.as_str()
        );
        Ok(ConversationContext::from_profile(role, profile))
    }
}

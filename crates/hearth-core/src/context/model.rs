//! Caller identity and conversation context models.

use serde::{Deserialize, Serialize};

/// The portal role a conversation is held in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CallerRole {
    Tenant,
    Landlord,
}

impl CallerRole {
    pub fn as_str(&self) -> &'static str {
        match self {
            CallerRole::Tenant => "tenant",
            CallerRole::Landlord => "landlord",
        }
    }
}

/// Profile returned by the identity provider for the signed-in caller.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AuthenticatedProfile {
    pub user_id: String,
    /// Free-form role string as issued by the identity provider.
    #[serde(default)]
    pub role: Option<String>,
    #[serde(default)]
    pub tenant_id: Option<String>,
    #[serde(default)]
    pub landlord_id: Option<String>,
    #[serde(default)]
    pub property_id: Option<String>,
    #[serde(default)]
    pub display_name: Option<String>,
}

/// Who the conversation is held with, computed once per session open.
///
/// Exactly one of `tenant_id` / `landlord_id` is set, matching `role`.
/// The fields are private so the constructors can uphold that.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ConversationContext {
    role: CallerRole,
    caller_id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    tenant_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    landlord_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    property_id: Option<String>,
}

impl ConversationContext {
    pub fn tenant(caller_id: impl Into<String>, tenant_id: impl Into<String>) -> Self {
        Self {
            role: CallerRole::Tenant,
            caller_id: caller_id.into(),
            tenant_id: Some(tenant_id.into()),
            landlord_id: None,
            property_id: None,
        }
    }

    pub fn landlord(caller_id: impl Into<String>, landlord_id: impl Into<String>) -> Self {
        Self {
            role: CallerRole::Landlord,
            caller_id: caller_id.into(),
            tenant_id: None,
            landlord_id: Some(landlord_id.into()),
            property_id: None,
        }
    }

    pub fn with_property(mut self, property_id: Option<String>) -> Self {
        self.property_id = property_id;
        self
    }

    /// Builds the context for `profile` under an already classified role.
    ///
    /// When the profile lacks the role-specific id, the caller id stands in.
    pub fn from_profile(role: CallerRole, profile: &AuthenticatedProfile) -> Self {
        let caller_id = profile.user_id.clone();
        let context = match role {
            CallerRole::Tenant => {
                let tenant_id = profile.tenant_id.clone().unwrap_or_else(|| caller_id.clone());
                Self::tenant(caller_id, tenant_id)
            }
            CallerRole::Landlord => {
                let landlord_id = profile
                    .landlord_id
                    .clone()
                    .unwrap_or_else(|| caller_id.clone());
                Self::landlord(caller_id, landlord_id)
            }
        };
        context.with_property(profile.property_id.clone())
    }

    pub fn role(&self) -> CallerRole {
        self.role
    }

    pub fn caller_id(&self) -> &str {
        &self.caller_id
    }

    pub fn tenant_id(&self) -> Option<&str> {
        self.tenant_id.as_deref()
    }

    pub fn landlord_id(&self) -> Option<&str> {
        self.landlord_id.as_deref()
    }

    pub fn property_id(&self) -> Option<&str> {
        self.property_id.as_deref()
    }
}

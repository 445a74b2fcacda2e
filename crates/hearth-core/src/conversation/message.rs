//! Conversation message types.
//!
//! A [`Message`] is one entry of the session history. Structured extras
//! offered by the assistant (quick replies, actions, an issue draft) live in
//! the closed [`MessageMetadata`] variant and are owned by the message that
//! carries them.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;
use uuid::Uuid;

/// Opaque, unique identity of a message within a session.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct MessageId(String);

impl MessageId {
    /// Generates a fresh random identity.
    pub fn new() -> Self {
        Self(Uuid::new_v4().to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Default for MessageId {
    fn default() -> Self {
        Self::new()
    }
}

impl From<String> for MessageId {
    fn from(id: String) -> Self {
        Self(id)
    }
}

impl From<&str> for MessageId {
    fn from(id: &str) -> Self {
        Self(id.to_string())
    }
}

impl fmt::Display for MessageId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Who authored a message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Sender {
    User,
    Assistant,
}

/// A pre-defined answer the assistant offers.
///
/// Selecting it forwards `payload` verbatim to the conversation service.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QuickReply {
    pub id: String,
    pub text: String,
    pub payload: Value,
}

/// A structured operation the assistant offers to run on the caller's behalf.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Action {
    pub id: String,
    pub label: String,
    /// Action kind tag understood by the backend (e.g. `create_issue`).
    pub kind: String,
    pub data: Value,
}

/// An issue the assistant suggests filing.
///
/// All fields come from the conversation service; nothing here is
/// invented locally.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IssueDraft {
    pub suggested_title: String,
    pub suggested_description: String,
    pub suggested_category: String,
    pub suggested_priority: String,
}

impl IssueDraft {
    /// The draft as the JSON payload sent back on confirmation.
    pub fn to_payload(&self) -> Value {
        // Plain string fields always serialize.
        serde_json::to_value(self).unwrap_or(Value::Null)
    }
}

/// Structured extras attached to a message.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(tag = "type", content = "data", rename_all = "snake_case")]
pub enum MessageMetadata {
    #[default]
    None,
    QuickReplies(Vec<QuickReply>),
    Actions(Vec<Action>),
    IssueDraft(IssueDraft),
}

/// A single message in the conversation history.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Message {
    pub id: MessageId,
    pub sender: Sender,
    pub content: String,
    pub created_at: DateTime<Utc>,
    #[serde(default)]
    pub metadata: MessageMetadata,
}

impl Message {
    /// Creates a message authored now with a fresh identity.
    pub fn new(sender: Sender, content: impl Into<String>) -> Self {
        Self {
            id: MessageId::new(),
            sender,
            content: content.into(),
            created_at: Utc::now(),
            metadata: MessageMetadata::None,
        }
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self::new(Sender::User, content)
    }

    pub fn assistant(content: impl Into<String>) -> Self {
        Self::new(Sender::Assistant, content)
    }

    pub fn with_id(mut self, id: impl Into<MessageId>) -> Self {
        self.id = id.into();
        self
    }

    pub fn with_metadata(mut self, metadata: MessageMetadata) -> Self {
        self.metadata = metadata;
        self
    }

    pub fn with_created_at(mut self, created_at: DateTime<Utc>) -> Self {
        self.created_at = created_at;
        self
    }

    pub fn issue_draft(&self) -> Option<&IssueDraft> {
        match &self.metadata {
            MessageMetadata::IssueDraft(draft) => Some(draft),
            _ => None,
        }
    }

    pub fn quick_replies(&self) -> &[QuickReply] {
        match &self.metadata {
            MessageMetadata::QuickReplies(replies) => replies,
            _ => &[],
        }
    }

    pub fn actions(&self) -> &[Action] {
        match &self.metadata {
            MessageMetadata::Actions(actions) => actions,
            _ => &[],
        }
    }
}

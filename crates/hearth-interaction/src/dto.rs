//! Wire format of the conversation service.
//!
//! On the wire, message metadata is a loose bag in which any of
//! `quickReplies`, `actions` and `issueDraft` may appear. It is narrowed to
//! the tagged [`MessageMetadata`] here so nothing past this module has to
//! probe optional fields.

use chrono::{DateTime, Utc};
use hearth_core::conversation::{
    Action, IssueDraft, Message, MessageId, MessageMetadata, QuickReply, Sender,
};
use serde::{Deserialize, Serialize};
use serde_json::Value;

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WireMetadata {
    #[serde(default)]
    pub quick_replies: Option<Vec<QuickReply>>,
    #[serde(default)]
    pub actions: Option<Vec<Action>>,
    #[serde(default)]
    pub issue_draft: Option<IssueDraft>,
}

impl From<WireMetadata> for MessageMetadata {
    /// An issue draft wins over actions, which win over quick replies.
    /// Empty lists count as absent.
    fn from(wire: WireMetadata) -> Self {
        if let Some(draft) = wire.issue_draft {
            return MessageMetadata::IssueDraft(draft);
        }
        match (wire.actions, wire.quick_replies) {
            (Some(actions), _) if !actions.is_empty() => MessageMetadata::Actions(actions),
            (_, Some(replies)) if !replies.is_empty() => MessageMetadata::QuickReplies(replies),
            _ => MessageMetadata::None,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WireMessage {
    #[serde(default)]
    pub id: Option<String>,
    #[serde(default)]
    pub sender: Option<String>,
    pub content: String,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub metadata: Option<WireMetadata>,
}

impl From<WireMessage> for Message {
    fn from(wire: WireMessage) -> Self {
        let sender = match wire.sender.as_deref() {
            Some(s) if s.eq_ignore_ascii_case("user") => Sender::User,
            _ => Sender::Assistant,
        };
        Message {
            id: wire.id.map(MessageId::from).unwrap_or_default(),
            sender,
            content: wire.content,
            created_at: wire.created_at.unwrap_or_else(Utc::now),
            metadata: wire.metadata.map(Into::into).unwrap_or_default(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OpenConversationResponse {
    pub conversation_id: String,
    #[serde(default)]
    pub messages: Vec<WireMessage>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct MessagesResponse {
    #[serde(default)]
    pub messages: Vec<WireMessage>,
}

impl MessagesResponse {
    pub fn into_messages(self) -> Vec<Message> {
        self.messages.into_iter().map(Into::into).collect()
    }
}

#[derive(Debug, Serialize)]
pub struct SendMessageRequest<'a> {
    pub text: &'a str,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct QuickReplyRequest<'a> {
    pub quick_reply_id: &'a str,
    pub payload: &'a Value,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ActionRequest<'a> {
    pub action_id: &'a str,
    pub kind: &'a str,
    pub data: &'a Value,
}

impl<'a> From<&'a Action> for ActionRequest<'a> {
    fn from(action: &'a Action) -> Self {
        Self {
            action_id: &action.id,
            kind: &action.kind,
            data: &action.data,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn parse(value: Value) -> Message {
        serde_json::from_value::<WireMessage>(value).unwrap().into()
    }

    #[test]
    fn test_plain_message_has_no_metadata() {
        let msg = parse(json!({
            "id": "m-1",
            "sender": "assistant",
            "content": "Your rent is $1,200, due on the 1st.",
            "createdAt": "2026-10-01T09:00:00Z"
        }));
        assert_eq!(msg.id.as_str(), "m-1");
        assert_eq!(msg.sender, Sender::Assistant);
        assert_eq!(msg.metadata, MessageMetadata::None);
    }

    #[test]
    fn test_issue_draft_takes_precedence() {
        let msg = parse(json!({
            "content": "Shall I file this?",
            "metadata": {
                "quickReplies": [{"id": "q", "text": "Yes", "payload": "yes"}],
                "issueDraft": {
                    "suggestedTitle": "Leaking faucet",
                    "suggestedDescription": "Drips all night",
                    "suggestedCategory": "plumbing",
                    "suggestedPriority": "high"
                }
            }
        }));
        assert_eq!(
            msg.issue_draft().map(|d| d.suggested_title.as_str()),
            Some("Leaking faucet")
        );
    }

    #[test]
    fn test_empty_actions_fall_through_to_quick_replies() {
        let msg = parse(json!({
            "content": "Pick one",
            "metadata": {
                "actions": [],
                "quickReplies": [{"id": "q1", "text": "Pay rent", "payload": {"intent": "pay"}}]
            }
        }));
        assert_eq!(msg.quick_replies().len(), 1);
        assert_eq!(msg.quick_replies()[0].payload, json!({"intent": "pay"}));
    }

    #[test]
    fn test_missing_id_gets_generated() {
        let a = parse(json!({"content": "a"}));
        let b = parse(json!({"content": "b"}));
        assert!(!a.id.as_str().is_empty());
        assert_ne!(a.id, b.id);
    }

    #[test]
    fn test_action_request_forwards_data_verbatim() {
        let action = Action {
            id: "a-1".to_string(),
            label: "Create issue".to_string(),
            kind: "create_issue".to_string(),
            data: json!({"suggestedTitle": "Leaking faucet"}),
        };
        let body = serde_json::to_value(ActionRequest::from(&action)).unwrap();
        assert_eq!(body["actionId"], json!("a-1"));
        assert_eq!(body["data"], action.data);
    }
}

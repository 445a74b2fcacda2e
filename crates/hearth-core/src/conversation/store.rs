//! Ordered message log for the active session.

use super::message::{IssueDraft, Message, MessageId};
use crate::error::{HearthError, Result};
use std::collections::HashSet;

/// Append-only, ordered history of the messages exchanged in one session.
///
/// The store is the single source of truth for rendering. It never
/// reorders; the only deduplication is the identity check on append.
/// Timestamps are kept non-decreasing: a message stamped earlier than the
/// current tail (remote clock skew) is clamped to the tail's timestamp.
#[derive(Debug, Default, Clone)]
pub struct ConversationStore {
    messages: Vec<Message>,
    ids: HashSet<MessageId>,
}

impl ConversationStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends one message at the end of the history.
    ///
    /// # Errors
    ///
    /// Returns `DuplicateMessage` if a message with the same id is stored.
    pub fn append(&mut self, message: Message) -> Result<()> {
        if self.ids.contains(&message.id) {
            return Err(HearthError::duplicate_message(message.id.as_str()));
        }
        self.push_unchecked(message);
        Ok(())
    }

    /// Appends a batch in order, all or nothing.
    ///
    /// If any message in `batch` collides with a stored id (or with an
    /// earlier message of the same batch) nothing is appended.
    pub fn extend(&mut self, batch: Vec<Message>) -> Result<()> {
        let mut seen = HashSet::with_capacity(batch.len());
        for message in &batch {
            if self.ids.contains(&message.id) || !seen.insert(&message.id) {
                return Err(HearthError::duplicate_message(message.id.as_str()));
            }
        }
        for message in batch {
            self.push_unchecked(message);
        }
        Ok(())
    }

    /// Empties the history.
    pub fn reset(&mut self) {
        self.messages.clear();
        self.ids.clear();
    }

    pub fn messages(&self) -> &[Message] {
        &self.messages
    }

    pub fn len(&self) -> usize {
        self.messages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }

    pub fn last(&self) -> Option<&Message> {
        self.messages.last()
    }

    pub fn contains(&self, id: &MessageId) -> bool {
        self.ids.contains(id)
    }

    pub fn get(&self, id: &MessageId) -> Option<&Message> {
        self.messages.iter().find(|m| &m.id == id)
    }

    /// The most recent message carrying an issue draft, if any.
    pub fn latest_issue_draft(&self) -> Option<(&MessageId, &IssueDraft)> {
        self.messages
            .iter()
            .rev()
            .find_map(|m| m.issue_draft().map(|draft| (&m.id, draft)))
    }

    fn push_unchecked(&mut self, mut message: Message) {
        if let Some(last) = self.messages.last() {
            if message.created_at < last.created_at {
                tracing::debug!(
                    "[Store] Clamping timestamp of {} to preserve ordering",
                    message.id
                );
                message.created_at = last.created_at;
            }
        }
        self.ids.insert(message.id.clone());
        self.messages.push(message);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::conversation::message::MessageMetadata;
    use chrono::Duration;

    fn draft(title: &str) -> IssueDraft {
        IssueDraft {
            suggested_title: title.to_string(),
            suggested_description: String::new(),
            suggested_category: "general".to_string(),
            suggested_priority: "low".to_string(),
        }
    }

    #[test]
    fn test_append_preserves_order() {
        let mut store = ConversationStore::new();
        store.append(Message::user("first")).unwrap();
        store.append(Message::assistant("second")).unwrap();
        store.append(Message::user("third")).unwrap();

        let contents: Vec<_> = store.messages().iter().map(|m| m.content.as_str()).collect();
        assert_eq!(contents, ["first", "second", "third"]);
    }

    #[test]
    fn test_append_rejects_duplicate_id() {
        let mut store = ConversationStore::new();
        let msg = Message::user("hi").with_id("m-1");
        store.append(msg.clone()).unwrap();

        let err = store.append(msg).unwrap_err();
        assert!(matches!(err, HearthError::DuplicateMessage { .. }));
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn test_extend_is_all_or_nothing() {
        let mut store = ConversationStore::new();
        store.append(Message::user("hi").with_id("m-1")).unwrap();

        let batch = vec![
            Message::assistant("fresh").with_id("m-2"),
            Message::assistant("clash").with_id("m-1"),
        ];
        assert!(store.extend(batch).is_err());
        assert_eq!(store.len(), 1);

        let batch = vec![
            Message::assistant("a").with_id("m-3"),
            Message::assistant("b").with_id("m-3"),
        ];
        assert!(store.extend(batch).is_err());
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn test_timestamps_never_decrease() {
        let mut store = ConversationStore::new();
        let now = chrono::Utc::now();
        store
            .append(Message::user("late").with_created_at(now))
            .unwrap();
        store
            .append(Message::assistant("skewed").with_created_at(now - Duration::seconds(5)))
            .unwrap();

        let stamps: Vec<_> = store.messages().iter().map(|m| m.created_at).collect();
        assert!(stamps.windows(2).all(|w| w[0] <= w[1]));
    }

    #[test]
    fn test_reset_clears_messages_and_ids() {
        let mut store = ConversationStore::new();
        store.append(Message::user("hi").with_id("m-1")).unwrap();
        store.reset();

        assert!(store.is_empty());
        assert!(!store.contains(&MessageId::from("m-1")));
        store.append(Message::user("again").with_id("m-1")).unwrap();
    }

    #[test]
    fn test_latest_issue_draft_picks_most_recent() {
        let mut store = ConversationStore::new();
        store
            .append(
                Message::assistant("old")
                    .with_id("d-1")
                    .with_metadata(MessageMetadata::IssueDraft(draft("Broken heater"))),
            )
            .unwrap();
        store.append(Message::user("hmm")).unwrap();
        store
            .append(
                Message::assistant("new")
                    .with_id("d-2")
                    .with_metadata(MessageMetadata::IssueDraft(draft("Leaking faucet"))),
            )
            .unwrap();

        let (id, latest) = store.latest_issue_draft().unwrap();
        assert_eq!(id.as_str(), "d-2");
        assert_eq!(latest.suggested_title, "Leaking faucet");
    }
}

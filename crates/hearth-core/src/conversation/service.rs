//! Contract of the remote conversation service.
//!
//! The service itself (its reasoning and action execution) lives elsewhere;
//! this trait is only the call boundary. Implementations are provided by the
//! `hearth-interaction` crate.

use super::message::{Action, Message, QuickReply};
use crate::context::ConversationContext;
use crate::error::Result;
use tokio::sync::mpsc;

/// Inbound stream of messages produced after a conversation is opened.
///
/// The first message received is the greeting. The service keeps the
/// sending half and may push further assistant messages at any time; the
/// feed ends when every sender is dropped.
#[derive(Debug)]
pub struct MessageFeed {
    receiver: mpsc::UnboundedReceiver<Message>,
}

impl MessageFeed {
    pub fn new(receiver: mpsc::UnboundedReceiver<Message>) -> Self {
        Self { receiver }
    }

    /// Creates a feed together with the sender that fills it.
    pub fn channel() -> (mpsc::UnboundedSender<Message>, Self) {
        let (tx, rx) = mpsc::unbounded_channel();
        (tx, Self::new(rx))
    }

    /// A feed that yields `messages` and then ends.
    pub fn from_messages(messages: Vec<Message>) -> Self {
        let (tx, feed) = Self::channel();
        for message in messages {
            // The receiver is alive in `feed`, so this cannot fail.
            let _ = tx.send(message);
        }
        feed
    }

    /// Waits for the next message; `None` once the feed has ended.
    pub async fn recv(&mut self) -> Option<Message> {
        self.receiver.recv().await
    }

    /// Takes a message that is already queued without waiting.
    pub fn try_recv(&mut self) -> Option<Message> {
        self.receiver.try_recv().ok()
    }
}

/// Remote conversation service.
///
/// `send`, `select_quick_reply` and `invoke_action` share one outcome
/// shape: the new messages to append, in order, or an error.
#[async_trait::async_trait]
pub trait ConversationService: Send + Sync {
    /// Opens a conversation for the given context and starts its feed.
    async fn open(&self, context: &ConversationContext) -> Result<MessageFeed>;

    /// Sends free text.
    async fn send(&self, text: &str) -> Result<Vec<Message>>;

    /// Forwards the selected quick reply's payload.
    async fn select_quick_reply(&self, reply: &QuickReply) -> Result<Vec<Message>>;

    /// Invokes a structured action (issue confirmation among others).
    async fn invoke_action(&self, action: &Action) -> Result<Vec<Message>>;

    /// Clears server-side conversation state.
    async fn reset(&self) -> Result<()>;
}

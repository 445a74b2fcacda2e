//! In-memory collaborators for session tests.

#![allow(dead_code)]

use hearth_application::SessionEvent;
use hearth_core::config::AssistantConfig;
use hearth_core::context::{AuthenticatedProfile, ConversationContext, IdentityProvider};
use hearth_core::conversation::{
    Action, ConversationService, IssueDraft, Message, MessageFeed, MessageMetadata, QuickReply,
};
use hearth_core::{HearthError, Result};
use serde_json::Value;
use std::collections::VecDeque;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use tokio::sync::{Notify, mpsc};

pub const GREETING: &str = "Hi! I'm your property assistant. How can I help?";

// ============================================================================
// Identity
// ============================================================================

pub struct FakeIdentity {
    profile: Result<AuthenticatedProfile>,
    pub lookups: AtomicUsize,
    held: AtomicBool,
    pub release: Notify,
}

impl FakeIdentity {
    pub fn with_role(role: Option<&str>) -> Arc<Self> {
        Arc::new(Self {
            profile: Ok(AuthenticatedProfile {
                user_id: "user-42".to_string(),
                role: role.map(str::to_string),
                tenant_id: Some("tenant-7".to_string()),
                landlord_id: Some("landlord-3".to_string()),
                property_id: Some("property-1".to_string()),
                display_name: Some("Sam".to_string()),
            }),
            lookups: AtomicUsize::new(0),
            held: AtomicBool::new(false),
            release: Notify::new(),
        })
    }

    pub fn tenant() -> Arc<Self> {
        Self::with_role(Some("Tenant-Portal"))
    }

    pub fn failing() -> Arc<Self> {
        Arc::new(Self {
            profile: Err(HearthError::io("identity provider unreachable")),
            lookups: AtomicUsize::new(0),
            held: AtomicBool::new(false),
            release: Notify::new(),
        })
    }

    pub fn lookups(&self) -> usize {
        self.lookups.load(Ordering::SeqCst)
    }

    /// Makes later lookups wait until `release` notifies waiters.
    pub fn hold_lookups(&self) {
        self.held.store(true, Ordering::SeqCst);
    }

    /// Yields until `count` lookups have started.
    pub async fn wait_for_lookups(&self, count: usize) {
        while self.lookups() < count {
            tokio::task::yield_now().await;
        }
    }
}

#[async_trait::async_trait]
impl IdentityProvider for FakeIdentity {
    async fn current_profile(&self) -> Result<AuthenticatedProfile> {
        let release = self.release.notified();
        self.lookups.fetch_add(1, Ordering::SeqCst);
        if self.held.load(Ordering::SeqCst) {
            release.await;
        }
        self.profile.clone()
    }
}

// ============================================================================
// Conversation service
// ============================================================================

/// A call received by the fake service.
#[derive(Debug, Clone, PartialEq)]
pub enum Call {
    Send(String),
    QuickReply(Value),
    Action { kind: String, data: Value },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mode {
    /// Answer immediately.
    Immediate,
    /// Signal `entered`, then wait for `release` before answering.
    Gated,
    /// Never answer.
    Hang,
}

pub struct FakeService {
    mode: Mutex<Mode>,
    greeting: Mutex<Vec<Message>>,
    replies: Mutex<VecDeque<Result<Vec<Message>>>>,
    calls: Mutex<Vec<Call>>,
    contexts: Mutex<Vec<ConversationContext>>,
    feed: Mutex<Option<mpsc::UnboundedSender<Message>>>,
    pub entered: Notify,
    pub release: Notify,
    pub opens: AtomicUsize,
    pub resets: AtomicUsize,
}

impl FakeService {
    pub fn new() -> Arc<Self> {
        Arc::new(Self {
            mode: Mutex::new(Mode::Immediate),
            greeting: Mutex::new(Vec::new()),
            replies: Mutex::new(VecDeque::new()),
            calls: Mutex::new(Vec::new()),
            contexts: Mutex::new(Vec::new()),
            feed: Mutex::new(None),
            entered: Notify::new(),
            release: Notify::new(),
            opens: AtomicUsize::new(0),
            resets: AtomicUsize::new(0),
        })
    }

    pub fn set_mode(&self, mode: Mode) {
        *self.mode.lock().unwrap() = mode;
    }

    /// Overrides the greeting; by default a single plain message is sent.
    pub fn set_greeting(&self, greeting: Vec<Message>) {
        *self.greeting.lock().unwrap() = greeting;
    }

    /// Queues the outcome of the next dispatch.
    pub fn reply(&self, outcome: Result<Vec<Message>>) {
        self.replies.lock().unwrap().push_back(outcome);
    }

    pub fn reply_text(&self, text: &str) {
        self.reply(Ok(vec![Message::assistant(text)]));
    }

    pub fn calls(&self) -> Vec<Call> {
        self.calls.lock().unwrap().clone()
    }

    pub fn contexts(&self) -> Vec<ConversationContext> {
        self.contexts.lock().unwrap().clone()
    }

    /// Pushes an unsolicited assistant message into the open feed.
    pub fn push(&self, message: Message) {
        let feed = self.feed.lock().unwrap();
        feed.as_ref()
            .expect("conversation not open")
            .send(message)
            .expect("feed receiver dropped");
    }

    pub fn opens(&self) -> usize {
        self.opens.load(Ordering::SeqCst)
    }

    pub fn resets(&self) -> usize {
        self.resets.load(Ordering::SeqCst)
    }

    async fn answer(&self, call: Call) -> Result<Vec<Message>> {
        self.calls.lock().unwrap().push(call);
        let mode = *self.mode.lock().unwrap();
        match mode {
            Mode::Immediate => {}
            Mode::Gated => {
                self.entered.notify_one();
                self.release.notified().await;
            }
            Mode::Hang => std::future::pending::<()>().await,
        }
        self.replies
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| Ok(vec![Message::assistant("ok")]))
    }
}

#[async_trait::async_trait]
impl ConversationService for FakeService {
    async fn open(&self, context: &ConversationContext) -> Result<MessageFeed> {
        self.opens.fetch_add(1, Ordering::SeqCst);
        self.contexts.lock().unwrap().push(context.clone());

        let (tx, feed) = MessageFeed::channel();
        let greeting = self.greeting.lock().unwrap().clone();
        if greeting.is_empty() {
            tx.send(Message::assistant(GREETING)).unwrap();
        } else {
            for message in greeting {
                // Fresh ids per open, as a real service would mint them.
                tx.send(Message { id: Default::default(), ..message }).unwrap();
            }
        }
        *self.feed.lock().unwrap() = Some(tx);
        Ok(feed)
    }

    async fn send(&self, text: &str) -> Result<Vec<Message>> {
        self.answer(Call::Send(text.to_string())).await
    }

    async fn select_quick_reply(&self, reply: &QuickReply) -> Result<Vec<Message>> {
        self.answer(Call::QuickReply(reply.payload.clone())).await
    }

    async fn invoke_action(&self, action: &Action) -> Result<Vec<Message>> {
        self.answer(Call::Action {
            kind: action.kind.clone(),
            data: action.data.clone(),
        })
        .await
    }

    async fn reset(&self) -> Result<()> {
        self.resets.fetch_add(1, Ordering::SeqCst);
        *self.feed.lock().unwrap() = None;
        Ok(())
    }
}

// ============================================================================
// Helpers
// ============================================================================

pub fn config() -> AssistantConfig {
    AssistantConfig {
        dispatch_timeout_secs: 5,
        greeting_timeout_secs: 5,
        ..Default::default()
    }
}

pub fn draft_message(title: &str) -> Message {
    Message::assistant(format!("Want me to report \"{}\"?", title)).with_metadata(
        MessageMetadata::IssueDraft(IssueDraft {
            suggested_title: title.to_string(),
            suggested_description: "Reported through the assistant".to_string(),
            suggested_category: "plumbing".to_string(),
            suggested_priority: "medium".to_string(),
        }),
    )
}

/// Collects every event published so far.
pub fn drain(events: &mut mpsc::UnboundedReceiver<SessionEvent>) -> Vec<SessionEvent> {
    let mut collected = Vec::new();
    while let Ok(event) = events.try_recv() {
        collected.push(event);
    }
    collected
}

pub fn contents(messages: &[Message]) -> Vec<String> {
    messages.iter().map(|m| m.content.clone()).collect()
}

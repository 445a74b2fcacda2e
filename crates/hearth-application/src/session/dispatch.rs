//! Single-flight dispatch state machine.

use hearth_core::HearthError;
use hearth_core::conversation::{Action, Message, QuickReply};

/// One outbound interaction with the conversation service.
#[derive(Debug, Clone, PartialEq)]
pub enum DispatchRequest {
    Text(String),
    QuickReply(QuickReply),
    Action(Action),
}

impl DispatchRequest {
    /// The user-side message shown for this request while it is in flight.
    ///
    /// `None` for free text that is empty or whitespace only.
    pub fn echo(&self) -> Option<Message> {
        match self {
            DispatchRequest::Text(text) => {
                let trimmed = text.trim();
                (!trimmed.is_empty()).then(|| Message::user(trimmed))
            }
            DispatchRequest::QuickReply(reply) => Some(Message::user(reply.text.clone())),
            DispatchRequest::Action(action) => Some(Message::user(action.label.clone())),
        }
    }

    pub fn kind(&self) -> &'static str {
        match self {
            DispatchRequest::Text(_) => "text",
            DispatchRequest::QuickReply(_) => "quick_reply",
            DispatchRequest::Action(_) => "action",
        }
    }
}

/// Why a dispatch was not issued.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RejectReason {
    /// Free text was empty or whitespace only.
    EmptyInput,
    /// Another dispatch is in flight.
    Busy,
    /// The session has been closed.
    Closed,
    /// A reset is re-opening the conversation.
    NotOpen,
    /// The referenced issue draft is not the active one.
    NotActionable,
}

/// Result of a dispatch attempt.
#[derive(Debug, Clone)]
pub enum DispatchOutcome {
    /// The response was stored; `appended` counts the echo plus response messages.
    Delivered { appended: usize },
    /// Nothing was sent and nothing changed.
    Rejected(RejectReason),
    /// The service call failed; history is unchanged.
    Failed(HearthError),
    /// The session was closed or reset before the response could be stored.
    Discarded,
}

impl DispatchOutcome {
    pub fn is_delivered(&self) -> bool {
        matches!(self, DispatchOutcome::Delivered { .. })
    }

    pub fn is_rejected(&self) -> bool {
        matches!(self, DispatchOutcome::Rejected(_))
    }
}

#[derive(Debug, Clone, Default)]
enum DispatchState {
    #[default]
    Idle,
    Sending {
        pending: Message,
    },
}

/// `Idle` / `Sending` state machine guarding the conversation service.
///
/// At most one dispatch is `Sending` at a time. The user echo of that
/// dispatch is held here as the pending message and only reaches the store
/// when the dispatch succeeds.
#[derive(Debug, Default)]
pub struct DispatchController {
    state: DispatchState,
}

impl DispatchController {
    pub fn new() -> Self {
        Self::default()
    }

    /// `Idle -> Sending`.
    pub fn begin(&mut self, request: &DispatchRequest) -> Result<(), RejectReason> {
        if self.is_busy() {
            return Err(RejectReason::Busy);
        }
        let pending = request.echo().ok_or(RejectReason::EmptyInput)?;
        self.state = DispatchState::Sending { pending };
        Ok(())
    }

    /// `Sending -> Idle`, handing back the pending echo.
    pub fn finish(&mut self) -> Option<Message> {
        match std::mem::take(&mut self.state) {
            DispatchState::Sending { pending } => Some(pending),
            DispatchState::Idle => None,
        }
    }

    pub fn is_busy(&self) -> bool {
        matches!(self.state, DispatchState::Sending { .. })
    }

    pub fn pending(&self) -> Option<&Message> {
        match &self.state {
            DispatchState::Sending { pending } => Some(pending),
            DispatchState::Idle => None,
        }
    }
}

use hearth_core::HearthError;
use hearth_core::context::CallerRole;
use hearth_core::conversation::MessageId;

/// Notifications published by a session for whoever renders it.
#[derive(Debug, Clone)]
pub enum SessionEvent {
    /// The conversation is open and its greeting has been stored.
    Opened { role: CallerRole },
    /// A dispatch started (`true`) or finished (`false`); input is disabled while busy.
    BusyChanged { busy: bool },
    /// Messages were appended to the store, in order.
    MessagesAppended { ids: Vec<MessageId> },
    /// The view should scroll to this message.
    ScrollToLatest { id: MessageId },
    /// A dispatch failed; history is unchanged.
    DispatchFailed { error: HearthError },
    /// A newer issue draft became the actionable one.
    IssueDraftActivated { message_id: MessageId, title: String },
    /// History was wiped and the conversation is being re-opened.
    Reset,
    /// The session was torn down.
    Closed,
}

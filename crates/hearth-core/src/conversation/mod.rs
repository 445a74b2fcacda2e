//! Conversation domain module.
//!
//! # Module Structure
//!
//! - `message`: Message types and the tagged metadata variant
//! - `store`: The ordered, append-only `ConversationStore`
//! - `service`: The `ConversationService` collaborator contract and `MessageFeed`
//!
//! # Usage
//!
//! ```ignore
//! use hearth_core::conversation::{ConversationStore, Message, MessageMetadata};
//! use hearth_core::conversation::{ConversationService, MessageFeed};
//! ```

mod message;
mod service;
mod store;

// Re-export public API
pub use message::{Action, IssueDraft, Message, MessageId, MessageMetadata, QuickReply, Sender};
pub use service::{ConversationService, MessageFeed};
pub use store::ConversationStore;

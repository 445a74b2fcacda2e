//! Application layer for Hearth.
//!
//! Coordinates the domain types of `hearth-core` with the conversation
//! service into one assistant session: start-up and teardown, serialized
//! dispatch of user input, and the issue draft workflow.

pub mod session;

pub use session::{AssistantSession, DispatchOutcome, RejectReason, SessionEvent};

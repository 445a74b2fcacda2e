//! Domain layer of the Hearth assistant.
//!
//! Messages and the conversation store, caller context resolution, the
//! contracts of the external collaborators and the shared error type.

pub mod config;
pub mod context;
pub mod conversation;
pub mod error;

// Re-export common error type
pub use error::{DispatchFailure, HearthError, Result};

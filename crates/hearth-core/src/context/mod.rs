//! Conversation context domain module.
//!
//! # Module Structure
//!
//! - `model`: `CallerRole`, `AuthenticatedProfile`, `ConversationContext`
//! - `resolver`: `IdentityProvider` contract, role classification and `ContextResolver`

mod model;
mod resolver;

// Re-export public API
pub use model::{AuthenticatedProfile, CallerRole, ConversationContext};
pub use resolver::{ContextResolver, IdentityProvider, RolePolicy, classify_role};

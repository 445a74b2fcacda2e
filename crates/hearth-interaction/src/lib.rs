//! HTTP transports for the Hearth assistant's external collaborators.
//!
//! - [`HttpConversationService`]: the remote conversation service
//! - [`HttpIdentityProvider`]: the authenticated-profile lookup

pub mod dto;
pub mod http_conversation_service;
pub mod http_identity_provider;

pub use http_conversation_service::HttpConversationService;
pub use http_identity_provider::HttpIdentityProvider;

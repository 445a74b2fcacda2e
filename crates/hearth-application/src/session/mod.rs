//! Assistant session services.
//!
//! - `assistant_session`: the `AssistantSession` aggregate and its lifecycle
//! - `dispatch`: the single-flight `DispatchController` state machine
//! - `draft`: the `IssueDraftCoordinator`
//! - `event`: `SessionEvent`s published to the presentation layer

mod assistant_session;
mod dispatch;
mod draft;
mod event;

pub use assistant_session::AssistantSession;
pub use dispatch::{DispatchController, DispatchOutcome, DispatchRequest, RejectReason};
pub use draft::IssueDraftCoordinator;
pub use event::SessionEvent;

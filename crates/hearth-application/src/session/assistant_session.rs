//! The assistant session aggregate.
//!
//! One `AssistantSession` is one open conversation: its context, its
//! message history, its dispatch state and the active issue draft.
//!
//! # Cancellation
//!
//! The session owns a root `CancellationToken`. Every open of the
//! conversation runs under a child "epoch" token. `reset` cancels the
//! current epoch and starts a new one; `close` cancels the root and with it
//! every epoch. Each asynchronous step captures the epoch it started in and
//! checks it again under the state lock before touching the store, so a
//! response that lands after a reset or close is discarded.

use super::dispatch::{DispatchController, DispatchOutcome, DispatchRequest, RejectReason};
use super::draft::IssueDraftCoordinator;
use super::event::SessionEvent;
use hearth_core::config::AssistantConfig;
use hearth_core::context::{ContextResolver, ConversationContext, IdentityProvider};
use hearth_core::conversation::{
    Action, ConversationService, ConversationStore, IssueDraft, Message, MessageFeed, MessageId,
    QuickReply,
};
use hearth_core::{HearthError, Result};
use std::future::Future;
use std::sync::{Arc, Weak};
use std::time::Duration;
use tokio::sync::{Mutex, mpsc};
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

/// Mutable state of a session. Only ever touched under `SessionInner::state`.
struct SessionState {
    store: ConversationStore,
    dispatch: DispatchController,
    drafts: IssueDraftCoordinator,
    context: Option<ConversationContext>,
    epoch: CancellationToken,
}

struct SessionInner {
    identity: Arc<dyn IdentityProvider>,
    service: Arc<dyn ConversationService>,
    config: AssistantConfig,
    resolver: ContextResolver,
    state: Mutex<SessionState>,
    root: CancellationToken,
    feed_task: std::sync::Mutex<Option<JoinHandle<()>>>,
    events: mpsc::UnboundedSender<SessionEvent>,
}

impl SessionInner {
    fn emit(&self, event: SessionEvent) {
        // Nobody listening is fine.
        let _ = self.events.send(event);
    }

    fn emit_appended(&self, ids: Vec<MessageId>) {
        if let Some(last) = ids.last().cloned() {
            self.emit(SessionEvent::MessagesAppended { ids });
            self.emit(SessionEvent::ScrollToLatest { id: last });
        }
    }

    fn emit_draft(&self, activated: Option<(MessageId, String)>) {
        if let Some((message_id, title)) = activated {
            self.emit(SessionEvent::IssueDraftActivated { message_id, title });
        }
    }

    fn replace_feed_task(&self, handle: Option<JoinHandle<()>>) {
        let previous = match self.feed_task.lock() {
            Ok(mut slot) => std::mem::replace(&mut *slot, handle),
            Err(poisoned) => std::mem::replace(&mut *poisoned.into_inner(), handle),
        };
        if let Some(previous) = previous {
            previous.abort();
        }
    }

    /// Stores a message pushed by the service outside of any dispatch.
    async fn accept_inbound(&self, message: Message, epoch: &CancellationToken) {
        let id = message.id.clone();
        let activated = {
            let mut state = self.state.lock().await;
            if epoch.is_cancelled() {
                tracing::debug!("[Session] Dropping inbound message {} from a past epoch", id);
                return;
            }
            if let Err(e) = state.store.append(message.clone()) {
                tracing::warn!("[Session] Ignoring inbound message: {}", e);
                return;
            }
            state.drafts.observe(std::slice::from_ref(&message))
        };
        self.emit_appended(vec![id]);
        self.emit_draft(activated);
    }
}

impl Drop for SessionInner {
    fn drop(&mut self) {
        self.root.cancel();
        self.replace_feed_task(None);
    }
}

/// Awaits `fut` unless `epoch` is cancelled first or `limit` expires.
async fn guarded<T, F>(epoch: &CancellationToken, limit: Duration, fut: F) -> Result<T>
where
    F: Future<Output = Result<T>>,
{
    tokio::select! {
        biased;
        _ = epoch.cancelled() => Err(HearthError::StaleResponse),
        outcome = tokio::time::timeout(limit, fut) => match outcome {
            Ok(result) => result,
            Err(_) => Err(HearthError::timeout(limit.as_secs())),
        },
    }
}

/// Forwards feed messages into the session until the epoch ends.
async fn pump_feed(session: Weak<SessionInner>, mut feed: MessageFeed, epoch: CancellationToken) {
    loop {
        let message = tokio::select! {
            biased;
            _ = epoch.cancelled() => break,
            next = feed.recv() => match next {
                Some(message) => message,
                None => break,
            },
        };
        let Some(session) = session.upgrade() else {
            break;
        };
        session.accept_inbound(message, &epoch).await;
    }
    tracing::debug!("[Session] Message feed released");
}

/// A conversation with the assistant, from open to close.
///
/// Cloning yields another handle to the same session. The session is torn
/// down by [`close`](Self::close) or when the last handle is dropped.
#[derive(Clone)]
pub struct AssistantSession {
    inner: Arc<SessionInner>,
}

impl AssistantSession {
    /// Resolves the caller's context, opens the conversation and waits for
    /// the greeting.
    ///
    /// Returns the session and the receiver of its events.
    ///
    /// # Errors
    ///
    /// `ContextUnavailable` if the identity lookup fails (the conversation
    /// is then never opened), or the service's error if opening fails or no
    /// greeting arrives in time.
    pub async fn open(
        identity: Arc<dyn IdentityProvider>,
        service: Arc<dyn ConversationService>,
        config: AssistantConfig,
    ) -> Result<(Self, mpsc::UnboundedReceiver<SessionEvent>)> {
        let (events, receiver) = mpsc::unbounded_channel();
        let root = CancellationToken::new();
        let epoch = root.child_token();
        let state = SessionState {
            store: ConversationStore::new(),
            dispatch: DispatchController::new(),
            drafts: IssueDraftCoordinator::new(&config),
            context: None,
            epoch: epoch.clone(),
        };
        let session = Self {
            inner: Arc::new(SessionInner {
                identity,
                service,
                resolver: ContextResolver::new(config.role_policy),
                config,
                state: Mutex::new(state),
                root,
                feed_task: std::sync::Mutex::new(None),
                events,
            }),
        };

        session.start_conversation(epoch).await?;
        Ok((session, receiver))
    }

    /// Opens the conversation for `epoch`.
    ///
    /// Fails with `StaleResponse` once `epoch` is cancelled, i.e. a newer
    /// reset or a close took over; nothing is stored in that case.
    async fn start_conversation(&self, epoch: CancellationToken) -> Result<()> {
        let inner = &self.inner;
        let context = inner
            .resolver
            .resolve(inner.identity.as_ref())
            .await
            .inspect_err(|e| tracing::warn!("[Session] Not opening conversation: {}", e))?;

        if epoch.is_cancelled() {
            return Err(HearthError::StaleResponse);
        }
        let greeting_timeout = inner.config.greeting_timeout();

        let mut feed = guarded(
            &epoch,
            inner.config.dispatch_timeout(),
            inner.service.open(&context),
        )
        .await?;
        let first = guarded(&epoch, greeting_timeout, async {
            Ok::<_, HearthError>(feed.recv().await)
        })
        .await?;

        let mut greeting: Vec<Message> = first.into_iter().collect();
        if greeting.is_empty() {
            tracing::warn!("[Session] Message feed ended before a greeting arrived");
        }
        while let Some(message) = feed.try_recv() {
            greeting.push(message);
        }

        let ids: Vec<MessageId> = greeting.iter().map(|m| m.id.clone()).collect();
        let activated = {
            let mut state = inner.state.lock().await;
            if epoch.is_cancelled() {
                return Err(HearthError::StaleResponse);
            }
            state.store.extend(greeting.clone())?;
            state.context = Some(context.clone());
            // Swapped under the lock so an older open can never replace it.
            let pump = tokio::spawn(pump_feed(Arc::downgrade(inner), feed, epoch));
            inner.replace_feed_task(Some(pump));
            state.drafts.observe(&greeting)
        };

        tracing::info!(
            caller_id = context.caller_id(),
            greeting = ids.len(),
            "[Session] Conversation opened as {}",
            context.role().as_str()
        );
        inner.emit(SessionEvent::Opened {
            role: context.role(),
        });
        inner.emit_appended(ids);
        inner.emit_draft(activated);
        Ok(())
    }

    // ============================================================================
    // Dispatch
    // ============================================================================

    /// Submits free text. Blank input and input while busy are no-ops.
    pub async fn submit_text(&self, text: impl Into<String>) -> DispatchOutcome {
        self.dispatch(DispatchRequest::Text(text.into())).await
    }

    /// Selects a quick reply; its payload is forwarded verbatim.
    pub async fn select_quick_reply(&self, reply: QuickReply) -> DispatchOutcome {
        self.dispatch(DispatchRequest::QuickReply(reply)).await
    }

    /// Invokes a structured action.
    pub async fn invoke_action(&self, action: Action) -> DispatchOutcome {
        self.dispatch(DispatchRequest::Action(action)).await
    }

    /// Runs one dispatch through the `Idle -> Sending -> Idle` cycle.
    pub async fn dispatch(&self, request: DispatchRequest) -> DispatchOutcome {
        let inner = &self.inner;
        if inner.root.is_cancelled() {
            return DispatchOutcome::Rejected(RejectReason::Closed);
        }

        let epoch = {
            let mut state = inner.state.lock().await;
            if state.context.is_none() {
                tracing::debug!(
                    "[Dispatch] Rejected {} request: conversation not open",
                    request.kind()
                );
                return DispatchOutcome::Rejected(RejectReason::NotOpen);
            }
            if let Err(reason) = state.dispatch.begin(&request) {
                tracing::debug!("[Dispatch] Rejected {} request: {:?}", request.kind(), reason);
                return DispatchOutcome::Rejected(reason);
            }
            state.epoch.clone()
        };
        inner.emit(SessionEvent::BusyChanged { busy: true });
        tracing::debug!("[Dispatch] Sending {} request", request.kind());

        let call = async {
            match &request {
                DispatchRequest::Text(text) => inner.service.send(text.trim()).await,
                DispatchRequest::QuickReply(reply) => inner.service.select_quick_reply(reply).await,
                DispatchRequest::Action(action) => inner.service.invoke_action(action).await,
            }
        };
        let result = guarded(&epoch, inner.config.dispatch_timeout(), call).await;

        let mut state = inner.state.lock().await;
        if epoch.is_cancelled() {
            // Reset or close already returned the controller to Idle; a
            // newer dispatch may own it now.
            tracing::debug!("[Dispatch] Discarding stale {} response", request.kind());
            return DispatchOutcome::Discarded;
        }

        let pending = state.dispatch.finish();
        let outcome = match result {
            Ok(responses) => {
                let mut batch: Vec<Message> = pending.into_iter().collect();
                batch.extend(responses);
                let ids: Vec<MessageId> = batch.iter().map(|m| m.id.clone()).collect();
                match state.store.extend(batch.clone()) {
                    Ok(()) => {
                        let activated = state.drafts.observe(&batch);
                        drop(state);
                        tracing::info!(
                            appended = ids.len(),
                            "[Dispatch] {} request delivered",
                            request.kind()
                        );
                        let appended = ids.len();
                        inner.emit_appended(ids);
                        inner.emit_draft(activated);
                        DispatchOutcome::Delivered { appended }
                    }
                    Err(e) => {
                        drop(state);
                        self.report_failure(request.kind(), e)
                    }
                }
            }
            Err(e) => {
                drop(state);
                self.report_failure(request.kind(), e)
            }
        };
        inner.emit(SessionEvent::BusyChanged { busy: false });
        outcome
    }

    fn report_failure(&self, kind: &str, error: HearthError) -> DispatchOutcome {
        tracing::warn!("[Dispatch] {} request failed: {}", kind, error);
        self.inner.emit(SessionEvent::DispatchFailed {
            error: error.clone(),
        });
        DispatchOutcome::Failed(error)
    }

    // ============================================================================
    // Issue drafts
    // ============================================================================

    /// The draft the user can currently confirm or modify.
    pub async fn active_issue_draft(&self) -> Option<(MessageId, IssueDraft)> {
        self.inner.state.lock().await.drafts.active().cloned()
    }

    /// Confirms the draft carried by `message_id` through an action dispatch.
    pub async fn confirm_issue_draft(&self, message_id: &MessageId) -> DispatchOutcome {
        let action = self.inner.state.lock().await.drafts.confirm_action(message_id);
        let Some(action) = action else {
            return DispatchOutcome::Rejected(RejectReason::NotActionable);
        };

        let outcome = self.invoke_action(action).await;
        if outcome.is_delivered() {
            self.inner.state.lock().await.drafts.resolve(message_id);
            tracing::info!("[IssueDraft] Draft {} confirmed", message_id);
        }
        outcome
    }

    /// Asks the assistant to revise the draft carried by `message_id`.
    ///
    /// This is a normal chat turn referencing the draft's title.
    pub async fn modify_issue_draft(&self, message_id: &MessageId) -> DispatchOutcome {
        let text = self.inner.state.lock().await.drafts.modify_text(message_id);
        match text {
            Ok(Some(text)) => self.submit_text(text).await,
            Ok(None) => DispatchOutcome::Rejected(RejectReason::NotActionable),
            Err(e) => self.report_failure("modify", e),
        }
    }

    // ============================================================================
    // Lifecycle
    // ============================================================================

    /// Starts the conversation over.
    ///
    /// Any in-flight dispatch is discarded, server and local history are
    /// cleared, the context is re-resolved and the greeting is awaited
    /// again. Dispatches are rejected with `NotOpen` until the greeting is
    /// stored. A reset overtaken by a newer one returns `Ok` without opening.
    pub async fn reset(&self) -> Result<()> {
        let inner = &self.inner;
        if inner.root.is_cancelled() {
            return Err(HearthError::ConversationNotOpen);
        }

        let (epoch, was_busy) = {
            let mut state = inner.state.lock().await;
            state.epoch.cancel();
            state.epoch = inner.root.child_token();
            state.store.reset();
            state.drafts.clear();
            state.context = None;
            inner.replace_feed_task(None);
            (state.epoch.clone(), state.dispatch.finish().is_some())
        };
        if was_busy {
            inner.emit(SessionEvent::BusyChanged { busy: false });
        }
        inner.emit(SessionEvent::Reset);

        if let Err(e) = inner.service.reset().await {
            // Re-opening starts a fresh server-side conversation anyway.
            tracing::warn!("[Session] Service reset failed: {}", e);
        }

        tracing::info!("[Session] Conversation reset");
        match self.start_conversation(epoch).await {
            Err(HearthError::StaleResponse) if !self.is_closed() => {
                tracing::debug!("[Session] Reset superseded by a newer one");
                Ok(())
            }
            Err(HearthError::StaleResponse) => Err(HearthError::ConversationNotOpen),
            outcome => outcome,
        }
    }

    /// Tears the session down. Idempotent.
    ///
    /// Cancels the in-flight dispatch (its response will be discarded) and
    /// releases the message feed.
    pub fn close(&self) {
        let inner = &self.inner;
        if inner.root.is_cancelled() {
            return;
        }
        inner.root.cancel();
        inner.replace_feed_task(None);
        inner.emit(SessionEvent::Closed);
        tracing::info!("[Session] Closed");
    }

    pub fn is_closed(&self) -> bool {
        self.inner.root.is_cancelled()
    }

    // ============================================================================
    // Snapshots for rendering
    // ============================================================================

    /// A copy of the stored history, in order.
    pub async fn messages(&self) -> Vec<Message> {
        self.inner.state.lock().await.store.messages().to_vec()
    }

    pub async fn message_count(&self) -> usize {
        self.inner.state.lock().await.store.len()
    }

    pub async fn is_busy(&self) -> bool {
        self.inner.state.lock().await.dispatch.is_busy()
    }

    /// The user echo of the in-flight dispatch, not yet part of the history.
    pub async fn pending_message(&self) -> Option<Message> {
        self.inner.state.lock().await.dispatch.pending().cloned()
    }

    pub async fn context(&self) -> Option<ConversationContext> {
        self.inner.state.lock().await.context.clone()
    }

    /// Quick replies offered by the latest assistant message.
    pub async fn latest_quick_replies(&self) -> Vec<QuickReply> {
        let state = self.inner.state.lock().await;
        state
            .store
            .messages()
            .last()
            .map(|m| m.quick_replies().to_vec())
            .unwrap_or_default()
    }

    /// Actions offered by the latest assistant message.
    pub async fn latest_actions(&self) -> Vec<Action> {
        let state = self.inner.state.lock().await;
        state
            .store
            .messages()
            .last()
            .map(|m| m.actions().to_vec())
            .unwrap_or_default()
    }
}

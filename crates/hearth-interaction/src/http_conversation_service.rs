//! HttpConversationService - REST implementation of the conversation service.
//!
//! Endpoints, relative to `service_url`:
//! - `POST /conversations` opens a conversation and returns the greeting
//! - `POST /conversations/{id}/messages` sends free text
//! - `POST /conversations/{id}/quick-replies` forwards a quick reply payload
//! - `POST /conversations/{id}/actions` invokes an action
//! - `DELETE /conversations/{id}` clears server-side state

use crate::dto::{
    ActionRequest, MessagesResponse, OpenConversationResponse, QuickReplyRequest,
    SendMessageRequest,
};
use async_trait::async_trait;
use hearth_core::config::AssistantConfig;
use hearth_core::context::ConversationContext;
use hearth_core::conversation::{Action, ConversationService, Message, MessageFeed, QuickReply};
use hearth_core::{HearthError, Result};
use reqwest::{Client, RequestBuilder, Response};
use serde::Serialize;
use std::time::Duration;
use tokio::sync::RwLock;

/// Conversation service reached over HTTP with JSON bodies.
///
/// The service answers every call synchronously, so the feed returned by
/// `open` carries the greeting and then ends.
pub struct HttpConversationService {
    client: Client,
    base_url: String,
    access_token: Option<String>,
    timeout: Duration,
    conversation_id: RwLock<Option<String>>,
}

impl HttpConversationService {
    pub fn new(base_url: impl Into<String>, access_token: Option<String>, timeout: Duration) -> Self {
        Self {
            client: Client::new(),
            base_url: base_url.into().trim_end_matches('/').to_string(),
            access_token,
            timeout,
            conversation_id: RwLock::new(None),
        }
    }

    pub fn from_config(config: &AssistantConfig) -> Self {
        Self::new(
            config.service_url.clone(),
            config.access_token.clone(),
            config.dispatch_timeout(),
        )
    }

    fn authorize(&self, request: RequestBuilder) -> RequestBuilder {
        let request = request.timeout(self.timeout);
        match &self.access_token {
            Some(token) => request.bearer_auth(token),
            None => request,
        }
    }

    async fn conversation_url(&self, suffix: &str) -> Result<String> {
        let id = self.conversation_id.read().await;
        let id = id.as_deref().ok_or(HearthError::ConversationNotOpen)?;
        Ok(format!("{}/conversations/{}{}", self.base_url, id, suffix))
    }

    async fn post_for_messages<B: Serialize + ?Sized>(
        &self,
        suffix: &str,
        body: &B,
    ) -> Result<Vec<Message>> {
        let url = self.conversation_url(suffix).await?;
        let response = self
            .authorize(self.client.post(&url).json(body))
            .send()
            .await
            .map_err(|e| self.map_transport_error(e))?;
        let response = check_status(response, &url)?;
        let body: MessagesResponse = response
            .json()
            .await
            .map_err(|e| HearthError::dispatch_failed(format!("invalid response body: {}", e)))?;

        let messages = body.into_messages();
        tracing::debug!(
            "[HttpConversation] {} returned {} message(s)",
            suffix,
            messages.len()
        );
        Ok(messages)
    }

    fn map_transport_error(&self, err: reqwest::Error) -> HearthError {
        if err.is_timeout() {
            HearthError::timeout(self.timeout.as_secs())
        } else {
            HearthError::dispatch_failed(err.to_string())
        }
    }
}

fn check_status(response: Response, url: &str) -> Result<Response> {
    let status = response.status();
    if status.is_success() {
        Ok(response)
    } else {
        Err(HearthError::dispatch_failed(format!(
            "{} returned {}",
            url, status
        )))
    }
}

#[async_trait]
impl ConversationService for HttpConversationService {
    async fn open(&self, context: &ConversationContext) -> Result<MessageFeed> {
        let url = format!("{}/conversations", self.base_url);
        let response = self
            .authorize(self.client.post(&url).json(context))
            .send()
            .await
            .map_err(|e| self.map_transport_error(e))?;
        let response = check_status(response, &url)?;
        let body: OpenConversationResponse = response
            .json()
            .await
            .map_err(|e| HearthError::dispatch_failed(format!("invalid response body: {}", e)))?;

        tracing::info!(
            "[HttpConversation] Opened conversation {} as {}",
            body.conversation_id,
            context.role().as_str()
        );
        *self.conversation_id.write().await = Some(body.conversation_id);

        let greeting = body.messages.into_iter().map(Into::into).collect();
        Ok(MessageFeed::from_messages(greeting))
    }

    async fn send(&self, text: &str) -> Result<Vec<Message>> {
        self.post_for_messages("/messages", &SendMessageRequest { text })
            .await
    }

    async fn select_quick_reply(&self, reply: &QuickReply) -> Result<Vec<Message>> {
        let body = QuickReplyRequest {
            quick_reply_id: &reply.id,
            payload: &reply.payload,
        };
        self.post_for_messages("/quick-replies", &body).await
    }

    async fn invoke_action(&self, action: &Action) -> Result<Vec<Message>> {
        self.post_for_messages("/actions", &ActionRequest::from(action))
            .await
    }

    async fn reset(&self) -> Result<()> {
        let Some(id) = self.conversation_id.write().await.take() else {
            return Ok(());
        };
        let url = format!("{}/conversations/{}", self.base_url, id);
        let response = self
            .authorize(self.client.delete(&url))
            .send()
            .await
            .map_err(|e| self.map_transport_error(e))?;
        check_status(response, &url)?;
        tracing::info!("[HttpConversation] Reset conversation {}", id);
        Ok(())
    }
}

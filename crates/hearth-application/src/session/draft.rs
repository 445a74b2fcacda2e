//! Issue draft workflow: suggest, then confirm or modify.

use hearth_core::config::AssistantConfig;
use hearth_core::conversation::{Action, IssueDraft, Message, MessageId};
use hearth_core::{HearthError, Result};
use minijinja::{Environment, context};

/// Tracks which issue draft the user can act on.
///
/// Only the most recently received draft is active. Older drafts stay in
/// history but can no longer be confirmed or modified. Modifying is just
/// another chat turn, so no editing state is kept here.
#[derive(Debug, Clone)]
pub struct IssueDraftCoordinator {
    active: Option<(MessageId, IssueDraft)>,
    modify_prompt: String,
    confirm_action_kind: String,
}

impl IssueDraftCoordinator {
    pub fn new(config: &AssistantConfig) -> Self {
        Self {
            active: None,
            modify_prompt: config.modify_prompt.clone(),
            confirm_action_kind: config.confirm_action_kind.clone(),
        }
    }

    /// Scans newly stored messages; the last draft among them becomes active.
    ///
    /// Returns the newly activated draft, if any.
    pub fn observe(&mut self, messages: &[Message]) -> Option<(MessageId, String)> {
        let (id, draft) = messages
            .iter()
            .rev()
            .find_map(|m| m.issue_draft().map(|d| (m.id.clone(), d.clone())))?;
        tracing::info!(
            "[IssueDraft] Draft '{}' is now active ({})",
            draft.suggested_title,
            id
        );
        let title = draft.suggested_title.clone();
        self.active = Some((id.clone(), draft));
        Some((id, title))
    }

    pub fn active(&self) -> Option<&(MessageId, IssueDraft)> {
        self.active.as_ref()
    }

    pub fn is_active(&self, message_id: &MessageId) -> bool {
        self.active_draft(message_id).is_some()
    }

    /// Retires the draft after it was confirmed. A newer draft stays active.
    pub fn resolve(&mut self, message_id: &MessageId) {
        if self.is_active(message_id) {
            self.active = None;
        }
    }

    pub fn clear(&mut self) {
        self.active = None;
    }

    /// The action that confirms the draft, carrying it unchanged as data.
    pub fn confirm_action(&self, message_id: &MessageId) -> Option<Action> {
        let draft = self.active_draft(message_id)?;
        Some(Action {
            id: format!("confirm-{}", message_id),
            label: format!("Create issue \"{}\"", draft.suggested_title),
            kind: self.confirm_action_kind.clone(),
            data: draft.to_payload(),
        })
    }

    /// The chat message asking to revise the draft.
    ///
    /// `Ok(None)` when the draft is not active.
    pub fn modify_text(&self, message_id: &MessageId) -> Result<Option<String>> {
        let Some(draft) = self.active_draft(message_id) else {
            return Ok(None);
        };
        let text = Environment::new()
            .render_str(
                &self.modify_prompt,
                context! {
                    title => &draft.suggested_title,
                    description => &draft.suggested_description,
                    category => &draft.suggested_category,
                    priority => &draft.suggested_priority,
                },
            )
            .map_err(|e| HearthError::config(format!("modify_prompt template: {}", e)))?;
        Ok(Some(text))
    }

    fn active_draft(&self, message_id: &MessageId) -> Option<&IssueDraft> {
        match &self.active {
            Some((id, draft)) if id == message_id => Some(draft),
            _ => None,
        }
    }
}

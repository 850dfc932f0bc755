//! Dashboard conversation review surface.
//!
//! Holds the conversation list of the currently selected avatar and runs
//! on-demand summarization. The list is the only cache: selecting another
//! avatar discards it and re-fetches. Summarization is guarded per
//! conversation, so at most one request per conversation is outstanding,
//! while different conversations may summarize concurrently.

use std::sync::{Arc, Mutex, MutexGuard};

use chrono::Utc;
use dashmap::DashMap;
use dashmap::mapref::entry::Entry;
use tracing::{debug, info};

use zeny_types::chat::ConversationRecord;
use zeny_types::error::ReviewError;
use zeny_types::id::{AvatarId, ConversationId};

use super::repository::ConversationReview;

#[derive(Debug, Default)]
struct ReviewView {
    selection: Option<AvatarId>,
    /// Bumped on every selection change; responses carry the value they
    /// were issued under and are dropped if it moved on.
    generation: u64,
    conversations: Vec<ConversationRecord>,
}

/// Removes a conversation from the in-flight set when the summarize call
/// finishes or its future is dropped.
struct InFlightGuard<'a> {
    in_flight: &'a DashMap<ConversationId, ()>,
    conversation_id: ConversationId,
}

impl Drop for InFlightGuard<'_> {
    fn drop(&mut self) {
        self.in_flight.remove(&self.conversation_id);
    }
}

/// Pull-based review of one avatar's conversations at a time.
pub struct ReviewSurface<R> {
    backend: Arc<R>,
    view: Mutex<ReviewView>,
    in_flight: DashMap<ConversationId, ()>,
}

impl<R: ConversationReview> ReviewSurface<R> {
    pub fn new(backend: Arc<R>) -> Self {
        Self {
            backend,
            view: Mutex::new(ReviewView::default()),
            in_flight: DashMap::new(),
        }
    }

    /// Select an avatar and fetch its conversations.
    ///
    /// The previous list is discarded immediately. Returns the number of
    /// conversations loaded, or `StaleSelection` if another selection
    /// happened before the response arrived.
    pub async fn select_avatar(&self, avatar_id: AvatarId) -> Result<usize, ReviewError> {
        let generation = {
            let mut view = self.view();
            view.generation += 1;
            view.selection = Some(avatar_id.clone());
            view.conversations.clear();
            view.generation
        };
        self.load(avatar_id, generation).await
    }

    /// Re-fetch the current selection. On failure the current list is kept.
    pub async fn refresh(&self) -> Result<usize, ReviewError> {
        let (avatar_id, generation) = {
            let view = self.view();
            let avatar_id = view.selection.clone().ok_or(ReviewError::NoSelection)?;
            (avatar_id, view.generation)
        };
        self.load(avatar_id, generation).await
    }

    async fn load(&self, avatar_id: AvatarId, generation: u64) -> Result<usize, ReviewError> {
        let result = self.backend.list_conversations(&avatar_id).await;

        let mut view = self.view();
        if view.generation != generation {
            debug!(avatar_id = %avatar_id, "Dropping conversation list for a stale selection");
            return Err(ReviewError::StaleSelection);
        }
        let conversations = result?;
        debug!(avatar_id = %avatar_id, count = conversations.len(), "Loaded conversations");
        view.conversations = conversations;
        Ok(view.conversations.len())
    }

    /// The selected avatar, if any.
    pub fn selection(&self) -> Option<AvatarId> {
        self.view().selection.clone()
    }

    /// Snapshot of the current list, in backend order.
    pub fn conversations(&self) -> Vec<ConversationRecord> {
        self.view().conversations.clone()
    }

    pub fn conversation(&self, conversation_id: &ConversationId) -> Option<ConversationRecord> {
        self.view()
            .conversations
            .iter()
            .find(|c| c.id == *conversation_id)
            .cloned()
    }

    pub fn is_summarizing(&self, conversation_id: &ConversationId) -> bool {
        self.in_flight.contains_key(conversation_id)
    }

    /// Whether the summarize action should be offered for a conversation:
    /// it is listed, has no summary, and no request is outstanding.
    pub fn can_summarize(&self, conversation_id: &ConversationId) -> bool {
        let listed_without_summary = self
            .view()
            .conversations
            .iter()
            .any(|c| c.id == *conversation_id && !c.has_summary());
        listed_without_summary && !self.is_summarizing(conversation_id)
    }

    /// Summarize a listed conversation and store the result on its record.
    ///
    /// Refused without calling the backend when the record already has a
    /// summary or a request for it is outstanding. On failure the record is
    /// left untouched and the call may be retried.
    pub async fn summarize(&self, conversation_id: &ConversationId) -> Result<String, ReviewError> {
        let generation = {
            let view = self.view();
            if view.selection.is_none() {
                return Err(ReviewError::NoSelection);
            }
            let record = view
                .conversations
                .iter()
                .find(|c| c.id == *conversation_id)
                .ok_or_else(|| ReviewError::UnknownConversation(conversation_id.clone()))?;
            if record.has_summary() {
                return Err(ReviewError::AlreadySummarized(conversation_id.clone()));
            }
            view.generation
        };

        let _guard = match self.in_flight.entry(conversation_id.clone()) {
            Entry::Occupied(_) => {
                return Err(ReviewError::SummaryInFlight(conversation_id.clone()));
            }
            Entry::Vacant(slot) => {
                slot.insert(());
                InFlightGuard {
                    in_flight: &self.in_flight,
                    conversation_id: conversation_id.clone(),
                }
            }
        };

        let summary = self.backend.summarize(conversation_id).await?;
        if summary.trim().is_empty() {
            return Err(ReviewError::EmptySummary);
        }

        let mut view = self.view();
        if view.generation != generation {
            debug!(conversation_id = %conversation_id, "Dropping summary for a stale selection");
            return Err(ReviewError::StaleSelection);
        }
        let record = view
            .conversations
            .iter_mut()
            .find(|c| c.id == *conversation_id)
            .ok_or_else(|| ReviewError::UnknownConversation(conversation_id.clone()))?;
        if record.has_summary() {
            return Err(ReviewError::AlreadySummarized(conversation_id.clone()));
        }

        record.summary = Some(summary.clone());
        record.ended_at.get_or_insert_with(Utc::now);
        info!(conversation_id = %conversation_id, "Stored conversation summary");
        Ok(summary)
    }

    fn view(&self) -> MutexGuard<'_, ReviewView> {
        self.view.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

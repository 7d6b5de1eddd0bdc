//! Core messaging service: conversation resolution, message append, and
//! paginated reads
//!
//! The service holds no per-request state; every operation is a sequence of
//! independent store calls. Cross-table writes are not atomic: an append that
//! fails after the message insert leaves the conversation-list index stale
//! until the next successful message, never corrupt. The one place that needs
//! real mutual exclusion across requests is conversation creation, which the
//! store closes with an insert-if-absent on the canonical pair key.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use uuid::Uuid;

use courier_common::{Error, Pagination, Result};

use crate::domain::entities::{
    Conversation, ConversationSummary, Message, MessageRecord, Page, PairKey,
};
use crate::repository::MessagingStore;

#[derive(Clone)]
pub struct MessagingService {
    store: Arc<dyn MessagingStore>,
}

impl MessagingService {
    pub fn new(store: Arc<dyn MessagingStore>) -> Self {
        Self { store }
    }

    /// Find the conversation between two users, creating it if none exists.
    ///
    /// Idempotent: both orderings of the same pair resolve to the same
    /// conversation, and concurrent first sends race on a single pair-key row
    /// instead of creating duplicates.
    pub async fn resolve_or_create(&self, sender_id: Uuid, receiver_id: Uuid) -> Result<Uuid> {
        let pair = PairKey::new(sender_id, receiver_id)?;

        if let Some(existing) = self.store.find_conversation_for_pair(&pair).await? {
            return Ok(existing);
        }

        let candidate = Conversation::new(&pair);
        let resolved = self.store.create_conversation(&pair, &candidate).await?;

        if resolved == candidate.conversation_id {
            tracing::info!(conversation_id = %resolved, "created conversation");
        } else {
            tracing::debug!(
                conversation_id = %resolved,
                "lost conversation-creation race, using existing conversation"
            );
        }

        Ok(resolved)
    }

    /// Append a message to a conversation and refresh both participants'
    /// recency index rows.
    ///
    /// A single timestamp is used across all writes. If an index refresh
    /// fails after the message insert, the error is surfaced but the message
    /// stays: the conversation list is stale until the next message, not
    /// corrupt.
    pub async fn append(
        &self,
        conversation_id: Uuid,
        sender_id: Uuid,
        content: String,
    ) -> Result<Message> {
        let conversation = self
            .store
            .find_conversation(conversation_id)
            .await?
            .ok_or_else(|| Error::NotFound("Conversation not found".to_string()))?;

        if !conversation.contains(sender_id) {
            return Err(Error::Validation(
                "Sender is not a participant in this conversation".to_string(),
            ));
        }

        let receiver_id = conversation.other_participant(sender_id)?;

        let record = MessageRecord::new(conversation_id, sender_id, content)?;
        self.store.insert_message(&record).await?;

        for participant in conversation.participant_ids.iter().copied() {
            if let Err(e) = self
                .store
                .touch_user_conversation(participant, conversation_id, record.created_at)
                .await
            {
                tracing::warn!(
                    %conversation_id,
                    user_id = %participant,
                    error = %e,
                    "message stored but conversation index not refreshed; \
                     list ordering is stale until the next message"
                );
                return Err(e);
            }
        }

        Ok(Message::from_record(record, Some(receiver_id)))
    }

    /// List a user's conversations, most recently active first, each enriched
    /// with its newest message
    pub async fn list_conversations(
        &self,
        user_id: Uuid,
        pagination: &Pagination,
    ) -> Result<Page<ConversationSummary>> {
        let total = self.store.count_user_conversations(user_id).await?;
        let rows = self
            .store
            .list_user_conversations(user_id, pagination.limit(), pagination.offset())
            .await?;

        let mut items = Vec::with_capacity(rows.len());
        for row in rows {
            let other = row.other_participant(user_id)?;
            let latest = self.store.latest_message(row.conversation_id).await?;

            items.push(ConversationSummary {
                id: row.conversation_id,
                participant_a: user_id,
                participant_b: other,
                last_message_at: row.last_message_timestamp,
                last_message_content: latest.map(|m| m.message_text),
            });
        }

        Ok(Page {
            total,
            page: pagination.page(),
            limit: pagination.limit(),
            items,
        })
    }

    /// Get a single conversation by id
    pub async fn get_conversation(&self, conversation_id: Uuid) -> Result<ConversationSummary> {
        let conversation = self
            .store
            .find_conversation(conversation_id)
            .await?
            .ok_or_else(|| Error::NotFound("Conversation not found".to_string()))?;

        let (participant_a, participant_b) = conversation.participant_pair()?;
        let latest = self.store.latest_message(conversation_id).await?;

        let (last_message_at, last_message_content) = match latest {
            Some(m) => (m.created_at, Some(m.message_text)),
            None => (conversation.created_at, None),
        };

        Ok(ConversationSummary {
            id: conversation_id,
            participant_a,
            participant_b,
            last_message_at,
            last_message_content,
        })
    }

    /// List a conversation's messages, most recent first.
    ///
    /// `before` restricts the scan to rows strictly older than the given
    /// timestamp; it is the cursor for paging backwards through history. An
    /// unknown conversation yields an empty page.
    pub async fn list_messages(
        &self,
        conversation_id: Uuid,
        before: Option<DateTime<Utc>>,
        pagination: &Pagination,
    ) -> Result<Page<Message>> {
        let total = self.store.count_messages(conversation_id, before).await?;
        let records = self
            .store
            .list_messages(
                conversation_id,
                before,
                pagination.limit(),
                pagination.offset(),
            )
            .await?;

        Ok(Page {
            total,
            page: pagination.page(),
            limit: pagination.limit(),
            items: records
                .into_iter()
                .map(|r| Message::from_record(r, None))
                .collect(),
        })
    }
}

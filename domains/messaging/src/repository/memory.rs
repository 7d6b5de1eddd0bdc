//! In-memory messaging store
//!
//! Test double for `MessagingStore` with the same clustering-order semantics
//! as the PostgreSQL implementation. Also supports failure injection on the
//! recency-index write so tests can exercise the stale-index window that the
//! denormalized layout accepts under partial failure.

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use uuid::Uuid;

use courier_common::{Error, Result};

use crate::domain::entities::{Conversation, MessageRecord, PairKey, UserConversation};
use crate::repository::MessagingStore;

#[derive(Debug, Default)]
struct Inner {
    pairs: HashMap<String, Uuid>,
    conversations: HashMap<Uuid, Conversation>,
    user_conversations: Vec<UserConversation>,
    messages: Vec<MessageRecord>,
}

/// In-memory store for testing
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    inner: Arc<Mutex<Inner>>,
    fail_index_writes: Arc<AtomicBool>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make every subsequent `touch_user_conversation` fail, leaving the
    /// message log ahead of the conversation-list index
    pub fn fail_index_writes(&self, fail: bool) {
        self.fail_index_writes.store(fail, Ordering::SeqCst);
    }

    /// Test support: seed a raw index row, bypassing the invariants the
    /// resolver normally enforces
    pub fn seed_user_conversation(&self, row: UserConversation) {
        self.inner
            .lock()
            .expect("store lock poisoned")
            .user_conversations
            .push(row);
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, Inner> {
        self.inner.lock().expect("store lock poisoned")
    }
}

#[async_trait]
impl MessagingStore for MemoryStore {
    async fn find_conversation(&self, conversation_id: Uuid) -> Result<Option<Conversation>> {
        Ok(self.lock().conversations.get(&conversation_id).cloned())
    }

    async fn find_conversation_for_pair(&self, pair: &PairKey) -> Result<Option<Uuid>> {
        Ok(self.lock().pairs.get(&pair.as_key()).copied())
    }

    async fn create_conversation(&self, pair: &PairKey, candidate: &Conversation) -> Result<Uuid> {
        let mut inner = self.lock();

        if let Some(existing) = inner.pairs.get(&pair.as_key()) {
            return Ok(*existing);
        }

        inner
            .pairs
            .insert(pair.as_key(), candidate.conversation_id);
        inner
            .conversations
            .insert(candidate.conversation_id, candidate.clone());
        for participant in candidate.participant_ids.iter().copied() {
            inner.user_conversations.push(UserConversation {
                user_id: participant,
                last_message_timestamp: candidate.created_at,
                conversation_id: candidate.conversation_id,
                participant_ids: candidate.participant_ids.clone(),
            });
        }

        Ok(candidate.conversation_id)
    }

    async fn insert_message(&self, record: &MessageRecord) -> Result<()> {
        self.lock().messages.push(record.clone());
        Ok(())
    }

    async fn touch_user_conversation(
        &self,
        user_id: Uuid,
        conversation_id: Uuid,
        at: DateTime<Utc>,
    ) -> Result<()> {
        if self.fail_index_writes.load(Ordering::SeqCst) {
            return Err(Error::Internal(
                "injected failure: user_conversations write".to_string(),
            ));
        }

        let mut inner = self.lock();
        for row in inner.user_conversations.iter_mut() {
            if row.user_id == user_id && row.conversation_id == conversation_id {
                // Monotonic: a late-arriving bump never moves the row back
                if at > row.last_message_timestamp {
                    row.last_message_timestamp = at;
                }
            }
        }

        Ok(())
    }

    async fn count_user_conversations(&self, user_id: Uuid) -> Result<i64> {
        let count = self
            .lock()
            .user_conversations
            .iter()
            .filter(|row| row.user_id == user_id)
            .count();
        Ok(count as i64)
    }

    async fn list_user_conversations(
        &self,
        user_id: Uuid,
        limit: i64,
        offset: i64,
    ) -> Result<Vec<UserConversation>> {
        let mut rows: Vec<UserConversation> = self
            .lock()
            .user_conversations
            .iter()
            .filter(|row| row.user_id == user_id)
            .cloned()
            .collect();

        // Clustering order: (last_message_timestamp DESC, conversation_id ASC)
        rows.sort_by(|x, y| {
            y.last_message_timestamp
                .cmp(&x.last_message_timestamp)
                .then(x.conversation_id.cmp(&y.conversation_id))
        });

        Ok(rows
            .into_iter()
            .skip(offset.max(0) as usize)
            .take(limit.max(0) as usize)
            .collect())
    }

    async fn latest_message(&self, conversation_id: Uuid) -> Result<Option<MessageRecord>> {
        Ok(self
            .list_messages(conversation_id, None, 1, 0)
            .await?
            .into_iter()
            .next())
    }

    async fn count_messages(
        &self,
        conversation_id: Uuid,
        before: Option<DateTime<Utc>>,
    ) -> Result<i64> {
        let count = self
            .lock()
            .messages
            .iter()
            .filter(|m| m.conversation_id == conversation_id)
            .filter(|m| before.is_none_or(|ts| m.created_at < ts))
            .count();
        Ok(count as i64)
    }

    async fn list_messages(
        &self,
        conversation_id: Uuid,
        before: Option<DateTime<Utc>>,
        limit: i64,
        offset: i64,
    ) -> Result<Vec<MessageRecord>> {
        let mut records: Vec<MessageRecord> = self
            .lock()
            .messages
            .iter()
            .filter(|m| m.conversation_id == conversation_id)
            .filter(|m| before.is_none_or(|ts| m.created_at < ts))
            .cloned()
            .collect();

        // Clustering order: (created_at DESC, message_id DESC)
        records.sort_by(|x, y| {
            y.created_at
                .cmp(&x.created_at)
                .then(y.message_id.cmp(&x.message_id))
        });

        Ok(records
            .into_iter()
            .skip(offset.max(0) as usize)
            .take(limit.max(0) as usize)
            .collect())
    }
}

//! Storage seam for the Messaging domain
//!
//! `MessagingStore` is the explicit, injectable store handle every component
//! receives instead of a process-wide singleton connection. The operations
//! mirror the wide-column access patterns: every read is a single-partition
//! lookup or range scan, every write fans out to the tables the read paths
//! depend on. `PostgresStore` is the production implementation; `MemoryStore`
//! is the in-process test double.

pub mod memory;
pub mod postgres;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use uuid::Uuid;

use courier_common::Result;

use crate::domain::entities::{Conversation, MessageRecord, PairKey, UserConversation};

pub use memory::MemoryStore;
pub use postgres::PostgresStore;

#[async_trait]
pub trait MessagingStore: Send + Sync {
    /// Point lookup in `conversations`
    async fn find_conversation(&self, conversation_id: Uuid) -> Result<Option<Conversation>>;

    /// Direct lookup of the conversation owning a canonical pair key
    async fn find_conversation_for_pair(&self, pair: &PairKey) -> Result<Option<Uuid>>;

    /// Insert-if-absent keyed by the canonical pair key.
    ///
    /// The winner of a concurrent race writes the `conversations` row and one
    /// `user_conversations` index row per participant; the loser writes
    /// nothing. Returns the conversation id that owns the pair after the
    /// call, which is the candidate's id only if the candidate won.
    async fn create_conversation(&self, pair: &PairKey, candidate: &Conversation) -> Result<Uuid>;

    /// Append one row to the conversation's message log
    async fn insert_message(&self, record: &MessageRecord) -> Result<()>;

    /// Move a user's index row for this conversation to a new recency slot.
    ///
    /// The timestamp is part of the clustering key, so this is a row rewrite,
    /// not a field update. Never moves the timestamp backwards.
    async fn touch_user_conversation(
        &self,
        user_id: Uuid,
        conversation_id: Uuid,
        at: DateTime<Utc>,
    ) -> Result<()>;

    /// Full count of the user's conversation partition
    async fn count_user_conversations(&self, user_id: Uuid) -> Result<i64>;

    /// Range scan of the user's partition in clustering order
    /// `(last_message_timestamp DESC, conversation_id ASC)`
    async fn list_user_conversations(
        &self,
        user_id: Uuid,
        limit: i64,
        offset: i64,
    ) -> Result<Vec<UserConversation>>;

    /// First row of the conversation's message partition, if any
    async fn latest_message(&self, conversation_id: Uuid) -> Result<Option<MessageRecord>>;

    /// Count of the conversation's messages, optionally bounded by an
    /// exclusive upper timestamp
    async fn count_messages(
        &self,
        conversation_id: Uuid,
        before: Option<DateTime<Utc>>,
    ) -> Result<i64>;

    /// Range scan of the conversation's partition in clustering order
    /// `(created_at DESC, message_id DESC)`, optionally bounded by an
    /// exclusive upper timestamp
    async fn list_messages(
        &self,
        conversation_id: Uuid,
        before: Option<DateTime<Utc>>,
        limit: i64,
        offset: i64,
    ) -> Result<Vec<MessageRecord>>;
}

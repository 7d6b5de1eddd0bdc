//! Domain entities for the Messaging domain
//!
//! The stored entities mirror the wide-column table layout one-to-one:
//! `Conversation` is a row of `conversations`, `UserConversation` a row of the
//! per-user recency index, and `MessageRecord` a row of the per-conversation
//! message log. Clustering order lives in the repository queries; the entities
//! here carry the data and the validation rules.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use courier_common::{Error, Result};

/// Maximum message content length
const MAX_CONTENT_LENGTH: usize = 5000;

/// Canonical key for an unordered pair of users.
///
/// Both orderings of the same two users produce the same key, which is what
/// makes conversation creation an insert-if-absent on a single row instead of
/// a partition scan with a duplicate-creation race.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct PairKey {
    lo: Uuid,
    hi: Uuid,
}

impl PairKey {
    /// Canonicalize an unordered pair of distinct users
    pub fn new(a: Uuid, b: Uuid) -> Result<Self> {
        if a == b {
            return Err(Error::Validation(
                "Sender and receiver must be distinct users".to_string(),
            ));
        }
        let (lo, hi) = if a < b { (a, b) } else { (b, a) };
        Ok(Self { lo, hi })
    }

    /// Both participants, in canonical order
    pub fn participants(&self) -> [Uuid; 2] {
        [self.lo, self.hi]
    }

    /// The storable key string
    pub fn as_key(&self) -> String {
        format!("{}:{}", self.lo, self.hi)
    }
}

impl std::fmt::Display for PairKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}:{}", self.lo, self.hi)
    }
}

/// Conversation entity — one row of `conversations`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, sqlx::FromRow)]
pub struct Conversation {
    pub conversation_id: Uuid,
    pub participant_ids: Vec<Uuid>,
    pub created_at: DateTime<Utc>,
}

impl Conversation {
    /// Create a new conversation between the pair's two participants
    pub fn new(pair: &PairKey) -> Self {
        Conversation {
            conversation_id: Uuid::new_v4(),
            participant_ids: pair.participants().to_vec(),
            created_at: Utc::now(),
        }
    }

    /// Whether the given user is a participant
    pub fn contains(&self, user_id: Uuid) -> bool {
        self.participant_ids.contains(&user_id)
    }

    /// The participant that is not `user_id`.
    ///
    /// Unreachable for well-formed rows; checked defensively because the
    /// participant set is denormalized into several tables.
    pub fn other_participant(&self, user_id: Uuid) -> Result<Uuid> {
        other_of(&self.participant_ids, user_id)
    }

    /// Both participants of a well-formed two-party conversation
    pub fn participant_pair(&self) -> Result<(Uuid, Uuid)> {
        match self.participant_ids.as_slice() {
            [a, b] if a != b => Ok((*a, *b)),
            _ => Err(Error::DataIntegrity(format!(
                "Conversation {} does not have exactly two distinct participants",
                self.conversation_id
            ))),
        }
    }
}

/// Per-user conversation index entry — one row of `user_conversations`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, sqlx::FromRow)]
pub struct UserConversation {
    pub user_id: Uuid,
    pub last_message_timestamp: DateTime<Utc>,
    pub conversation_id: Uuid,
    pub participant_ids: Vec<Uuid>,
}

impl UserConversation {
    /// The participant that is not `user_id`
    pub fn other_participant(&self, user_id: Uuid) -> Result<Uuid> {
        other_of(&self.participant_ids, user_id)
    }
}

fn other_of(participant_ids: &[Uuid], user_id: Uuid) -> Result<Uuid> {
    participant_ids
        .iter()
        .copied()
        .find(|id| *id != user_id)
        .ok_or_else(|| {
            Error::DataIntegrity(format!(
                "Participant set contains no user other than {}",
                user_id
            ))
        })
}

/// Stored message — one row of `messages_by_conversation`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, sqlx::FromRow)]
pub struct MessageRecord {
    pub conversation_id: Uuid,
    pub created_at: DateTime<Utc>,
    pub message_id: Uuid,
    pub sender_id: Uuid,
    pub message_text: String,
}

impl MessageRecord {
    /// Create a new message record with a fresh id and a single timestamp
    /// reused by every denormalized write of the append
    pub fn new(conversation_id: Uuid, sender_id: Uuid, content: String) -> Result<Self> {
        Self::validate_content(&content)?;

        Ok(MessageRecord {
            conversation_id,
            created_at: Utc::now(),
            message_id: Uuid::new_v4(),
            sender_id,
            message_text: content,
        })
    }

    fn validate_content(content: &str) -> Result<()> {
        if content.trim().is_empty() {
            return Err(Error::Validation(
                "Message content cannot be empty or whitespace-only".to_string(),
            ));
        }
        // Character count, matching the request-layer length validation
        if content.chars().count() > MAX_CONTENT_LENGTH {
            return Err(Error::Validation(format!(
                "Message content must be at most {} characters",
                MAX_CONTENT_LENGTH
            )));
        }
        Ok(())
    }
}

/// Message as returned to callers.
///
/// `receiver_id` is not persisted; it is derived from the conversation's
/// participant set on the synchronous send path and absent on history reads.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Message {
    pub id: Uuid,
    pub conversation_id: Uuid,
    pub sender_id: Uuid,
    pub receiver_id: Option<Uuid>,
    pub content: String,
    pub created_at: DateTime<Utc>,
}

impl Message {
    pub fn from_record(record: MessageRecord, receiver_id: Option<Uuid>) -> Self {
        Message {
            id: record.message_id,
            conversation_id: record.conversation_id,
            sender_id: record.sender_id,
            receiver_id,
            content: record.message_text,
            created_at: record.created_at,
        }
    }
}

/// One item of a user's conversation list
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConversationSummary {
    pub id: Uuid,
    pub participant_a: Uuid,
    pub participant_b: Uuid,
    pub last_message_at: DateTime<Utc>,
    pub last_message_content: Option<String>,
}

/// A page of results plus the full count for the scanned partition
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Page<T> {
    pub total: i64,
    pub page: i64,
    pub limit: i64,
    pub items: Vec<T>,
}

impl<T> Page<T> {
    pub fn map<U>(self, f: impl FnMut(T) -> U) -> Page<U> {
        Page {
            total: self.total,
            page: self.page,
            limit: self.limit,
            items: self.items.into_iter().map(f).collect(),
        }
    }
}

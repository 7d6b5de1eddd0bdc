//! PostgreSQL implementation of the messaging store
//!
//! The tables reproduce the wide-column layout row for row: composite primary
//! keys carry the partition + clustering structure, and every range scan
//! states the clustering order explicitly in its `ORDER BY`.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;
use uuid::Uuid;

use courier_common::Result;

use crate::domain::entities::{Conversation, MessageRecord, PairKey, UserConversation};
use crate::repository::MessagingStore;

#[derive(Clone)]
pub struct PostgresStore {
    pool: PgPool,
}

impl PostgresStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Get a reference to the underlying pool
    pub fn pool(&self) -> &PgPool {
        &self.pool
    }
}

#[async_trait]
impl MessagingStore for PostgresStore {
    async fn find_conversation(&self, conversation_id: Uuid) -> Result<Option<Conversation>> {
        let conv = sqlx::query_as::<_, Conversation>(
            r#"
            SELECT conversation_id, participant_ids, created_at
            FROM conversations
            WHERE conversation_id = $1
            "#,
        )
        .bind(conversation_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(conv)
    }

    async fn find_conversation_for_pair(&self, pair: &PairKey) -> Result<Option<Uuid>> {
        let id = sqlx::query_scalar::<_, Uuid>(
            "SELECT conversation_id FROM conversation_pairs WHERE pair_key = $1",
        )
        .bind(pair.as_key())
        .fetch_optional(&self.pool)
        .await?;

        Ok(id)
    }

    async fn create_conversation(&self, pair: &PairKey, candidate: &Conversation) -> Result<Uuid> {
        let mut tx = self.pool.begin().await?;

        // The pair row is the synchronization point: exactly one concurrent
        // creator claims it.
        let claimed = sqlx::query(
            r#"
            INSERT INTO conversation_pairs (pair_key, conversation_id)
            VALUES ($1, $2)
            ON CONFLICT (pair_key) DO NOTHING
            "#,
        )
        .bind(pair.as_key())
        .bind(candidate.conversation_id)
        .execute(&mut *tx)
        .await?;

        if claimed.rows_affected() == 0 {
            tx.rollback().await?;

            let existing = sqlx::query_scalar::<_, Uuid>(
                "SELECT conversation_id FROM conversation_pairs WHERE pair_key = $1",
            )
            .bind(pair.as_key())
            .fetch_one(&self.pool)
            .await?;

            return Ok(existing);
        }

        sqlx::query(
            r#"
            INSERT INTO conversations (conversation_id, participant_ids, created_at)
            VALUES ($1, $2, $3)
            "#,
        )
        .bind(candidate.conversation_id)
        .bind(&candidate.participant_ids)
        .bind(candidate.created_at)
        .execute(&mut *tx)
        .await?;

        // One index row per participant, both with the same initial timestamp
        for participant in candidate.participant_ids.iter() {
            sqlx::query(
                r#"
                INSERT INTO user_conversations
                    (user_id, last_message_timestamp, conversation_id, participant_ids)
                VALUES ($1, $2, $3, $4)
                "#,
            )
            .bind(participant)
            .bind(candidate.created_at)
            .bind(candidate.conversation_id)
            .bind(&candidate.participant_ids)
            .execute(&mut *tx)
            .await?;
        }

        tx.commit().await?;
        Ok(candidate.conversation_id)
    }

    async fn insert_message(&self, record: &MessageRecord) -> Result<()> {
        sqlx::query(
            r#"
            INSERT INTO messages_by_conversation
                (conversation_id, created_at, message_id, sender_id, message_text)
            VALUES ($1, $2, $3, $4, $5)
            "#,
        )
        .bind(record.conversation_id)
        .bind(record.created_at)
        .bind(record.message_id)
        .bind(record.sender_id)
        .bind(&record.message_text)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    async fn touch_user_conversation(
        &self,
        user_id: Uuid,
        conversation_id: Uuid,
        at: DateTime<Utc>,
    ) -> Result<()> {
        // last_message_timestamp is part of the primary key; updating it
        // rewrites the index entry, the SQL equivalent of the wide-column
        // delete-old-row-insert-new-row. GREATEST keeps the recency pointer
        // monotonic under out-of-order arrivals.
        sqlx::query(
            r#"
            UPDATE user_conversations
            SET last_message_timestamp = GREATEST(last_message_timestamp, $3)
            WHERE user_id = $1 AND conversation_id = $2
            "#,
        )
        .bind(user_id)
        .bind(conversation_id)
        .bind(at)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    async fn count_user_conversations(&self, user_id: Uuid) -> Result<i64> {
        let count = sqlx::query_scalar::<_, i64>(
            "SELECT COUNT(*) FROM user_conversations WHERE user_id = $1",
        )
        .bind(user_id)
        .fetch_one(&self.pool)
        .await?;

        Ok(count)
    }

    async fn list_user_conversations(
        &self,
        user_id: Uuid,
        limit: i64,
        offset: i64,
    ) -> Result<Vec<UserConversation>> {
        let rows = sqlx::query_as::<_, UserConversation>(
            r#"
            SELECT user_id, last_message_timestamp, conversation_id, participant_ids
            FROM user_conversations
            WHERE user_id = $1
            ORDER BY last_message_timestamp DESC, conversation_id ASC
            LIMIT $2 OFFSET $3
            "#,
        )
        .bind(user_id)
        .bind(limit)
        .bind(offset)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows)
    }

    async fn latest_message(&self, conversation_id: Uuid) -> Result<Option<MessageRecord>> {
        let record = sqlx::query_as::<_, MessageRecord>(
            r#"
            SELECT conversation_id, created_at, message_id, sender_id, message_text
            FROM messages_by_conversation
            WHERE conversation_id = $1
            ORDER BY created_at DESC, message_id DESC
            LIMIT 1
            "#,
        )
        .bind(conversation_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(record)
    }

    async fn count_messages(
        &self,
        conversation_id: Uuid,
        before: Option<DateTime<Utc>>,
    ) -> Result<i64> {
        let count = match before {
            Some(ts) => {
                sqlx::query_scalar::<_, i64>(
                    r#"
                    SELECT COUNT(*) FROM messages_by_conversation
                    WHERE conversation_id = $1 AND created_at < $2
                    "#,
                )
                .bind(conversation_id)
                .bind(ts)
                .fetch_one(&self.pool)
                .await?
            }
            None => {
                sqlx::query_scalar::<_, i64>(
                    "SELECT COUNT(*) FROM messages_by_conversation WHERE conversation_id = $1",
                )
                .bind(conversation_id)
                .fetch_one(&self.pool)
                .await?
            }
        };

        Ok(count)
    }

    async fn list_messages(
        &self,
        conversation_id: Uuid,
        before: Option<DateTime<Utc>>,
        limit: i64,
        offset: i64,
    ) -> Result<Vec<MessageRecord>> {
        let records = match before {
            Some(ts) => {
                sqlx::query_as::<_, MessageRecord>(
                    r#"
                    SELECT conversation_id, created_at, message_id, sender_id, message_text
                    FROM messages_by_conversation
                    WHERE conversation_id = $1 AND created_at < $2
                    ORDER BY created_at DESC, message_id DESC
                    LIMIT $3 OFFSET $4
                    "#,
                )
                .bind(conversation_id)
                .bind(ts)
                .bind(limit)
                .bind(offset)
                .fetch_all(&self.pool)
                .await?
            }
            None => {
                sqlx::query_as::<_, MessageRecord>(
                    r#"
                    SELECT conversation_id, created_at, message_id, sender_id, message_text
                    FROM messages_by_conversation
                    WHERE conversation_id = $1
                    ORDER BY created_at DESC, message_id DESC
                    LIMIT $2 OFFSET $3
                    "#,
                )
                .bind(conversation_id)
                .bind(limit)
                .bind(offset)
                .fetch_all(&self.pool)
                .await?
            }
        };

        Ok(records)
    }
}

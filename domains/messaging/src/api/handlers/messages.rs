//! Message API handlers

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use chrono::{DateTime, Utc};
use courier_common::{Pagination, Result, ValidatedJson};
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

use crate::api::middleware::MessagingState;
use crate::domain::entities::{Message, Page};

/// Request for sending a message
#[derive(Debug, Deserialize, Validate)]
pub struct SendMessageRequest {
    pub sender_id: Uuid,
    pub receiver_id: Uuid,

    /// Message content
    #[validate(length(min = 1, max = 5000))]
    pub content: String,
}

/// Query params for listing messages
#[derive(Debug, Deserialize)]
pub struct ListMessagesQuery {
    /// Exclusive upper bound for backward pagination through history
    pub before_timestamp: Option<DateTime<Utc>>,
    pub page: Option<i64>,
    pub limit: Option<i64>,
}

/// Message response DTO
#[derive(Debug, Serialize)]
pub struct MessageResponse {
    pub id: Uuid,
    pub conversation_id: Uuid,
    pub sender_id: Uuid,
    pub receiver_id: Option<Uuid>,
    pub content: String,
    pub created_at: DateTime<Utc>,
}

impl From<Message> for MessageResponse {
    fn from(m: Message) -> Self {
        Self {
            id: m.id,
            conversation_id: m.conversation_id,
            sender_id: m.sender_id,
            receiver_id: m.receiver_id,
            content: m.content,
            created_at: m.created_at,
        }
    }
}

/// Send a message, creating the conversation on first contact
pub async fn send_message(
    State(state): State<MessagingState>,
    ValidatedJson(req): ValidatedJson<SendMessageRequest>,
) -> Result<(StatusCode, Json<MessageResponse>)> {
    let conversation_id = state
        .service
        .resolve_or_create(req.sender_id, req.receiver_id)
        .await?;

    let message = state
        .service
        .append(conversation_id, req.sender_id, req.content)
        .await?;

    Ok((StatusCode::CREATED, Json(message.into())))
}

/// List a conversation's messages, most recent first
pub async fn list_messages(
    State(state): State<MessagingState>,
    Path(conversation_id): Path<Uuid>,
    Query(query): Query<ListMessagesQuery>,
) -> Result<Json<Page<MessageResponse>>> {
    let pagination = Pagination {
        page: query.page,
        limit: query.limit,
    };

    let page = state
        .service
        .list_messages(conversation_id, query.before_timestamp, &pagination)
        .await?;

    Ok(Json(page.map(Into::into)))
}

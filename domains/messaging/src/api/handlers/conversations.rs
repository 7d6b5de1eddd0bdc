//! Conversation API handlers

use axum::{
    extract::{Path, Query, State},
    Json,
};
use chrono::{DateTime, Utc};
use courier_common::{Pagination, Result};
use serde::Serialize;
use uuid::Uuid;

use crate::api::middleware::MessagingState;
use crate::domain::entities::{ConversationSummary, Page};

/// Conversation response DTO
#[derive(Debug, Serialize)]
pub struct ConversationResponse {
    pub id: Uuid,
    pub participant_a: Uuid,
    pub participant_b: Uuid,
    pub last_message_at: DateTime<Utc>,
    pub last_message_content: Option<String>,
}

impl From<ConversationSummary> for ConversationResponse {
    fn from(s: ConversationSummary) -> Self {
        Self {
            id: s.id,
            participant_a: s.participant_a,
            participant_b: s.participant_b,
            last_message_at: s.last_message_at,
            last_message_content: s.last_message_content,
        }
    }
}

/// List a user's conversations, most recently active first
pub async fn list_user_conversations(
    State(state): State<MessagingState>,
    Path(user_id): Path<Uuid>,
    Query(pagination): Query<Pagination>,
) -> Result<Json<Page<ConversationResponse>>> {
    let page = state
        .service
        .list_conversations(user_id, &pagination)
        .await?;
    Ok(Json(page.map(Into::into)))
}

/// Get a single conversation by ID
pub async fn get_conversation(
    State(state): State<MessagingState>,
    Path(id): Path<Uuid>,
) -> Result<Json<ConversationResponse>> {
    let summary = state.service.get_conversation(id).await?;
    Ok(Json(summary.into()))
}

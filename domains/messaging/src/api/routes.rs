//! Route definitions for Messaging domain API

use axum::{
    routing::{get, post},
    Router,
};

use super::handlers::{conversations, messages};
use super::middleware::MessagingState;

/// Create conversation routes
fn conversation_routes() -> Router<MessagingState> {
    Router::new()
        .route(
            "/v1/users/{user_id}/conversations",
            get(conversations::list_user_conversations),
        )
        .route(
            "/v1/conversations/{id}",
            get(conversations::get_conversation),
        )
}

/// Create message routes
fn message_routes() -> Router<MessagingState> {
    Router::new()
        .route("/v1/messages", post(messages::send_message))
        .route(
            "/v1/conversations/{conversation_id}/messages",
            get(messages::list_messages),
        )
}

/// Create all Messaging domain API routes
pub fn routes() -> Router<MessagingState> {
    Router::new()
        .merge(conversation_routes())
        .merge(message_routes())
}

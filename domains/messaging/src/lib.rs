//! Messaging domain: two-party conversations, denormalized message storage

pub mod api;
pub mod domain;
pub mod repository;
pub mod service;

// Re-export domain types at the crate root for convenience
pub use domain::entities::{
    Conversation, ConversationSummary, Message, MessageRecord, Page, PairKey, UserConversation,
};

// Re-export the storage seam
pub use repository::{MemoryStore, MessagingStore, PostgresStore};

// Re-export the core service
pub use service::MessagingService;

// Re-export API types
pub use api::routes::routes;
pub use api::MessagingState;

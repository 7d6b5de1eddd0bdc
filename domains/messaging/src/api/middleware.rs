//! Messaging domain state

use crate::service::MessagingService;

/// Application state for the Messaging domain
#[derive(Clone)]
pub struct MessagingState {
    pub service: MessagingService,
}

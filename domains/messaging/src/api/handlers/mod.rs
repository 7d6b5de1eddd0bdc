//! API handlers for the Messaging domain

pub mod conversations;
pub mod messages;

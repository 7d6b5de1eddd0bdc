//! HTTP API layer for the Messaging domain
//!
//! Thin transport shim: request validation and status-code mapping only. All
//! semantics live in [`crate::service::MessagingService`].

pub mod handlers;
pub mod middleware;
pub mod routes;

pub use middleware::MessagingState;

//! Router-level API tests for the Messaging domain

mod common;
mod conversations;
mod messages;

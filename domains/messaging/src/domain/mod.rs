//! Domain model for the Messaging domain

pub mod entities;

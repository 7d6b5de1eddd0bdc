//! Shared utilities, configuration, and error handling for Courier
//!
//! This crate provides common functionality used across the Courier application:
//! - Configuration management following 12-factor principles
//! - Error types and handling
//! - Pagination and request-validation extractors

pub mod config;
pub mod error;
pub mod extractors;

pub use config::Config;
pub use error::{Error, Result};
pub use extractors::{Pagination, ValidatedJson};

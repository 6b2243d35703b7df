//! Shared utilities, configuration, and error handling for wfport
//!
//! This crate provides common functionality used across the service:
//! - Configuration management following 12-factor principles
//! - Error types and handling
//! - Request extractors

pub mod config;
pub mod db;
pub mod error;
pub mod extractors;

pub use config::{Config, StorageBackend};
pub use db::RepositoryError;
pub use error::{Error, Result};
pub use extractors::ValidatedJson;

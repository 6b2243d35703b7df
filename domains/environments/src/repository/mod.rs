//! Repository implementations for the Environments domain

pub mod environments;
pub mod memory;

use wfport_common::Result;

use crate::domain::entities::{Environment, NewEnvironment};

pub use environments::PgEnvironmentDirectory;
pub use memory::InMemoryEnvironmentDirectory;

/// Key-value directory of registered environments.
///
/// Registration is the only write; entries are never updated or deleted.
#[async_trait::async_trait]
pub trait EnvironmentDirectory: Send + Sync {
    /// Validate and store a new environment, returning it with its generated id
    async fn register(&self, new: NewEnvironment) -> Result<Environment>;

    /// Snapshot of every registered environment, oldest first
    async fn list_all(&self) -> Result<Vec<Environment>>;

    /// Look up one environment by id
    async fn find(&self, id: &str) -> Result<Option<Environment>>;
}

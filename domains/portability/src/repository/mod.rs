//! Repository implementations for the Portability domain

pub mod memory;
pub mod test_events;

use uuid::Uuid;

use wfport_common::Result;

use crate::domain::entities::{PortabilityTest, TestEvent};

pub use memory::{InMemoryEventLog, InMemoryTestStore};
pub use portability_tests::PgTestStore;
pub use test_events::PgEventLog;

/// Append-only event history, partitioned by test id
#[async_trait::async_trait]
pub trait EventLog: Send + Sync {
    /// Append one event. Either the whole event is stored or nothing is.
    async fn append(&self, event: TestEvent) -> Result<()>;

    /// Every event recorded for a test, in no particular order
    async fn list_by_test(&self, test_id: Uuid) -> Result<Vec<TestEvent>>;
}

/// Record of each test's fan-out
#[async_trait::async_trait]
pub trait TestStore: Send + Sync {
    async fn create(&self, test: &PortabilityTest) -> Result<()>;

    async fn find(&self, test_id: Uuid) -> Result<Option<PortabilityTest>>;
}

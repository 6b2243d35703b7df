//! In-memory event log and test store
//!
//! Thread-safe via `Arc<RwLock<>>`. Appends happen under the write lock, so
//! concurrent appends never interleave partially.

use std::collections::HashMap;
use std::sync::{Arc, RwLock};

use uuid::Uuid;

use wfport_common::{RepositoryError, Result};

use super::{EventLog, TestStore};
use crate::domain::entities::{PortabilityTest, TestEvent};

#[derive(Debug, Clone, Default)]
pub struct InMemoryEventLog {
    events: Arc<RwLock<HashMap<Uuid, Vec<TestEvent>>>>,
}

impl InMemoryEventLog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Total number of stored events across all tests
    pub fn len(&self) -> usize {
        self.events
            .read()
            .map(|events| events.values().map(Vec::len).sum())
            .unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[async_trait::async_trait]
impl EventLog for InMemoryEventLog {
    async fn append(&self, event: TestEvent) -> Result<()> {
        self.events
            .write()
            .map_err(RepositoryError::from)?
            .entry(event.test_id)
            .or_default()
            .push(event);
        Ok(())
    }

    async fn list_by_test(&self, test_id: Uuid) -> Result<Vec<TestEvent>> {
        Ok(self
            .events
            .read()
            .map_err(RepositoryError::from)?
            .get(&test_id)
            .cloned()
            .unwrap_or_default())
    }
}

#[derive(Debug, Clone, Default)]
pub struct InMemoryTestStore {
    tests: Arc<RwLock<HashMap<Uuid, PortabilityTest>>>,
}

impl InMemoryTestStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait::async_trait]
impl TestStore for InMemoryTestStore {
    async fn create(&self, test: &PortabilityTest) -> Result<()> {
        self.tests
            .write()
            .map_err(RepositoryError::from)?
            .insert(test.id, test.clone());
        Ok(())
    }

    async fn find(&self, test_id: Uuid) -> Result<Option<PortabilityTest>> {
        Ok(self
            .tests
            .read()
            .map_err(RepositoryError::from)?
            .get(&test_id)
            .cloned())
    }
}

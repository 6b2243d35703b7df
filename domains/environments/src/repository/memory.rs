//! In-memory environment directory
//!
//! Reference implementation used by the local server and tests.
//! Thread-safe via `Arc<RwLock<>>`.

use std::sync::{Arc, RwLock};

use wfport_common::{RepositoryError, Result};

use super::EnvironmentDirectory;
use crate::domain::entities::{Environment, NewEnvironment};

#[derive(Debug, Clone, Default)]
pub struct InMemoryEnvironmentDirectory {
    environments: Arc<RwLock<Vec<Environment>>>,
}

impl InMemoryEnvironmentDirectory {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed the directory with already-built environments
    pub fn with_environments(environments: Vec<Environment>) -> Self {
        Self {
            environments: Arc::new(RwLock::new(environments)),
        }
    }
}

#[async_trait::async_trait]
impl EnvironmentDirectory for InMemoryEnvironmentDirectory {
    async fn register(&self, new: NewEnvironment) -> Result<Environment> {
        let environment = Environment::new(new)?;
        self.environments
            .write()
            .map_err(RepositoryError::from)?
            .push(environment.clone());
        Ok(environment)
    }

    async fn list_all(&self) -> Result<Vec<Environment>> {
        Ok(self
            .environments
            .read()
            .map_err(RepositoryError::from)?
            .clone())
    }

    async fn find(&self, id: &str) -> Result<Option<Environment>> {
        Ok(self
            .environments
            .read()
            .map_err(RepositoryError::from)?
            .iter()
            .find(|e| e.id == id)
            .cloned())
    }
}

//! Portability domain state

use std::sync::Arc;

use crate::orchestrator::PortabilityOrchestrator;

/// Application state for the Portability domain
#[derive(Clone)]
pub struct PortabilityState {
    pub orchestrator: Arc<PortabilityOrchestrator>,
}

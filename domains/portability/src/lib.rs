//! Portability domain: test fan-out, event log, status normalization and aggregation
//!
//! A portability test submits one workflow to every registered environment
//! and derives its status from an append-only event history.

pub mod api;
pub mod domain;
pub mod orchestrator;
pub mod repository;

// Re-export domain types at the crate root for convenience
pub use domain::entities::*;
pub use domain::normalizer::{normalize, UnmappedStatus};
pub use domain::state::{EnvironmentState, NormalizedStatus, TestState};

// Re-export repository types
pub use repository::{
    EventLog, InMemoryEventLog, InMemoryTestStore, PgEventLog, PgTestStore, TestStore,
};

pub use orchestrator::{EnvironmentStatus, PortabilityOrchestrator, TestStatus};

// Re-export API types
pub use api::routes;
pub use api::PortabilityState;

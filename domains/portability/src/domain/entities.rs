//! Portability domain entities
//!
//! A `PortabilityTest` records one fan-out. Its progress lives entirely in
//! the `TestEvent` history; no entity carries a mutable status.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use wfport_backends::WorkflowPayload;

/// Message written on events that carry no information
pub const EMPTY_MESSAGE: &str = "empty";

/// Kind of a test event
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "test_event_type")]
pub enum TestEventType {
    SubmissionFailed,
    SubmissionSucceeded,
    JobRunning,
    JobSucceeded,
    JobFailed,
}

impl std::fmt::Display for TestEventType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::SubmissionFailed => write!(f, "SubmissionFailed"),
            Self::SubmissionSucceeded => write!(f, "SubmissionSucceeded"),
            Self::JobRunning => write!(f, "JobRunning"),
            Self::JobSucceeded => write!(f, "JobSucceeded"),
            Self::JobFailed => write!(f, "JobFailed"),
        }
    }
}

/// An immutable entry in a test's event history
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, sqlx::FromRow)]
pub struct TestEvent {
    pub id: Uuid,
    pub test_id: Uuid,
    pub environment_id: Option<String>,
    pub event_type: TestEventType,
    pub message: String,
    pub created_at: DateTime<Utc>,
}

impl TestEvent {
    pub fn new(
        test_id: Uuid,
        environment_id: &str,
        event_type: TestEventType,
        message: impl Into<String>,
    ) -> Self {
        let message = message.into();
        Self {
            id: Uuid::new_v4(),
            test_id,
            environment_id: Some(environment_id.to_string()),
            event_type,
            message: if message.is_empty() {
                EMPTY_MESSAGE.to_string()
            } else {
                message
            },
            created_at: Utc::now(),
        }
    }
}

/// One fan-out of a workflow submission
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PortabilityTest {
    pub id: Uuid,
    pub payload: WorkflowPayload,
    /// Directory snapshot taken at submission time
    pub environment_ids: Vec<String>,
    pub created_at: DateTime<Utc>,
}

impl PortabilityTest {
    pub fn new(payload: WorkflowPayload, environment_ids: Vec<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            payload,
            environment_ids,
            created_at: Utc::now(),
        }
    }
}

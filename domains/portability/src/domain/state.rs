//! Derived state for portability tests
//!
//! Nothing here is stored. Per-environment state is derived from the set of
//! event kinds present for a (test, environment) pair, and the aggregate is
//! derived from the per-environment states. Kind presence, not event order,
//! decides the outcome, so duplicate or out-of-order events are harmless.

use std::collections::HashSet;

use serde::{Deserialize, Serialize};

use super::entities::{TestEvent, TestEventType};

// ============================================================================
// Normalized backend status
// ============================================================================

/// Backend-independent job outcome produced by the status normalizer
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum NormalizedStatus {
    JobRunning,
    JobSucceeded,
    JobFailed,
}

impl NormalizedStatus {
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::JobSucceeded | Self::JobFailed)
    }

    /// Event kind recorded for this outcome
    pub fn event_type(&self) -> TestEventType {
        match self {
            Self::JobRunning => TestEventType::JobRunning,
            Self::JobSucceeded => TestEventType::JobSucceeded,
            Self::JobFailed => TestEventType::JobFailed,
        }
    }
}

// ============================================================================
// Per-environment state
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EnvironmentState {
    /// No submission outcome recorded; a data-integrity defect
    Unsubmitted,
    SubmissionFailed,
    /// Submitted, job outcome not yet observed
    JobRunning,
    JobSucceeded,
    JobFailed,
}

impl EnvironmentState {
    /// Terminal states are never polled again
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            Self::SubmissionFailed | Self::JobSucceeded | Self::JobFailed
        )
    }

    pub fn is_failure(&self) -> bool {
        matches!(self, Self::SubmissionFailed | Self::JobFailed)
    }
}

impl From<NormalizedStatus> for EnvironmentState {
    fn from(status: NormalizedStatus) -> Self {
        match status {
            NormalizedStatus::JobRunning => Self::JobRunning,
            NormalizedStatus::JobSucceeded => Self::JobSucceeded,
            NormalizedStatus::JobFailed => Self::JobFailed,
        }
    }
}

impl std::fmt::Display for EnvironmentState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Unsubmitted => write!(f, "Unsubmitted"),
            Self::SubmissionFailed => write!(f, "SubmissionFailed"),
            Self::JobRunning => write!(f, "JobRunning"),
            Self::JobSucceeded => write!(f, "JobSucceeded"),
            Self::JobFailed => write!(f, "JobFailed"),
        }
    }
}

/// What the history of one pair says should happen next
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Derivation {
    /// Terminal; report as-is without polling
    Settled(EnvironmentState),
    /// Submitted and not yet terminal; poll this run
    Pending { run_id: String },
    /// No submission outcome at all
    Unsubmitted,
}

/// Event history of one (test, environment) pair, reduced to kind presence
#[derive(Debug, Clone, Default)]
pub struct EnvironmentHistory {
    kinds: HashSet<TestEventType>,
    run_id: Option<String>,
}

impl EnvironmentHistory {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record(&mut self, event: &TestEvent) {
        if event.event_type == TestEventType::SubmissionSucceeded && self.run_id.is_none() {
            self.run_id = Some(event.message.clone());
        }
        self.kinds.insert(event.event_type);
    }

    pub fn contains(&self, kind: TestEventType) -> bool {
        self.kinds.contains(&kind)
    }

    /// Backend run id from the submission event, if the pair was submitted
    pub fn run_id(&self) -> Option<&str> {
        self.run_id.as_deref()
    }

    /// Apply the fixed precedence: submission failure, then job failure,
    /// then job success, then pending submission.
    pub fn derive(&self) -> Derivation {
        if self.contains(TestEventType::SubmissionFailed) {
            Derivation::Settled(EnvironmentState::SubmissionFailed)
        } else if self.contains(TestEventType::JobFailed) {
            Derivation::Settled(EnvironmentState::JobFailed)
        } else if self.contains(TestEventType::JobSucceeded) {
            Derivation::Settled(EnvironmentState::JobSucceeded)
        } else if let Some(run_id) = &self.run_id {
            Derivation::Pending {
                run_id: run_id.clone(),
            }
        } else {
            Derivation::Unsubmitted
        }
    }
}

// ============================================================================
// Test aggregate state
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TestState {
    Running,
    Succeeded,
    Failed,
}

impl TestState {
    /// Any failure wins; otherwise every environment must have succeeded.
    /// An empty set of environments is vacuously `Succeeded`.
    pub fn aggregate(states: impl IntoIterator<Item = EnvironmentState>) -> Self {
        let mut all_succeeded = true;
        for state in states {
            if state.is_failure() {
                return Self::Failed;
            }
            if state != EnvironmentState::JobSucceeded {
                all_succeeded = false;
            }
        }
        if all_succeeded {
            Self::Succeeded
        } else {
            Self::Running
        }
    }
}

impl std::fmt::Display for TestState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Running => write!(f, "Running"),
            Self::Succeeded => write!(f, "Succeeded"),
            Self::Failed => write!(f, "Failed"),
        }
    }
}

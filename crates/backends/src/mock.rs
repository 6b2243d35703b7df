//! Mock Backend Implementation
//!
//! Programmable mock for testing portability workflows:
//! - `MockBackend`: scriptable adapter with call recording
//! - `MockBackendBehavior`: per-environment submit outcomes, per-run poll scripts
//! - `MockSubmitOutcome` / `MockPollOutcome`: accept/reject, status/failure

use std::collections::{HashMap, VecDeque};
use std::sync::{Arc, Mutex, RwLock};

use crate::{BackendError, ConnectionProfile, WorkflowBackend, WorkflowPayload};

/// What a submission to an environment should produce
#[derive(Debug, Clone, PartialEq)]
pub enum MockSubmitOutcome {
    /// Accept and hand back this run id
    Accept(String),
    /// Reject with this cause
    Reject(String),
}

/// What a single poll of a run should produce
#[derive(Debug, Clone, PartialEq)]
pub enum MockPollOutcome {
    /// Report this backend-native status
    Status(String),
    /// Fail the poll with this cause
    Fail(String),
}

/// Programmable behavior for the mock backend
#[derive(Debug, Default)]
pub struct MockBackendBehavior {
    /// Keyed by environment id; unscripted environments are accepted with a generated run id
    pub submit_outcomes: RwLock<HashMap<String, MockSubmitOutcome>>,
    /// Keyed by run id; the last scripted outcome repeats once the queue drains
    pub poll_scripts: RwLock<HashMap<String, VecDeque<MockPollOutcome>>>,
}

impl MockBackendBehavior {
    pub fn new() -> Self {
        Self::default()
    }

    /// Configure the submit outcome for an environment
    pub fn set_submit_outcome(&self, environment_id: &str, outcome: MockSubmitOutcome) {
        self.submit_outcomes
            .write()
            .unwrap()
            .insert(environment_id.to_string(), outcome);
    }

    /// Queue poll outcomes for a run, returned in order
    pub fn push_poll_outcomes(
        &self,
        run_id: &str,
        outcomes: impl IntoIterator<Item = MockPollOutcome>,
    ) {
        self.poll_scripts
            .write()
            .unwrap()
            .entry(run_id.to_string())
            .or_default()
            .extend(outcomes);
    }

    /// Shorthand for queueing native statuses
    pub fn push_statuses(&self, run_id: &str, statuses: &[&str]) {
        self.push_poll_outcomes(
            run_id,
            statuses
                .iter()
                .map(|s| MockPollOutcome::Status((*s).to_string())),
        );
    }

    fn next_poll_outcome(&self, run_id: &str) -> Option<MockPollOutcome> {
        let mut scripts = self.poll_scripts.write().ok()?;
        let queue = scripts.get_mut(run_id)?;
        if queue.len() > 1 {
            queue.pop_front()
        } else {
            queue.front().cloned()
        }
    }
}

/// A recorded submission for test assertions
#[derive(Debug, Clone)]
pub struct RecordedSubmission {
    pub environment_id: String,
    pub payload: WorkflowPayload,
}

/// A recorded poll for test assertions
#[derive(Debug, Clone, PartialEq)]
pub struct RecordedPoll {
    pub environment_id: String,
    pub run_id: String,
}

/// Mock backend with programmable behavior
#[derive(Debug, Clone, Default)]
pub struct MockBackend {
    behavior: Arc<MockBackendBehavior>,
    submissions: Arc<Mutex<Vec<RecordedSubmission>>>,
    polls: Arc<Mutex<Vec<RecordedPoll>>>,
}

impl MockBackend {
    pub fn new() -> Self {
        Self::default()
    }

    /// Get the shared behavior for external configuration
    pub fn behavior(&self) -> &Arc<MockBackendBehavior> {
        &self.behavior
    }

    /// Get recorded submissions
    pub fn recorded_submissions(&self) -> Vec<RecordedSubmission> {
        self.submissions.lock().unwrap().clone()
    }

    /// Get recorded polls
    pub fn recorded_polls(&self) -> Vec<RecordedPoll> {
        self.polls.lock().unwrap().clone()
    }

    /// Number of polls issued against one environment
    pub fn poll_count(&self, environment_id: &str) -> usize {
        self.polls
            .lock()
            .unwrap()
            .iter()
            .filter(|p| p.environment_id == environment_id)
            .count()
    }
}

#[async_trait::async_trait]
impl WorkflowBackend for MockBackend {
    async fn submit(
        &self,
        payload: &WorkflowPayload,
        profile: &ConnectionProfile,
    ) -> Result<String, BackendError> {
        tracing::debug!(environment_id = %profile.environment_id, "Mock backend: received submission");

        self.submissions
            .lock()
            .map_err(|e| BackendError::Submission(format!("history lock poisoned: {e}")))?
            .push(RecordedSubmission {
                environment_id: profile.environment_id.clone(),
                payload: payload.clone(),
            });

        let outcome = self
            .behavior
            .submit_outcomes
            .read()
            .map_err(|e| BackendError::Submission(format!("behavior lock poisoned: {e}")))?
            .get(&profile.environment_id)
            .cloned();

        match outcome {
            Some(MockSubmitOutcome::Accept(run_id)) => Ok(run_id),
            Some(MockSubmitOutcome::Reject(cause)) => Err(BackendError::Submission(cause)),
            None => Ok(format!("mock-run-{}", uuid::Uuid::new_v4())),
        }
    }

    async fn poll(
        &self,
        run_id: &str,
        profile: &ConnectionProfile,
    ) -> Result<String, BackendError> {
        tracing::debug!(environment_id = %profile.environment_id, run_id, "Mock backend: received poll");

        self.polls
            .lock()
            .map_err(|e| BackendError::Poll(format!("history lock poisoned: {e}")))?
            .push(RecordedPoll {
                environment_id: profile.environment_id.clone(),
                run_id: run_id.to_string(),
            });

        match self.behavior.next_poll_outcome(run_id) {
            Some(MockPollOutcome::Status(status)) => Ok(status),
            Some(MockPollOutcome::Fail(cause)) => Err(BackendError::Poll(cause)),
            None => Err(BackendError::Poll(format!(
                "Mock backend has no status scripted for run {}",
                run_id
            ))),
        }
    }
}

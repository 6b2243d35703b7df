//! Portability test orchestration
//!
//! `submit` fans one workflow out to every environment and records the
//! outcome of each attempt. `get_status` rebuilds per-environment state from
//! the event log, polls environments that are not yet terminal, caches
//! terminal outcomes back into the log and aggregates.

use std::collections::BTreeMap;
use std::sync::Arc;

use futures::{stream, StreamExt};
use serde::Serialize;
use uuid::Uuid;

use wfport_backends::{BackendError, BackendRegistry, WorkflowPayload};
use wfport_common::{Error, Result};
use wfport_environments::{Environment, EnvironmentDirectory};

use crate::domain::entities::{PortabilityTest, TestEvent, TestEventType, EMPTY_MESSAGE};
use crate::domain::normalizer::normalize;
use crate::domain::state::{Derivation, EnvironmentHistory, EnvironmentState, TestState};
use crate::repository::{EventLog, TestStore};

/// Status of one environment within a test
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EnvironmentStatus {
    pub environment_id: String,
    pub run_id: Option<String>,
    pub state: EnvironmentState,
}

/// Aggregate status of a test, environments sorted by id
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TestStatus {
    pub state: TestState,
    pub environment_statuses: Vec<EnvironmentStatus>,
}

impl TestStatus {
    pub fn environment(&self, environment_id: &str) -> Option<&EnvironmentStatus> {
        self.environment_statuses
            .iter()
            .find(|s| s.environment_id == environment_id)
    }
}

pub struct PortabilityOrchestrator {
    directory: Arc<dyn EnvironmentDirectory>,
    tests: Arc<dyn TestStore>,
    events: Arc<dyn EventLog>,
    backends: BackendRegistry,
    concurrency: Option<usize>,
}

impl PortabilityOrchestrator {
    pub fn new(
        directory: Arc<dyn EnvironmentDirectory>,
        tests: Arc<dyn TestStore>,
        events: Arc<dyn EventLog>,
        backends: BackendRegistry,
        concurrency: Option<usize>,
    ) -> Self {
        Self {
            directory,
            tests,
            events,
            backends,
            concurrency,
        }
    }

    /// One worker per unit unless a cap is configured
    fn limit(&self, units: usize) -> usize {
        match self.concurrency {
            Some(cap) => cap.min(units),
            None => units,
        }
        .max(1)
    }

    /// Fan the payload out to every environment currently registered
    pub async fn submit(&self, payload: WorkflowPayload) -> Result<Uuid> {
        let environments = self.directory.list_all().await?;
        self.submit_to(payload, environments).await
    }

    /// Fan the payload out to the given environment snapshot.
    ///
    /// Returns once every submission has been acknowledged or has failed.
    /// An event append failure is returned only after all environments have
    /// been attempted.
    pub async fn submit_to(
        &self,
        payload: WorkflowPayload,
        environments: Vec<Environment>,
    ) -> Result<Uuid> {
        let test = PortabilityTest::new(
            payload,
            environments.iter().map(|e| e.id.clone()).collect(),
        );
        self.tests.create(&test).await?;

        tracing::info!(
            test_id = %test.id,
            environments = environments.len(),
            "Submitting portability test"
        );

        let submissions: Vec<_> = environments
            .iter()
            .map(|environment| self.submit_one(&test, environment))
            .collect();
        let outcomes: Vec<Result<()>> = stream::iter(submissions)
            .buffer_unordered(self.limit(environments.len()))
            .collect()
            .await;

        match outcomes.into_iter().find_map(|outcome| outcome.err()) {
            Some(err) => Err(err),
            None => Ok(test.id),
        }
    }

    async fn submit_one(&self, test: &PortabilityTest, environment: &Environment) -> Result<()> {
        let outcome = match self.backends.get(environment.schema) {
            Some(backend) => {
                backend
                    .submit(&test.payload, &environment.connection_profile())
                    .await
            }
            None => Err(BackendError::Configuration(format!(
                "No backend adapter registered for schema {}",
                environment.schema
            ))),
        };

        let event = match outcome {
            Ok(run_id) => {
                tracing::info!(
                    test_id = %test.id,
                    environment_id = %environment.id,
                    run_id = %run_id,
                    "Submission accepted"
                );
                TestEvent::new(
                    test.id,
                    &environment.id,
                    TestEventType::SubmissionSucceeded,
                    run_id,
                )
            }
            Err(err) => {
                tracing::warn!(
                    test_id = %test.id,
                    environment_id = %environment.id,
                    schema = %environment.schema,
                    error = %err,
                    "Submission failed"
                );
                TestEvent::new(
                    test.id,
                    &environment.id,
                    TestEventType::SubmissionFailed,
                    err.cause(),
                )
            }
        };

        self.append(event).await
    }

    /// Current status of a test.
    ///
    /// Terminal outcomes observed while polling are appended to the event
    /// log before returning, so that pair is never polled again.
    pub async fn get_status(&self, test_id: Uuid) -> Result<TestStatus> {
        let test = self.tests.find(test_id).await?;
        let events = self.events.list_by_test(test_id).await?;
        if test.is_none() && events.is_empty() {
            return Err(Error::NotFound(format!(
                "Portability test {} not found",
                test_id
            )));
        }

        let mut histories: BTreeMap<String, EnvironmentHistory> = BTreeMap::new();
        if let Some(test) = &test {
            for environment_id in &test.environment_ids {
                histories.entry(environment_id.clone()).or_default();
            }
        }
        for event in &events {
            // Events without an environment cannot be attributed to a pair
            if let Some(environment_id) = &event.environment_id {
                histories
                    .entry(environment_id.clone())
                    .or_default()
                    .record(event);
            }
        }

        let limit = self.limit(histories.len());
        let resolutions: Vec<_> = histories
            .into_iter()
            .map(|(environment_id, history)| self.resolve(test_id, environment_id, history))
            .collect();
        let statuses: Vec<Result<EnvironmentStatus>> =
            stream::iter(resolutions).buffered(limit).collect().await;
        let environment_statuses = statuses.into_iter().collect::<Result<Vec<_>>>()?;

        Ok(TestStatus {
            state: TestState::aggregate(environment_statuses.iter().map(|s| s.state)),
            environment_statuses,
        })
    }

    async fn resolve(
        &self,
        test_id: Uuid,
        environment_id: String,
        history: EnvironmentHistory,
    ) -> Result<EnvironmentStatus> {
        let state = match history.derive() {
            Derivation::Settled(state) => state,
            Derivation::Pending { run_id } => {
                let environment = self.directory.find(&environment_id).await?;
                self.poll(test_id, &environment_id, &run_id, environment.as_ref())
                    .await?
            }
            Derivation::Unsubmitted => {
                tracing::warn!(
                    test_id = %test_id,
                    environment_id = %environment_id,
                    "Environment has no submission event"
                );
                EnvironmentState::Unsubmitted
            }
        };

        let run_id = match state {
            EnvironmentState::SubmissionFailed | EnvironmentState::Unsubmitted => None,
            _ => history.run_id().map(str::to_string),
        };

        Ok(EnvironmentStatus {
            environment_id,
            run_id,
            state,
        })
    }

    /// Poll one submitted run. Any failure to reach the backend reports
    /// `JobRunning` and writes nothing.
    async fn poll(
        &self,
        test_id: Uuid,
        environment_id: &str,
        run_id: &str,
        environment: Option<&Environment>,
    ) -> Result<EnvironmentState> {
        let Some(environment) = environment else {
            tracing::warn!(
                test_id = %test_id,
                environment_id,
                run_id,
                "Environment is no longer registered; reporting as running"
            );
            return Ok(EnvironmentState::JobRunning);
        };
        let Some(backend) = self.backends.get(environment.schema) else {
            tracing::warn!(
                test_id = %test_id,
                environment_id,
                schema = %environment.schema,
                "No backend adapter registered for schema; reporting as running"
            );
            return Ok(EnvironmentState::JobRunning);
        };

        let native = match backend
            .poll(run_id, &environment.connection_profile())
            .await
        {
            Ok(native) => native,
            Err(err) => {
                tracing::warn!(
                    test_id = %test_id,
                    environment_id,
                    run_id,
                    error = %err,
                    "Poll failed; reporting as running"
                );
                return Ok(EnvironmentState::JobRunning);
            }
        };

        let normalized = normalize(environment.schema, &native)?;
        if normalized.is_terminal() {
            self.append(TestEvent::new(
                test_id,
                environment_id,
                normalized.event_type(),
                EMPTY_MESSAGE,
            ))
            .await?;
            tracing::info!(
                test_id = %test_id,
                environment_id,
                run_id,
                status = %native,
                "Recorded terminal job status"
            );
        }

        Ok(normalized.into())
    }

    async fn append(&self, event: TestEvent) -> Result<()> {
        let test_id = event.test_id;
        let event_type = event.event_type;
        self.events.append(event).await.map_err(|err| {
            tracing::error!(
                test_id = %test_id,
                event_type = %event_type,
                error = %err,
                "Failed to append test event"
            );
            err
        })
    }
}

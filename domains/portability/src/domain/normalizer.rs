//! Status normalization
//!
//! Maps a backend-native status string onto a `NormalizedStatus` using the
//! table for the environment's schema. Matching is exact.

use wfport_backends::WorkflowSchema;
use wfport_common::Error;

use super::state::NormalizedStatus;

/// A native status outside the schema's table
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{schema} backend reported unmapped status {status:?}")]
pub struct UnmappedStatus {
    pub schema: WorkflowSchema,
    pub status: String,
}

impl From<UnmappedStatus> for Error {
    fn from(err: UnmappedStatus) -> Self {
        Error::UnmappedStatus(err.to_string())
    }
}

/// Normalize a native status for the given schema
pub fn normalize(schema: WorkflowSchema, status: &str) -> Result<NormalizedStatus, UnmappedStatus> {
    let normalized = match schema {
        WorkflowSchema::Wes => wes_status(status),
        WorkflowSchema::Cromwell => cromwell_status(status),
    };
    normalized.ok_or_else(|| UnmappedStatus {
        schema,
        status: status.to_string(),
    })
}

/// GA4GH WES states, plus the title-case spellings some gateways emit
fn wes_status(status: &str) -> Option<NormalizedStatus> {
    match status {
        "UNKNOWN" | "QUEUED" | "INITIALIZING" | "RUNNING" | "PAUSED" | "Unknown" | "Queued"
        | "Initializing" | "Running" | "Paused" => Some(NormalizedStatus::JobRunning),
        "COMPLETE" | "Complete" => Some(NormalizedStatus::JobSucceeded),
        "EXECUTOR_ERROR" | "SYSTEM_ERROR" | "CANCELED" | "CANCELING" | "Error" | "SystemError"
        | "Canceled" => Some(NormalizedStatus::JobFailed),
        _ => None,
    }
}

fn cromwell_status(status: &str) -> Option<NormalizedStatus> {
    match status {
        "Submitted" | "Running" | "On Hold" => Some(NormalizedStatus::JobRunning),
        "Succeeded" => Some(NormalizedStatus::JobSucceeded),
        "Failed" | "Aborting" | "Aborted" => Some(NormalizedStatus::JobFailed),
        _ => None,
    }
}

//! wfport Backend Adapters
//!
//! Translates a generic workflow submission into backend-specific calls:
//! - GA4GH WES HTTP client
//! - Cromwell REST client
//! - Programmable mock backend for testing and development
//!
//! Each adapter exposes the same two capabilities: `submit` returns the
//! backend-assigned run id, `poll` returns the backend-native status string.

pub mod bundle;
pub mod cromwell;
pub mod mock;
pub mod wes;

use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum BackendError {
    #[error("Backend configuration error: {0}")]
    Configuration(String),

    #[error("Submission error: {0}")]
    Submission(String),

    #[error("Poll error: {0}")]
    Poll(String),
}

impl BackendError {
    /// The human-readable cause without the category prefix
    pub fn cause(&self) -> &str {
        match self {
            Self::Configuration(cause) | Self::Submission(cause) | Self::Poll(cause) => cause,
        }
    }
}

/// Submission protocol spoken by an environment.
///
/// Selects both the adapter and the status vocabulary used to normalize
/// poll results.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum WorkflowSchema {
    #[default]
    Wes,
    Cromwell,
}

impl WorkflowSchema {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Wes => "wes",
            Self::Cromwell => "cromwell",
        }
    }
}

impl std::fmt::Display for WorkflowSchema {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for WorkflowSchema {
    type Err = BackendError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "wes" => Ok(Self::Wes),
            "cromwell" => Ok(Self::Cromwell),
            other => Err(BackendError::Configuration(format!(
                "Unknown workflow schema: {}. Supported schemas: wes, cromwell",
                other
            ))),
        }
    }
}

/// Everything an adapter needs to reach one environment
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConnectionProfile {
    pub environment_id: String,
    pub base_url: String,
    pub headers: BTreeMap<String, String>,
    pub tags: BTreeMap<String, String>,
}

/// A dependency document shipped alongside the entry-point workflow
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WorkflowAttachment {
    pub name: String,
    pub code: String,
}

/// The workflow submitted to every environment of a portability test
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WorkflowPayload {
    pub workflow_descriptor: String,
    pub workflow_params: serde_json::Value,
    #[serde(default)]
    pub workflow_dependencies: Vec<WorkflowAttachment>,
}

impl WorkflowPayload {
    /// Workflow inputs as a JSON document.
    ///
    /// Callers may send params either as an object or as an already
    /// serialized JSON string; both forms are passed through verbatim.
    pub fn params_json(&self) -> String {
        match &self.workflow_params {
            serde_json::Value::String(raw) => raw.clone(),
            other => other.to_string(),
        }
    }
}

/// Backend adapter configuration
#[derive(Debug, Clone)]
pub struct BackendConfig {
    pub provider: String,
    pub timeout: Duration,
}

impl BackendConfig {
    /// Create backend config from environment variables
    pub fn from_env() -> Result<Self, BackendError> {
        let provider = std::env::var("BACKEND_PROVIDER").unwrap_or_else(|_| "http".to_string());
        let timeout_secs = match std::env::var("BACKEND_TIMEOUT_SECS") {
            Ok(raw) => raw.parse::<u64>().map_err(|_| {
                BackendError::Configuration(format!("Invalid BACKEND_TIMEOUT_SECS: {}", raw))
            })?,
            Err(_) => 30,
        };

        Ok(Self {
            provider,
            timeout: Duration::from_secs(timeout_secs),
        })
    }
}

/// Backend adapter trait, one implementation per submission schema
#[async_trait::async_trait]
pub trait WorkflowBackend: Send + Sync {
    /// Submit the workflow and return the backend-assigned run id.
    ///
    /// Either a run id is obtained or nothing is assumed to have started.
    async fn submit(
        &self,
        payload: &WorkflowPayload,
        profile: &ConnectionProfile,
    ) -> Result<String, BackendError>;

    /// Fetch the backend-native status string for a run. Read-only.
    async fn poll(&self, run_id: &str, profile: &ConnectionProfile)
        -> Result<String, BackendError>;
}

/// Maps each submission schema to the adapter that speaks it
#[derive(Clone, Default)]
pub struct BackendRegistry {
    backends: HashMap<WorkflowSchema, Arc<dyn WorkflowBackend>>,
}

impl BackendRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_backend(mut self, schema: WorkflowSchema, backend: Arc<dyn WorkflowBackend>) -> Self {
        self.backends.insert(schema, backend);
        self
    }

    pub fn get(&self, schema: WorkflowSchema) -> Option<Arc<dyn WorkflowBackend>> {
        self.backends.get(&schema).cloned()
    }
}

impl std::fmt::Debug for BackendRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let mut schemas: Vec<_> = self.backends.keys().map(WorkflowSchema::as_str).collect();
        schemas.sort_unstable();
        f.debug_struct("BackendRegistry")
            .field("schemas", &schemas)
            .finish()
    }
}

/// Factory for creating a populated `BackendRegistry`
pub struct BackendRegistryFactory;

impl BackendRegistryFactory {
    pub fn create(config: BackendConfig) -> Result<BackendRegistry, BackendError> {
        match config.provider.as_str() {
            "http" => {
                tracing::info!(timeout_secs = config.timeout.as_secs(), "Creating HTTP backend adapters");
                let http = build_http_client(config.timeout)?;
                Ok(BackendRegistry::new()
                    .with_backend(
                        WorkflowSchema::Wes,
                        Arc::new(wes::WesClient::new(http.clone())),
                    )
                    .with_backend(
                        WorkflowSchema::Cromwell,
                        Arc::new(cromwell::CromwellClient::new(http)),
                    ))
            }
            "mock" => {
                tracing::info!("Creating mock backend adapters");
                let mock: Arc<dyn WorkflowBackend> = Arc::new(mock::MockBackend::new());
                Ok(BackendRegistry::new()
                    .with_backend(WorkflowSchema::Wes, mock.clone())
                    .with_backend(WorkflowSchema::Cromwell, mock))
            }
            provider => Err(BackendError::Configuration(format!(
                "Unknown backend provider: {}. Supported providers: http, mock",
                provider
            ))),
        }
    }
}

/// Shared reqwest client; the timeout bounds every submit and poll call.
fn build_http_client(timeout: Duration) -> Result<reqwest::Client, BackendError> {
    reqwest::Client::builder()
        .timeout(timeout)
        .build()
        .map_err(|e| BackendError::Configuration(e.to_string()))
}

/// Convert an environment's opaque header set into request headers
pub(crate) fn header_map(
    profile: &ConnectionProfile,
) -> Result<reqwest::header::HeaderMap, String> {
    let mut headers = reqwest::header::HeaderMap::new();
    for (name, value) in &profile.headers {
        let name = reqwest::header::HeaderName::from_bytes(name.as_bytes())
            .map_err(|e| format!("Invalid header name '{}': {}", name, e))?;
        let value = reqwest::header::HeaderValue::from_str(value)
            .map_err(|e| format!("Invalid value for header '{}': {}", name, e))?;
        headers.insert(name, value);
    }
    Ok(headers)
}

/// Turn a non-2xx response into an error message carrying the body
pub(crate) async fn ensure_success(
    response: reqwest::Response,
    api: &str,
) -> Result<reqwest::Response, String> {
    if response.status().is_success() {
        return Ok(response);
    }
    let status = response.status();
    let body = response
        .text()
        .await
        .unwrap_or_else(|_| "Failed to read response body".to_string());
    Err(format!("{} API returned {}: {}", api, status, body))
}

/// A blank run id cannot be polled later
pub(crate) fn require_run_id(run_id: String, api: &str) -> Result<String, String> {
    if run_id.trim().is_empty() {
        return Err(format!("Malformed {} response: empty run id", api));
    }
    Ok(run_id)
}

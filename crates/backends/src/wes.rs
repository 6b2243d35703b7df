//! GA4GH WES HTTP Client Implementation
//!
//! Submits with `POST {base_url}/workflows` and polls with
//! `GET {base_url}/workflows/{run_id}/status`.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::{
    bundle, ensure_success, header_map, require_run_id, BackendError, ConnectionProfile,
    WorkflowBackend, WorkflowPayload,
};

#[derive(Debug, Serialize)]
struct WesRunRequest<'a> {
    workflow_descriptor: &'a str,
    workflow_params: &'a serde_json::Value,
    #[serde(skip_serializing_if = "Option::is_none")]
    workflow_dependencies: Option<String>,
    #[serde(skip_serializing_if = "BTreeMap::is_empty")]
    tags: &'a BTreeMap<String, String>,
}

#[derive(Debug, Deserialize)]
struct WesRunId {
    workflow_id: String,
}

#[derive(Debug, Deserialize)]
struct WesRunStatus {
    state: String,
}

/// WES client; one instance serves every WES environment.
pub struct WesClient {
    http: reqwest::Client,
}

impl WesClient {
    pub fn new(http: reqwest::Client) -> Self {
        Self { http }
    }

    fn workflows_url(profile: &ConnectionProfile) -> String {
        format!("{}/workflows", profile.base_url.trim_end_matches('/'))
    }
}

#[async_trait::async_trait]
impl WorkflowBackend for WesClient {
    async fn submit(
        &self,
        payload: &WorkflowPayload,
        profile: &ConnectionProfile,
    ) -> Result<String, BackendError> {
        let headers = header_map(profile).map_err(BackendError::Submission)?;
        let body = WesRunRequest {
            workflow_descriptor: &payload.workflow_descriptor,
            workflow_params: &payload.workflow_params,
            workflow_dependencies: bundle::encoded_dependencies(&payload.workflow_dependencies)
                .map_err(BackendError::Submission)?,
            tags: &profile.tags,
        };

        let response = self
            .http
            .post(Self::workflows_url(profile))
            .headers(headers)
            .json(&body)
            .send()
            .await
            .map_err(|e| BackendError::Submission(e.to_string()))?;
        let response = ensure_success(response, "WES")
            .await
            .map_err(BackendError::Submission)?;

        let run: WesRunId = response
            .json()
            .await
            .map_err(|e| BackendError::Submission(format!("Malformed WES response: {}", e)))?;
        let run_id = require_run_id(run.workflow_id, "WES").map_err(BackendError::Submission)?;

        tracing::debug!(environment_id = %profile.environment_id, run_id = %run_id, "WES run created");
        Ok(run_id)
    }

    async fn poll(
        &self,
        run_id: &str,
        profile: &ConnectionProfile,
    ) -> Result<String, BackendError> {
        let headers = header_map(profile).map_err(BackendError::Poll)?;
        let url = format!("{}/{}/status", Self::workflows_url(profile), run_id);

        let response = self
            .http
            .get(url)
            .headers(headers)
            .send()
            .await
            .map_err(|e| BackendError::Poll(e.to_string()))?;
        let response = ensure_success(response, "WES")
            .await
            .map_err(BackendError::Poll)?;

        let status: WesRunStatus = response
            .json()
            .await
            .map_err(|e| BackendError::Poll(format!("Malformed WES response: {}", e)))?;
        Ok(status.state)
    }
}

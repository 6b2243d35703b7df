//! Cromwell REST Client Implementation
//!
//! Talks to Cromwell's native workflow API rooted at the environment's base
//! URL (typically `.../api/workflows/v1`):
//! - `POST {base_url}` multipart submission
//! - `GET {base_url}/{run_id}/status`

use serde::Deserialize;

use crate::{
    bundle, ensure_success, header_map, require_run_id, BackendError, ConnectionProfile,
    WorkflowBackend, WorkflowPayload,
};

#[derive(Debug, Deserialize)]
struct CromwellIdAndStatus {
    id: String,
    status: String,
}

pub struct CromwellClient {
    http: reqwest::Client,
}

impl CromwellClient {
    pub fn new(http: reqwest::Client) -> Self {
        Self { http }
    }

    fn submission_form(
        payload: &WorkflowPayload,
        profile: &ConnectionProfile,
    ) -> Result<reqwest::multipart::Form, String> {
        let labels = serde_json::to_string(&profile.tags)
            .map_err(|e| format!("Failed to encode labels: {}", e))?;

        let mut form = reqwest::multipart::Form::new()
            .text("workflowSource", payload.workflow_descriptor.clone())
            .text("workflowInputs", payload.params_json())
            .text("workflowType", "WDL")
            .text("labels", labels);

        if let Some(archive) = bundle::zip_dependencies(&payload.workflow_dependencies)? {
            let part = reqwest::multipart::Part::bytes(archive)
                .file_name("dependencies.zip")
                .mime_str("application/zip")
                .map_err(|e| e.to_string())?;
            form = form.part("workflowDependencies", part);
        }

        Ok(form)
    }
}

#[async_trait::async_trait]
impl WorkflowBackend for CromwellClient {
    async fn submit(
        &self,
        payload: &WorkflowPayload,
        profile: &ConnectionProfile,
    ) -> Result<String, BackendError> {
        let headers = header_map(profile).map_err(BackendError::Submission)?;
        let form = Self::submission_form(payload, profile).map_err(BackendError::Submission)?;

        let response = self
            .http
            .post(profile.base_url.trim_end_matches('/'))
            .headers(headers)
            .multipart(form)
            .send()
            .await
            .map_err(|e| BackendError::Submission(e.to_string()))?;
        let response = ensure_success(response, "Cromwell")
            .await
            .map_err(BackendError::Submission)?;

        let created: CromwellIdAndStatus = response.json().await.map_err(|e| {
            BackendError::Submission(format!("Malformed Cromwell response: {}", e))
        })?;
        let run_id = require_run_id(created.id, "Cromwell").map_err(BackendError::Submission)?;

        tracing::debug!(
            environment_id = %profile.environment_id,
            run_id = %run_id,
            status = %created.status,
            "Cromwell workflow created"
        );
        Ok(run_id)
    }

    async fn poll(
        &self,
        run_id: &str,
        profile: &ConnectionProfile,
    ) -> Result<String, BackendError> {
        let headers = header_map(profile).map_err(BackendError::Poll)?;
        let url = format!(
            "{}/{}/status",
            profile.base_url.trim_end_matches('/'),
            run_id
        );

        let response = self
            .http
            .get(url)
            .headers(headers)
            .send()
            .await
            .map_err(|e| BackendError::Poll(e.to_string()))?;
        let response = ensure_success(response, "Cromwell")
            .await
            .map_err(BackendError::Poll)?;

        let current: CromwellIdAndStatus = response
            .json()
            .await
            .map_err(|e| BackendError::Poll(format!("Malformed Cromwell response: {}", e)))?;
        Ok(current.status)
    }
}

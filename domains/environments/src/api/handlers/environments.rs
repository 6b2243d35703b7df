//! Environment registration API handlers

use std::collections::BTreeMap;

use axum::{extract::State, http::StatusCode, Json};
use serde::{Deserialize, Serialize};
use validator::Validate;

use wfport_backends::WorkflowSchema;
use wfport_common::{Result, ValidatedJson};

use crate::api::middleware::EnvironmentsState;
use crate::domain::entities::{Environment, NewEnvironment};

/// Request for registering an environment
#[derive(Debug, Deserialize, Validate)]
pub struct RegisterEnvironmentRequest {
    #[validate(length(min = 1, max = 100))]
    pub name: String,
    #[validate(url)]
    pub url: String,
    #[serde(default)]
    pub schema: WorkflowSchema,
    #[serde(default)]
    pub headers: BTreeMap<String, String>,
    #[serde(default)]
    pub tags: BTreeMap<String, String>,
}

impl From<RegisterEnvironmentRequest> for NewEnvironment {
    fn from(req: RegisterEnvironmentRequest) -> Self {
        Self {
            name: req.name,
            url: req.url,
            schema: req.schema,
            headers: req.headers,
            tags: req.tags,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct RegisterEnvironmentResponse {
    pub environment_id: String,
}

/// Environment listing entry. Headers may carry credentials and are never returned.
#[derive(Debug, Serialize)]
pub struct EnvironmentResponse {
    pub environment_id: String,
    pub name: String,
    pub url: String,
    pub schema: WorkflowSchema,
    pub tags: BTreeMap<String, String>,
}

impl From<Environment> for EnvironmentResponse {
    fn from(e: Environment) -> Self {
        Self {
            environment_id: e.id,
            name: e.name,
            url: e.url,
            schema: e.schema,
            tags: e.tags,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct ListEnvironmentsResponse {
    pub environments: Vec<EnvironmentResponse>,
}

/// Register a new execution environment
pub async fn register_environment(
    State(state): State<EnvironmentsState>,
    ValidatedJson(req): ValidatedJson<RegisterEnvironmentRequest>,
) -> Result<(StatusCode, Json<RegisterEnvironmentResponse>)> {
    let environment = state.directory.register(req.into()).await?;

    tracing::info!(
        environment_id = %environment.id,
        schema = %environment.schema,
        "Registered environment"
    );

    Ok((
        StatusCode::CREATED,
        Json(RegisterEnvironmentResponse {
            environment_id: environment.id,
        }),
    ))
}

/// List every registered environment
pub async fn list_environments(
    State(state): State<EnvironmentsState>,
) -> Result<Json<ListEnvironmentsResponse>> {
    let environments = state.directory.list_all().await?;
    Ok(Json(ListEnvironmentsResponse {
        environments: environments.into_iter().map(Into::into).collect(),
    }))
}

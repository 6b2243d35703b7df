//! Environment domain entities
//!
//! An environment is an external execution backend registered with the
//! service. Environments are immutable after registration.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::ValidateUrl;

use wfport_backends::{ConnectionProfile, WorkflowSchema};
use wfport_common::{Error, Result};

/// Maximum length of an environment display name
pub const MAX_NAME_LENGTH: usize = 100;

/// Registration input for a new environment
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewEnvironment {
    pub name: String,
    pub url: String,
    #[serde(default)]
    pub schema: WorkflowSchema,
    #[serde(default)]
    pub headers: BTreeMap<String, String>,
    #[serde(default)]
    pub tags: BTreeMap<String, String>,
}

/// A registered execution environment
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Environment {
    pub id: String,
    pub name: String,
    pub url: String,
    pub schema: WorkflowSchema,
    pub headers: BTreeMap<String, String>,
    pub tags: BTreeMap<String, String>,
    pub created_at: DateTime<Utc>,
}

impl Environment {
    /// Create a new environment with a generated id and validation
    pub fn new(new: NewEnvironment) -> Result<Self> {
        Self::validate_name(&new.name)?;
        Self::validate_url(&new.url)?;

        Ok(Environment {
            id: Uuid::new_v4().to_string(),
            name: new.name.trim().to_string(),
            url: new.url,
            schema: new.schema,
            headers: new.headers,
            tags: new.tags,
            created_at: Utc::now(),
        })
    }

    /// Validate environment display name
    pub fn validate_name(name: &str) -> Result<()> {
        let trimmed = name.trim();
        if trimmed.is_empty() {
            return Err(Error::Validation(
                "Environment name cannot be empty".to_string(),
            ));
        }
        if trimmed.chars().count() > MAX_NAME_LENGTH {
            return Err(Error::Validation(format!(
                "Environment name cannot exceed {} characters",
                MAX_NAME_LENGTH
            )));
        }
        Ok(())
    }

    /// Validate the base URL submissions are sent to
    pub fn validate_url(url: &str) -> Result<()> {
        if !url.validate_url() {
            return Err(Error::Validation(format!(
                "Environment URL is not a valid URL: {}",
                url
            )));
        }
        Ok(())
    }

    /// Connection profile handed to backend adapters
    pub fn connection_profile(&self) -> ConnectionProfile {
        ConnectionProfile {
            environment_id: self.id.clone(),
            base_url: self.url.clone(),
            headers: self.headers.clone(),
            tags: self.tags.clone(),
        }
    }
}

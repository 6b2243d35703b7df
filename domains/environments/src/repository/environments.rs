//! PostgreSQL environment directory

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use sqlx::types::Json;
use sqlx::PgPool;

use wfport_backends::WorkflowSchema;
use wfport_common::{RepositoryError, Result};

use super::EnvironmentDirectory;
use crate::domain::entities::{Environment, NewEnvironment};

const ENVIRONMENT_COLUMNS: &str = "id, name, url, schema, headers, tags, created_at";

/// Row shape of the `environments` table
#[derive(Debug, sqlx::FromRow)]
struct EnvironmentRow {
    id: String,
    name: String,
    url: String,
    schema: String,
    headers: Json<BTreeMap<String, String>>,
    tags: Json<BTreeMap<String, String>>,
    created_at: DateTime<Utc>,
}

impl TryFrom<EnvironmentRow> for Environment {
    type Error = RepositoryError;

    fn try_from(row: EnvironmentRow) -> std::result::Result<Self, Self::Error> {
        let schema = row
            .schema
            .parse::<WorkflowSchema>()
            .map_err(|e| RepositoryError::InvalidData(e.to_string()))?;
        Ok(Environment {
            id: row.id,
            name: row.name,
            url: row.url,
            schema,
            headers: row.headers.0,
            tags: row.tags.0,
            created_at: row.created_at,
        })
    }
}

#[derive(Clone)]
pub struct PgEnvironmentDirectory {
    pool: PgPool,
}

impl PgEnvironmentDirectory {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait::async_trait]
impl EnvironmentDirectory for PgEnvironmentDirectory {
    async fn register(&self, new: NewEnvironment) -> Result<Environment> {
        let environment = Environment::new(new)?;
        let query = format!(
            "INSERT INTO environments ({ENVIRONMENT_COLUMNS}) \
             VALUES ($1, $2, $3, $4, $5, $6, $7) \
             RETURNING {ENVIRONMENT_COLUMNS}"
        );
        let row = sqlx::query_as::<_, EnvironmentRow>(&query)
            .bind(&environment.id)
            .bind(&environment.name)
            .bind(&environment.url)
            .bind(environment.schema.as_str())
            .bind(Json(&environment.headers))
            .bind(Json(&environment.tags))
            .bind(environment.created_at)
            .fetch_one(&self.pool)
            .await?;
        Ok(Environment::try_from(row)?)
    }

    async fn list_all(&self) -> Result<Vec<Environment>> {
        let query = format!("SELECT {ENVIRONMENT_COLUMNS} FROM environments ORDER BY created_at ASC");
        let rows = sqlx::query_as::<_, EnvironmentRow>(&query)
            .fetch_all(&self.pool)
            .await?;
        let environments = rows
            .into_iter()
            .map(Environment::try_from)
            .collect::<std::result::Result<Vec<_>, _>>()?;
        Ok(environments)
    }

    async fn find(&self, id: &str) -> Result<Option<Environment>> {
        let query = format!("SELECT {ENVIRONMENT_COLUMNS} FROM environments WHERE id = $1");
        let row = sqlx::query_as::<_, EnvironmentRow>(&query)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(row.map(Environment::try_from).transpose()?)
    }
}

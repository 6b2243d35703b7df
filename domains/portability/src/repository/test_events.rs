//! PostgreSQL event log

use sqlx::PgPool;
use uuid::Uuid;

use wfport_common::Result;

use super::EventLog;
use crate::domain::entities::TestEvent;

#[derive(Clone)]
pub struct PgEventLog {
    pool: PgPool,
}

impl PgEventLog {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait::async_trait]
impl EventLog for PgEventLog {
    async fn append(&self, event: TestEvent) -> Result<()> {
        sqlx::query(
            r#"
            INSERT INTO test_events (id, test_id, environment_id, event_type, message, created_at)
            VALUES ($1, $2, $3, $4, $5, $6)
            "#,
        )
        .bind(event.id)
        .bind(event.test_id)
        .bind(&event.environment_id)
        .bind(event.event_type)
        .bind(&event.message)
        .bind(event.created_at)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    async fn list_by_test(&self, test_id: Uuid) -> Result<Vec<TestEvent>> {
        let rows = sqlx::query_as::<_, TestEvent>(
            r#"
            SELECT id, test_id, environment_id, event_type, message, created_at
            FROM test_events
            WHERE test_id = $1
            "#,
        )
        .bind(test_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(rows)
    }
}

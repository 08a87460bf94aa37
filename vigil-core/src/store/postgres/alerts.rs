use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde_json::Value;
use sqlx::{PgPool, Row};
use uuid::Uuid;

use vigil_model::{AlertId, AlertRecord};

use crate::error::Result;
use crate::store::ports::AlertsRepository;

#[derive(Debug, Clone)]
pub struct PgAlertsRepository {
    pool: PgPool,
}

impl PgAlertsRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl AlertsRepository for PgAlertsRepository {
    async fn list_recent(&self, limit: i64) -> Result<Vec<AlertRecord>> {
        let rows = sqlx::query(
            r#"
            SELECT id, payload, received_at
            FROM alerts
            ORDER BY received_at DESC
            LIMIT $1
            "#,
        )
        .bind(limit)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows
            .into_iter()
            .map(|row| AlertRecord {
                id: AlertId::from(row.get::<Uuid, _>("id")),
                payload: row.get::<Value, _>("payload"),
                received_at: row.get::<DateTime<Utc>, _>("received_at"),
            })
            .collect())
    }
}

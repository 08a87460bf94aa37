use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde_json::Value;
use sqlx::postgres::PgRow;
use sqlx::{PgPool, Row};
use uuid::Uuid;

use vigil_model::{
    InfoAlertId, InfoAlertRecord, UserId, WatchPriority, WatchStatus,
};

use crate::error::{CoreError, Result};
use crate::store::ports::InfoAlertsRepository;

#[derive(Debug, Clone)]
pub struct PgInfoAlertsRepository {
    pool: PgPool,
}

impl PgInfoAlertsRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    fn map_row(row: &PgRow) -> Result<InfoAlertRecord> {
        let priority: String = row.get("priority");
        let priority = match priority.as_str() {
            "high" => WatchPriority::High,
            "medium" => WatchPriority::Medium,
            other => {
                return Err(CoreError::Internal(format!(
                    "unknown watch priority: {other}"
                )));
            }
        };

        let status: String = row.get("status");
        let status = match status.as_str() {
            "unread" => WatchStatus::Unread,
            "read" => WatchStatus::Read,
            other => {
                return Err(CoreError::Internal(format!(
                    "unknown watch status: {other}"
                )));
            }
        };

        Ok(InfoAlertRecord {
            id: InfoAlertId::from(row.get::<Uuid, _>("id")),
            company_id: row.get("company_id"),
            user_id: row.get::<Option<Uuid>, _>("user_id").map(UserId::from),
            title: row.get("title"),
            message: row.get("message"),
            source: row.get("source"),
            priority,
            status,
            detected_at: row.get::<DateTime<Utc>, _>("detected_at"),
            read_at: row.get::<Option<DateTime<Utc>>, _>("read_at"),
            metadata: row.get::<Value, _>("metadata"),
        })
    }
}

#[async_trait]
impl InfoAlertsRepository for PgInfoAlertsRepository {
    async fn list_by_company(
        &self,
        company_id: &str,
        limit: i64,
    ) -> Result<Vec<InfoAlertRecord>> {
        let rows = sqlx::query(
            r#"
            SELECT id, company_id, user_id, title, message, source,
                   priority, status, detected_at, read_at, metadata
            FROM info_alerts
            WHERE company_id = $1
            ORDER BY detected_at DESC
            LIMIT $2
            "#,
        )
        .bind(company_id)
        .bind(limit)
        .fetch_all(&self.pool)
        .await?;

        rows.iter().map(Self::map_row).collect()
    }

    async fn insert(&self, record: &InfoAlertRecord) -> Result<()> {
        sqlx::query(
            r#"
            INSERT INTO info_alerts
                (id, company_id, user_id, title, message, source,
                 priority, status, detected_at, read_at, metadata)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11)
            "#,
        )
        .bind(record.id.to_uuid())
        .bind(&record.company_id)
        .bind(record.user_id.map(|id| id.to_uuid()))
        .bind(&record.title)
        .bind(&record.message)
        .bind(&record.source)
        .bind(record.priority.as_str())
        .bind(record.status.as_str())
        .bind(record.detected_at)
        .bind(record.read_at)
        .bind(&record.metadata)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    async fn mark_read(
        &self,
        id: InfoAlertId,
        read_at: DateTime<Utc>,
    ) -> Result<bool> {
        let result = sqlx::query(
            "UPDATE info_alerts SET status = 'read', read_at = $2 WHERE id = $1",
        )
        .bind(id.to_uuid())
        .bind(read_at)
        .execute(&self.pool)
        .await?;

        Ok(result.rows_affected() == 1)
    }
}

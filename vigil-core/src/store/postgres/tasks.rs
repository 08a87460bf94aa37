use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde_json::Value;
use sqlx::postgres::PgRow;
use sqlx::{PgPool, Row};
use uuid::Uuid;

use vigil_model::{TaskId, TaskRecord, TaskStats, TaskStatus};

use crate::error::{CoreError, Result};
use crate::store::ports::TasksRepository;

#[derive(Debug, Clone)]
pub struct PgTasksRepository {
    pool: PgPool,
}

impl PgTasksRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    fn map_row(row: &PgRow) -> Result<TaskRecord> {
        let status: String = row.get("status");
        Ok(TaskRecord {
            id: TaskId::from(row.get::<Uuid, _>("id")),
            org_id: row.get("org_id"),
            status: status
                .parse::<TaskStatus>()
                .map_err(CoreError::Internal)?,
            needs_review: row.get("needs_review"),
            payload: row.get::<Value, _>("payload"),
            created_at: row.get::<DateTime<Utc>, _>("created_at"),
            updated_at: row.get::<DateTime<Utc>, _>("updated_at"),
        })
    }
}

const TASK_COLUMNS: &str =
    "id, org_id, status, needs_review, payload, created_at, updated_at";

#[async_trait]
impl TasksRepository for PgTasksRepository {
    async fn list_all(&self) -> Result<Vec<TaskRecord>> {
        let rows = sqlx::query(&format!(
            "SELECT {TASK_COLUMNS} FROM tasks ORDER BY created_at DESC",
        ))
        .fetch_all(&self.pool)
        .await?;

        rows.iter().map(Self::map_row).collect()
    }

    async fn list_by_org(&self, org_id: &str) -> Result<Vec<TaskRecord>> {
        let rows = sqlx::query(&format!(
            "SELECT {TASK_COLUMNS} FROM tasks WHERE org_id = $1 ORDER BY created_at DESC",
        ))
        .bind(org_id)
        .fetch_all(&self.pool)
        .await?;

        rows.iter().map(Self::map_row).collect()
    }

    async fn get(&self, id: TaskId) -> Result<Option<TaskRecord>> {
        let row = sqlx::query(&format!(
            "SELECT {TASK_COLUMNS} FROM tasks WHERE id = $1",
        ))
        .bind(id.to_uuid())
        .fetch_optional(&self.pool)
        .await?;

        row.as_ref().map(Self::map_row).transpose()
    }

    async fn update_status(
        &self,
        id: TaskId,
        status: TaskStatus,
    ) -> Result<Option<TaskRecord>> {
        let row = sqlx::query(&format!(
            r#"
            UPDATE tasks
            SET status = $2, updated_at = now()
            WHERE id = $1
            RETURNING {TASK_COLUMNS}
            "#,
        ))
        .bind(id.to_uuid())
        .bind(status.as_str())
        .fetch_optional(&self.pool)
        .await?;

        row.as_ref().map(Self::map_row).transpose()
    }

    async fn stats(&self, org_id: &str) -> Result<TaskStats> {
        let row = sqlx::query(
            r#"
            SELECT
                COUNT(*) AS total,
                COUNT(*) FILTER (WHERE status = 'open') AS open,
                COUNT(*) FILTER (WHERE status = 'in_progress') AS in_progress,
                COUNT(*) FILTER (WHERE status = 'completed') AS completed,
                COUNT(*) FILTER (WHERE status = 'cancelled') AS cancelled,
                COUNT(*) FILTER (WHERE needs_review) AS needs_review
            FROM tasks
            WHERE org_id = $1
            "#,
        )
        .bind(org_id)
        .fetch_one(&self.pool)
        .await?;

        Ok(TaskStats {
            total: row.get::<i64, _>("total") as u64,
            open: row.get::<i64, _>("open") as u64,
            in_progress: row.get::<i64, _>("in_progress") as u64,
            completed: row.get::<i64, _>("completed") as u64,
            cancelled: row.get::<i64, _>("cancelled") as u64,
            needs_review: row.get::<i64, _>("needs_review") as u64,
        })
    }
}

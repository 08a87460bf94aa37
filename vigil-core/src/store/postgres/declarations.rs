use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde_json::Value;
use sqlx::postgres::PgRow;
use sqlx::{PgPool, Row};
use uuid::Uuid;

use vigil_model::{
    DeclarationId, DeclarationKind, DeclarationRecord, DeclarationStatus,
    UserId,
};

use crate::error::{CoreError, Result};
use crate::store::ports::DeclarationsRepository;

#[derive(Debug, Clone)]
pub struct PgDeclarationsRepository {
    pool: PgPool,
}

impl PgDeclarationsRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    fn map_row(row: &PgRow) -> Result<DeclarationRecord> {
        let kind: String = row.get("kind");
        let status: String = row.get("status");
        Ok(DeclarationRecord {
            id: DeclarationId::from(row.get::<Uuid, _>("id")),
            user_id: UserId::from(row.get::<Uuid, _>("user_id")),
            company_id: row.get("company_id"),
            kind: kind
                .parse::<DeclarationKind>()
                .map_err(CoreError::Internal)?,
            status: status
                .parse::<DeclarationStatus>()
                .map_err(CoreError::Internal)?,
            current_step: row.get("current_step"),
            total_steps: row.get("total_steps"),
            data: row.get::<Value, _>("data"),
            created_at: row.get::<DateTime<Utc>, _>("created_at"),
            updated_at: row.get::<DateTime<Utc>, _>("updated_at"),
        })
    }
}

const DECLARATION_COLUMNS: &str = "id, user_id, company_id, kind, status, \
     current_step, total_steps, data, created_at, updated_at";

#[async_trait]
impl DeclarationsRepository for PgDeclarationsRepository {
    async fn insert(&self, record: &DeclarationRecord) -> Result<()> {
        sqlx::query(
            r#"
            INSERT INTO declarations
                (id, user_id, company_id, kind, status,
                 current_step, total_steps, data, created_at, updated_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10)
            "#,
        )
        .bind(record.id.to_uuid())
        .bind(record.user_id.to_uuid())
        .bind(&record.company_id)
        .bind(record.kind.as_str())
        .bind(record.status.as_str())
        .bind(record.current_step)
        .bind(record.total_steps)
        .bind(&record.data)
        .bind(record.created_at)
        .bind(record.updated_at)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    async fn get(
        &self,
        id: DeclarationId,
    ) -> Result<Option<DeclarationRecord>> {
        let row = sqlx::query(&format!(
            "SELECT {DECLARATION_COLUMNS} FROM declarations WHERE id = $1",
        ))
        .bind(id.to_uuid())
        .fetch_optional(&self.pool)
        .await?;

        row.as_ref().map(Self::map_row).transpose()
    }

    async fn update(&self, record: &DeclarationRecord) -> Result<()> {
        let result = sqlx::query(
            r#"
            UPDATE declarations
            SET status = $2, current_step = $3, total_steps = $4,
                data = $5, updated_at = $6
            WHERE id = $1
            "#,
        )
        .bind(record.id.to_uuid())
        .bind(record.status.as_str())
        .bind(record.current_step)
        .bind(record.total_steps)
        .bind(&record.data)
        .bind(record.updated_at)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(CoreError::not_found(format!(
                "declaration {}",
                record.id
            )));
        }
        Ok(())
    }

    async fn list(
        &self,
        user_id: Option<UserId>,
    ) -> Result<Vec<DeclarationRecord>> {
        let rows = match user_id {
            Some(user_id) => {
                sqlx::query(&format!(
                    "SELECT {DECLARATION_COLUMNS} FROM declarations \
                     WHERE user_id = $1 ORDER BY updated_at DESC",
                ))
                .bind(user_id.to_uuid())
                .fetch_all(&self.pool)
                .await?
            }
            None => {
                sqlx::query(&format!(
                    "SELECT {DECLARATION_COLUMNS} FROM declarations \
                     ORDER BY updated_at DESC",
                ))
                .fetch_all(&self.pool)
                .await?
            }
        };

        rows.iter().map(Self::map_row).collect()
    }
}

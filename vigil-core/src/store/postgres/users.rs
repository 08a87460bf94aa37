use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::postgres::PgRow;
use sqlx::{PgPool, Row};
use uuid::Uuid;

use vigil_model::{UserId, UserRecord};

use crate::error::{CoreError, Result};
use crate::store::ports::UsersRepository;

#[derive(Debug, Clone)]
pub struct PgUsersRepository {
    pool: PgPool,
}

impl PgUsersRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    fn map_row(row: &PgRow) -> UserRecord {
        UserRecord {
            id: UserId::from(row.get::<Uuid, _>("id")),
            email: row.get("email"),
            password_hash: row.get("password_hash"),
            company_id: row.get("company_id"),
            company_name: row.get("company_name"),
            created_at: row.get::<DateTime<Utc>, _>("created_at"),
        }
    }
}

#[async_trait]
impl UsersRepository for PgUsersRepository {
    async fn insert(&self, record: &UserRecord) -> Result<()> {
        sqlx::query(
            r#"
            INSERT INTO users
                (id, email, password_hash, company_id, company_name, created_at)
            VALUES ($1, $2, $3, $4, $5, $6)
            "#,
        )
        .bind(record.id.to_uuid())
        .bind(&record.email)
        .bind(&record.password_hash)
        .bind(&record.company_id)
        .bind(&record.company_name)
        .bind(record.created_at)
        .execute(&self.pool)
        .await
        .map_err(|err| match &err {
            sqlx::Error::Database(db) if db.is_unique_violation() => {
                CoreError::Conflict(format!(
                    "account already exists for {}",
                    record.email
                ))
            }
            _ => CoreError::from(err),
        })?;

        Ok(())
    }

    async fn find_by_email(&self, email: &str) -> Result<Option<UserRecord>> {
        let row = sqlx::query(
            r#"
            SELECT id, email, password_hash, company_id, company_name, created_at
            FROM users
            WHERE email = $1
            "#,
        )
        .bind(email)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.as_ref().map(Self::map_row))
    }

    async fn get(&self, id: UserId) -> Result<Option<UserRecord>> {
        let row = sqlx::query(
            r#"
            SELECT id, email, password_hash, company_id, company_name, created_at
            FROM users
            WHERE id = $1
            "#,
        )
        .bind(id.to_uuid())
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.as_ref().map(Self::map_row))
    }
}

use async_trait::async_trait;
use sqlx::{PgPool, Row};

use crate::error::Result;
use crate::store::ports::RefreshStateRepository;

/// Key of the singleton row tracking the alert refresh timestamp.
const REFRESH_KEY: &str = "alerts_refresh";

#[derive(Debug, Clone)]
pub struct PgRefreshStateRepository {
    pool: PgPool,
}

impl PgRefreshStateRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl RefreshStateRepository for PgRefreshStateRepository {
    async fn last_refresh(&self) -> Result<Option<i64>> {
        let row = sqlx::query(
            "SELECT last_refresh_ts FROM refresh_state WHERE id = $1",
        )
        .bind(REFRESH_KEY)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.map(|r| r.get::<i64, _>("last_refresh_ts")))
    }

    async fn advance(&self, expected: i64, new_ts: i64) -> Result<bool> {
        // Compare-and-swap in one statement: the upsert only lands when the
        // stored value still matches what this caller observed, so two
        // requests racing past the same TTL expiry cannot both dispatch.
        let result = sqlx::query(
            r#"
            INSERT INTO refresh_state (id, last_refresh_ts)
            VALUES ($1, $2)
            ON CONFLICT (id) DO UPDATE
                SET last_refresh_ts = EXCLUDED.last_refresh_ts
                WHERE refresh_state.last_refresh_ts = $3
            "#,
        )
        .bind(REFRESH_KEY)
        .bind(new_ts)
        .bind(expected)
        .execute(&self.pool)
        .await?;

        Ok(result.rows_affected() == 1)
    }
}

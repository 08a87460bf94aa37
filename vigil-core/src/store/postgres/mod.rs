mod alerts;
mod declarations;
mod info_alerts;
mod refresh_state;
mod settings;
mod tasks;
mod users;

use std::sync::Arc;

use sqlx::postgres::{PgPool, PgPoolOptions};
use tracing::info;

use crate::error::{CoreError, Result};
use crate::store::StoreHandles;

pub use alerts::PgAlertsRepository;
pub use declarations::PgDeclarationsRepository;
pub use info_alerts::PgInfoAlertsRepository;
pub use refresh_state::PgRefreshStateRepository;
pub use settings::PgSettingsRepository;
pub use tasks::PgTasksRepository;
pub use users::PgUsersRepository;

const SCHEMA: &str = include_str!("schema.sql");

/// Postgres-backed document store.
#[derive(Debug, Clone)]
pub struct Store {
    pool: PgPool,
}

impl Store {
    pub async fn connect(url: &str) -> Result<Self> {
        let pool = PgPoolOptions::new()
            .max_connections(8)
            .connect(url)
            .await
            .map_err(|e| CoreError::StoreUnavailable(e.to_string()))?;

        Ok(Self { pool })
    }

    /// Apply the collection schema. Statements are idempotent so this runs
    /// unconditionally at startup.
    pub async fn initialize_schema(&self) -> Result<()> {
        sqlx::raw_sql(SCHEMA)
            .execute(&self.pool)
            .await
            .map_err(|e| {
                CoreError::Internal(format!("schema initialization failed: {e}"))
            })?;
        info!("document store schema initialized");
        Ok(())
    }

    pub async fn ping(&self) -> Result<()> {
        sqlx::query("SELECT 1").execute(&self.pool).await?;
        Ok(())
    }

    pub fn pool(&self) -> &PgPool {
        &self.pool
    }

    pub fn handles(&self) -> StoreHandles {
        StoreHandles {
            alerts: Arc::new(PgAlertsRepository::new(self.pool.clone())),
            refresh_state: Arc::new(PgRefreshStateRepository::new(
                self.pool.clone(),
            )),
            tasks: Arc::new(PgTasksRepository::new(self.pool.clone())),
            info_alerts: Arc::new(PgInfoAlertsRepository::new(
                self.pool.clone(),
            )),
            settings: Arc::new(PgSettingsRepository::new(self.pool.clone())),
            declarations: Arc::new(PgDeclarationsRepository::new(
                self.pool.clone(),
            )),
            users: Arc::new(PgUsersRepository::new(self.pool.clone())),
        }
    }
}

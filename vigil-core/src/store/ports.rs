use async_trait::async_trait;
use chrono::{DateTime, Utc};

use vigil_model::{
    AlertRecord, CompanySettings, DeclarationId, DeclarationRecord,
    InfoAlertId, InfoAlertRecord, TaskId, TaskRecord, TaskStats, TaskStatus,
    UserId, UserRecord,
};

use crate::error::Result;

/// Access to the singleton record tracking the last engine trigger.
#[async_trait]
pub trait RefreshStateRepository: Send + Sync {
    /// Unix seconds of the last recorded trigger, `None` when the record has
    /// never been written.
    async fn last_refresh(&self) -> Result<Option<i64>>;

    /// Conditionally advance the timestamp from `expected` to `new_ts`.
    ///
    /// Returns `Ok(true)` when this caller won the window, `Ok(false)` when a
    /// concurrent request advanced it first. The comparison and write are a
    /// single store operation.
    async fn advance(&self, expected: i64, new_ts: i64) -> Result<bool>;
}

/// Read access to the alert collection written by the external engine.
#[async_trait]
pub trait AlertsRepository: Send + Sync {
    /// Most recent alerts, newest first.
    async fn list_recent(&self, limit: i64) -> Result<Vec<AlertRecord>>;
}

#[async_trait]
pub trait TasksRepository: Send + Sync {
    async fn list_all(&self) -> Result<Vec<TaskRecord>>;

    async fn list_by_org(&self, org_id: &str) -> Result<Vec<TaskRecord>>;

    async fn get(&self, id: TaskId) -> Result<Option<TaskRecord>>;

    /// Update a task's status, returning the refreshed record or `None` when
    /// the task does not exist.
    async fn update_status(
        &self,
        id: TaskId,
        status: TaskStatus,
    ) -> Result<Option<TaskRecord>>;

    async fn stats(&self, org_id: &str) -> Result<TaskStats>;
}

#[async_trait]
pub trait InfoAlertsRepository: Send + Sync {
    /// Watch findings for a company, newest first.
    async fn list_by_company(
        &self,
        company_id: &str,
        limit: i64,
    ) -> Result<Vec<InfoAlertRecord>>;

    async fn insert(&self, record: &InfoAlertRecord) -> Result<()>;

    /// Returns `false` when the alert does not exist.
    async fn mark_read(
        &self,
        id: InfoAlertId,
        read_at: DateTime<Utc>,
    ) -> Result<bool>;
}

#[async_trait]
pub trait SettingsRepository: Send + Sync {
    async fn get(&self, company_id: &str) -> Result<Option<CompanySettings>>;

    async fn upsert(&self, settings: &CompanySettings) -> Result<()>;
}

#[async_trait]
pub trait DeclarationsRepository: Send + Sync {
    async fn insert(&self, record: &DeclarationRecord) -> Result<()>;

    async fn get(
        &self,
        id: DeclarationId,
    ) -> Result<Option<DeclarationRecord>>;

    async fn update(&self, record: &DeclarationRecord) -> Result<()>;

    /// All declarations, optionally restricted to one user, most recently
    /// updated first.
    async fn list(
        &self,
        user_id: Option<UserId>,
    ) -> Result<Vec<DeclarationRecord>>;
}

#[async_trait]
pub trait UsersRepository: Send + Sync {
    async fn insert(&self, record: &UserRecord) -> Result<()>;

    async fn find_by_email(&self, email: &str) -> Result<Option<UserRecord>>;

    async fn get(&self, id: UserId) -> Result<Option<UserRecord>>;
}

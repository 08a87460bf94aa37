use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use axum_test::TestServer;
use chrono::{DateTime, Utc};
use serde_json::json;

use vigil_core::auth::AuthService;
use vigil_core::error::{CoreError, Result as CoreResult};
use vigil_core::refresh::{RefreshGate, ScanDispatcher};
use vigil_core::store::StoreHandles;
use vigil_core::store::ports::{
    AlertsRepository, DeclarationsRepository, InfoAlertsRepository,
    RefreshStateRepository, SettingsRepository, TasksRepository,
    UsersRepository,
};
use vigil_model::{
    AlertId, AlertRecord, CompanySettings, DeclarationId, DeclarationRecord,
    InfoAlertId, InfoAlertRecord, ScanCounts, ScanOutcome, ScanRequest,
    TaskId, TaskRecord, TaskStats, TaskStatus, UserId, UserRecord,
};

use vigil_server::infra::config::{
    AlertsConfig, AuthConfig, Config, ConfigMetadata, CorsConfig,
    DatabaseConfig, ServerConfig, WatchConfig,
};
use vigil_server::{AppState, create_app};

// Shared across test binaries; not every binary touches every helper.
#[allow(unused)]
#[derive(Default)]
pub struct MemAlerts {
    records: Mutex<Vec<AlertRecord>>,
}

#[allow(unused)]
impl MemAlerts {
    pub fn push(&self, payload: serde_json::Value, received_at: DateTime<Utc>) {
        self.records.lock().unwrap().push(AlertRecord {
            id: AlertId::new(),
            payload,
            received_at,
        });
    }
}

#[async_trait]
impl AlertsRepository for MemAlerts {
    async fn list_recent(&self, limit: i64) -> CoreResult<Vec<AlertRecord>> {
        let mut records = self.records.lock().unwrap().clone();
        records.sort_by(|a, b| b.received_at.cmp(&a.received_at));
        records.truncate(limit.max(0) as usize);
        Ok(records)
    }
}

#[allow(unused)]
#[derive(Default)]
pub struct MemRefreshState {
    value: Mutex<Option<i64>>,
    pub fail_writes: Mutex<bool>,
}

#[allow(unused)]
impl MemRefreshState {
    pub fn set(&self, ts: i64) {
        *self.value.lock().unwrap() = Some(ts);
    }

    pub fn stored(&self) -> Option<i64> {
        *self.value.lock().unwrap()
    }
}

#[async_trait]
impl RefreshStateRepository for MemRefreshState {
    async fn last_refresh(&self) -> CoreResult<Option<i64>> {
        Ok(*self.value.lock().unwrap())
    }

    async fn advance(&self, expected: i64, new_ts: i64) -> CoreResult<bool> {
        if *self.fail_writes.lock().unwrap() {
            return Err(CoreError::StoreUnavailable(
                "write refused".to_string(),
            ));
        }
        let mut value = self.value.lock().unwrap();
        if value.unwrap_or(0) != expected {
            return Ok(false);
        }
        *value = Some(new_ts);
        Ok(true)
    }
}

#[allow(unused)]
#[derive(Default)]
pub struct MemTasks {
    records: Mutex<Vec<TaskRecord>>,
}

#[allow(unused)]
impl MemTasks {
    pub fn push(&self, record: TaskRecord) {
        self.records.lock().unwrap().push(record);
    }

    pub fn sample(org_id: &str, status: TaskStatus) -> TaskRecord {
        TaskRecord {
            id: TaskId::new(),
            org_id: org_id.to_string(),
            status,
            needs_review: false,
            payload: json!({ "rule": "vat-threshold" }),
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }
}

#[async_trait]
impl TasksRepository for MemTasks {
    async fn list_all(&self) -> CoreResult<Vec<TaskRecord>> {
        Ok(self.records.lock().unwrap().clone())
    }

    async fn list_by_org(&self, org_id: &str) -> CoreResult<Vec<TaskRecord>> {
        Ok(self
            .records
            .lock()
            .unwrap()
            .iter()
            .filter(|t| t.org_id == org_id)
            .cloned()
            .collect())
    }

    async fn get(&self, id: TaskId) -> CoreResult<Option<TaskRecord>> {
        Ok(self
            .records
            .lock()
            .unwrap()
            .iter()
            .find(|t| t.id == id)
            .cloned())
    }

    async fn update_status(
        &self,
        id: TaskId,
        status: TaskStatus,
    ) -> CoreResult<Option<TaskRecord>> {
        let mut records = self.records.lock().unwrap();
        match records.iter_mut().find(|t| t.id == id) {
            Some(task) => {
                task.status = status;
                task.updated_at = Utc::now();
                Ok(Some(task.clone()))
            }
            None => Ok(None),
        }
    }

    async fn stats(&self, org_id: &str) -> CoreResult<TaskStats> {
        let records = self.records.lock().unwrap();
        let mut stats = TaskStats::default();
        for task in records.iter().filter(|t| t.org_id == org_id) {
            stats.total += 1;
            match task.status {
                TaskStatus::Open => stats.open += 1,
                TaskStatus::InProgress => stats.in_progress += 1,
                TaskStatus::Completed => stats.completed += 1,
                TaskStatus::Cancelled => stats.cancelled += 1,
            }
            if task.needs_review {
                stats.needs_review += 1;
            }
        }
        Ok(stats)
    }
}

#[allow(unused)]
#[derive(Default)]
pub struct MemInfoAlerts {
    records: Mutex<Vec<InfoAlertRecord>>,
}

#[allow(unused)]
impl MemInfoAlerts {
    pub fn push(&self, record: InfoAlertRecord) {
        self.records.lock().unwrap().push(record);
    }
}

#[async_trait]
impl InfoAlertsRepository for MemInfoAlerts {
    async fn list_by_company(
        &self,
        company_id: &str,
        limit: i64,
    ) -> CoreResult<Vec<InfoAlertRecord>> {
        let mut records: Vec<_> = self
            .records
            .lock()
            .unwrap()
            .iter()
            .filter(|r| r.company_id == company_id)
            .cloned()
            .collect();
        records.sort_by(|a, b| b.detected_at.cmp(&a.detected_at));
        records.truncate(limit.max(0) as usize);
        Ok(records)
    }

    async fn insert(&self, record: &InfoAlertRecord) -> CoreResult<()> {
        self.records.lock().unwrap().push(record.clone());
        Ok(())
    }

    async fn mark_read(
        &self,
        id: InfoAlertId,
        read_at: DateTime<Utc>,
    ) -> CoreResult<bool> {
        let mut records = self.records.lock().unwrap();
        match records.iter_mut().find(|r| r.id == id) {
            Some(record) => {
                record.status = vigil_model::WatchStatus::Read;
                record.read_at = Some(read_at);
                Ok(true)
            }
            None => Ok(false),
        }
    }
}

#[allow(unused)]
#[derive(Default)]
pub struct MemSettings {
    records: Mutex<Vec<CompanySettings>>,
}

#[async_trait]
impl SettingsRepository for MemSettings {
    async fn get(
        &self,
        company_id: &str,
    ) -> CoreResult<Option<CompanySettings>> {
        Ok(self
            .records
            .lock()
            .unwrap()
            .iter()
            .find(|s| s.company_id == company_id)
            .cloned())
    }

    async fn upsert(&self, settings: &CompanySettings) -> CoreResult<()> {
        let mut records = self.records.lock().unwrap();
        records.retain(|s| s.company_id != settings.company_id);
        records.push(settings.clone());
        Ok(())
    }
}

#[allow(unused)]
#[derive(Default)]
pub struct MemDeclarations {
    records: Mutex<Vec<DeclarationRecord>>,
}

#[allow(unused)]
impl MemDeclarations {
    pub fn push(&self, record: DeclarationRecord) {
        self.records.lock().unwrap().push(record);
    }
}

#[async_trait]
impl DeclarationsRepository for MemDeclarations {
    async fn insert(&self, record: &DeclarationRecord) -> CoreResult<()> {
        self.records.lock().unwrap().push(record.clone());
        Ok(())
    }

    async fn get(
        &self,
        id: DeclarationId,
    ) -> CoreResult<Option<DeclarationRecord>> {
        Ok(self
            .records
            .lock()
            .unwrap()
            .iter()
            .find(|r| r.id == id)
            .cloned())
    }

    async fn update(&self, record: &DeclarationRecord) -> CoreResult<()> {
        let mut records = self.records.lock().unwrap();
        match records.iter_mut().find(|r| r.id == record.id) {
            Some(existing) => {
                *existing = record.clone();
                Ok(())
            }
            None => Err(CoreError::not_found(format!(
                "declaration {}",
                record.id
            ))),
        }
    }

    async fn list(
        &self,
        user_id: Option<UserId>,
    ) -> CoreResult<Vec<DeclarationRecord>> {
        let mut records: Vec<_> = self
            .records
            .lock()
            .unwrap()
            .iter()
            .filter(|r| user_id.is_none_or(|id| r.user_id == id))
            .cloned()
            .collect();
        records.sort_by(|a, b| b.updated_at.cmp(&a.updated_at));
        Ok(records)
    }
}

#[allow(unused)]
#[derive(Default)]
pub struct MemUsers {
    records: Mutex<Vec<UserRecord>>,
}

#[async_trait]
impl UsersRepository for MemUsers {
    async fn insert(&self, record: &UserRecord) -> CoreResult<()> {
        let mut records = self.records.lock().unwrap();
        if records.iter().any(|u| u.email == record.email) {
            return Err(CoreError::Conflict(format!(
                "account already exists for {}",
                record.email
            )));
        }
        records.push(record.clone());
        Ok(())
    }

    async fn find_by_email(
        &self,
        email: &str,
    ) -> CoreResult<Option<UserRecord>> {
        Ok(self
            .records
            .lock()
            .unwrap()
            .iter()
            .find(|u| u.email == email)
            .cloned())
    }

    async fn get(&self, id: UserId) -> CoreResult<Option<UserRecord>> {
        Ok(self
            .records
            .lock()
            .unwrap()
            .iter()
            .find(|u| u.id == id)
            .cloned())
    }
}

/// Dispatcher double: records every dispatch and answers with a fixed
/// outcome after an optional delay.
#[allow(unused)]
pub struct RecordingDispatcher {
    calls: Mutex<Vec<ScanRequest>>,
    outcome: Mutex<ScanOutcome>,
    delay: Mutex<Option<Duration>>,
}

#[allow(unused)]
impl Default for RecordingDispatcher {
    fn default() -> Self {
        Self {
            calls: Mutex::new(Vec::new()),
            outcome: Mutex::new(ScanOutcome::Completed(ScanCounts {
                created_count: 1,
                skipped_count: 0,
                processed_count: 1,
            })),
            delay: Mutex::new(None),
        }
    }
}

#[allow(unused)]
impl RecordingDispatcher {
    pub fn call_count(&self) -> usize {
        self.calls.lock().unwrap().len()
    }

    pub fn set_delay(&self, delay: Duration) {
        *self.delay.lock().unwrap() = Some(delay);
    }

    pub fn set_outcome(&self, outcome: ScanOutcome) {
        *self.outcome.lock().unwrap() = outcome;
    }
}

#[async_trait]
impl ScanDispatcher for RecordingDispatcher {
    async fn dispatch(&self, request: ScanRequest) -> ScanOutcome {
        self.calls.lock().unwrap().push(request);
        let delay = *self.delay.lock().unwrap();
        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }
        self.outcome.lock().unwrap().clone()
    }
}

// Handles on the in-memory collections behind a TestServer.
#[allow(unused)]
pub struct TestContext {
    pub state: AppState,
    pub alerts: Arc<MemAlerts>,
    pub refresh: Arc<MemRefreshState>,
    pub tasks: Arc<MemTasks>,
    pub info_alerts: Arc<MemInfoAlerts>,
    pub settings: Arc<MemSettings>,
    pub declarations: Arc<MemDeclarations>,
    pub users: Arc<MemUsers>,
    pub dispatcher: Arc<RecordingDispatcher>,
}

#[allow(unused)]
pub fn test_config() -> Config {
    Config {
        server: ServerConfig {
            host: "127.0.0.1".to_string(),
            port: 0,
        },
        database: DatabaseConfig { url: None },
        alerts: AlertsConfig {
            engine_url: None,
            refresh_ttl_seconds: 300,
            call_timeout_seconds: 5,
            max_alerts: 50,
            service_account_json: None,
        },
        watch: WatchConfig {
            fiscal_agent_url: None,
            call_timeout_seconds: 5,
        },
        auth: AuthConfig {
            token_key: "integration-test-key".to_string(),
            token_ttl_seconds: 3600,
        },
        cors: CorsConfig::default(),
        dev_mode: true,
        metadata: ConfigMetadata::default(),
    }
}

#[allow(unused)]
pub fn build_test_app() -> (TestServer, TestContext) {
    build_test_app_with_config(test_config())
}

#[allow(unused)]
pub fn build_test_app_with_config(config: Config) -> (TestServer, TestContext) {
    let alerts = Arc::new(MemAlerts::default());
    let refresh = Arc::new(MemRefreshState::default());
    let tasks = Arc::new(MemTasks::default());
    let info_alerts = Arc::new(MemInfoAlerts::default());
    let settings = Arc::new(MemSettings::default());
    let declarations = Arc::new(MemDeclarations::default());
    let users = Arc::new(MemUsers::default());
    let dispatcher = Arc::new(RecordingDispatcher::default());

    let handles = StoreHandles {
        alerts: alerts.clone(),
        refresh_state: refresh.clone(),
        tasks: tasks.clone(),
        info_alerts: info_alerts.clone(),
        settings: settings.clone(),
        declarations: declarations.clone(),
        users: users.clone(),
    };

    let config = Arc::new(config);
    let auth = Arc::new(AuthService::new(
        config.auth.token_key.as_bytes(),
        config.auth.token_ttl_seconds,
    ));

    let gate = Arc::new(RefreshGate::new(
        refresh.clone(),
        dispatcher.clone(),
        Duration::from_millis(500),
    ));

    let state = AppState::new(
        Arc::clone(&config),
        handles,
        Some(gate),
        None,
        None,
        auth,
    );

    let server = TestServer::new(create_app(state.clone()))
        .expect("failed to start test server");

    (
        server,
        TestContext {
            state,
            alerts,
            refresh,
            tasks,
            info_alerts,
            settings,
            declarations,
            users,
            dispatcher,
        },
    )
}

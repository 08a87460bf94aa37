use async_trait::async_trait;
use serde::Deserialize;
use serde_json::Value;
use std::time::Duration;
use tracing::{error, info};
use url::Url;

use vigil_model::{
    ScanCounts, ScanFailureKind, ScanOutcome, ScanRequest, ScanTarget,
};

use crate::engine::credentials::CredentialChain;
use crate::refresh::ScanDispatcher;

/// Authenticated HTTP client for the external alert engine.
///
/// Dispatch never returns an error type: every failure mode collapses into a
/// tagged [`ScanOutcome`] so callers can embed it in response metadata or log
/// it without unwinding the enclosing request.
pub struct EngineClient {
    http: reqwest::Client,
    target: Url,
    credentials: CredentialChain,
    timeout: Duration,
}

impl std::fmt::Debug for EngineClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EngineClient")
            .field("target", &self.target.as_str())
            .field("timeout", &self.timeout)
            .finish_non_exhaustive()
    }
}

/// Scan-all response wire format.
#[derive(Debug, Deserialize)]
struct ScanWire {
    #[serde(default)]
    created_alerts: u64,
    #[serde(default)]
    skipped_existing: u64,
    #[serde(default)]
    processed_tasks: u64,
}

/// Single-target response wire format.
#[derive(Debug, Default, Deserialize)]
struct SingleTaskWire {
    #[serde(default)]
    summary: SingleTaskSummary,
}

#[derive(Debug, Default, Deserialize)]
struct SingleTaskSummary {
    #[serde(default)]
    created: Vec<Value>,
    #[serde(default)]
    skipped: Vec<Value>,
}

impl EngineClient {
    pub fn new(
        target: Url,
        credentials: CredentialChain,
        timeout: Duration,
    ) -> Self {
        Self {
            http: reqwest::Client::new(),
            target,
            credentials,
            timeout,
        }
    }

    pub fn target(&self) -> &Url {
        &self.target
    }

    async fn bearer_token(&self) -> Result<String, ScanOutcome> {
        self.credentials
            .bearer_token(self.target.as_str())
            .await
            .map_err(|err| {
                ScanOutcome::failed(
                    ScanFailureKind::AuthUnavailable,
                    err.to_string(),
                )
            })
    }

    fn classify(err: reqwest::Error) -> ScanOutcome {
        if err.is_timeout() {
            ScanOutcome::failed(
                ScanFailureKind::Timeout,
                "the alert engine did not respond in time",
            )
        } else {
            ScanOutcome::failed(ScanFailureKind::UnexpectedError, err.to_string())
        }
    }

    async fn fail_on_status(
        response: reqwest::Response,
    ) -> Result<reqwest::Response, ScanOutcome> {
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }

        let body = response.text().await.unwrap_or_default();
        Err(ScanOutcome::failed(
            ScanFailureKind::HttpError,
            format!("HTTP {status}: {}", body.trim()),
        ))
    }

    /// Ask the engine to scan all pending tasks.
    pub async fn scan_all(
        &self,
        limit: Option<u32>,
        dry_run: bool,
    ) -> ScanOutcome {
        let token = match self.bearer_token().await {
            Ok(token) => token,
            Err(outcome) => return outcome,
        };

        let mut query: Vec<(&str, String)> = Vec::new();
        if let Some(limit) = limit.filter(|l| *l > 0) {
            query.push(("limit", limit.to_string()));
        }
        if dry_run {
            query.push(("dry_run", "true".to_string()));
        }

        info!(target = %self.target, limit = ?limit, dry_run, "dispatching engine scan");

        let result = self
            .http
            .get(self.target.clone())
            .bearer_auth(token)
            .query(&query)
            .timeout(self.timeout)
            .send()
            .await;

        let response = match result {
            Ok(response) => response,
            Err(err) => return Self::classify(err),
        };

        let response = match Self::fail_on_status(response).await {
            Ok(response) => response,
            Err(outcome) => return outcome,
        };

        match response.json::<ScanWire>().await {
            Ok(wire) => {
                let counts = ScanCounts {
                    created_count: wire.created_alerts,
                    skipped_count: wire.skipped_existing,
                    processed_count: wire.processed_tasks,
                };
                info!(
                    created = counts.created_count,
                    skipped = counts.skipped_count,
                    processed = counts.processed_count,
                    "engine scan completed"
                );
                ScanOutcome::Completed(counts)
            }
            Err(err) => ScanOutcome::failed(
                ScanFailureKind::UnexpectedError,
                format!("undecodable engine response: {err}"),
            ),
        }
    }

    /// Ask the engine to evaluate one task document.
    pub async fn scan_task(
        &self,
        task_id: &str,
        task: &Value,
        dry_run: bool,
    ) -> ScanOutcome {
        let token = match self.bearer_token().await {
            Ok(token) => token,
            Err(outcome) => return outcome,
        };

        let mut query: Vec<(&str, &str)> = Vec::new();
        if dry_run {
            query.push(("dry_run", "true"));
        }

        info!(target = %self.target, task_id, dry_run, "dispatching single-task scan");

        let result = self
            .http
            .post(self.target.clone())
            .bearer_auth(token)
            .query(&query)
            .json(&serde_json::json!({
                "task_id": task_id,
                "task": task,
            }))
            .timeout(self.timeout)
            .send()
            .await;

        let response = match result {
            Ok(response) => response,
            Err(err) => return Self::classify(err),
        };

        let response = match Self::fail_on_status(response).await {
            Ok(response) => response,
            Err(outcome) => return outcome,
        };

        match response.json::<SingleTaskWire>().await {
            Ok(wire) => ScanOutcome::Completed(ScanCounts {
                created_count: wire.summary.created.len() as u64,
                skipped_count: wire.summary.skipped.len() as u64,
                processed_count: 1,
            }),
            Err(err) => ScanOutcome::failed(
                ScanFailureKind::UnexpectedError,
                format!("undecodable engine response: {err}"),
            ),
        }
    }
}

#[async_trait]
impl ScanDispatcher for EngineClient {
    async fn dispatch(&self, request: ScanRequest) -> ScanOutcome {
        let outcome = match &request.target {
            ScanTarget::All { limit } => {
                self.scan_all(*limit, request.dry_run).await
            }
            ScanTarget::Task { task_id, task } => {
                self.scan_task(task_id, task, request.dry_run).await
            }
        };

        if let ScanOutcome::Failed(failure) = &outcome {
            error!(
                error = failure.kind.as_str(),
                message = %failure.message,
                "engine dispatch failed"
            );
        }

        outcome
    }
}

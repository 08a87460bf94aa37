use axum::{
    extract::{Query, State},
    response::Json,
};
use chrono::Utc;
use serde::{Deserialize, Serialize};
use serde_json::{Value, json};
use tracing::{error, warn};

use vigil_core::refresh::TriggerReport;
use vigil_model::{AlertRecord, ScanOutcome, TriggerMode};

use crate::AppState;
use crate::infra::errors::{AppError, AppResult};

#[derive(Debug, Deserialize)]
pub struct ListAlertsQuery {
    /// Wait for the scan outcome instead of dispatching in the background.
    #[serde(default)]
    pub sync: bool,
    /// Per-request TTL override in seconds.
    pub ttl_override: Option<i64>,
}

#[derive(Debug, Serialize)]
pub struct AlertListMetadata {
    pub count: usize,
    pub last_refresh: i64,
    pub time_since_refresh: i64,
    pub ttl: i64,
    pub timestamp: i64,
    pub mode: &'static str,
}

#[derive(Debug, Serialize)]
pub struct AlertListResponse {
    pub alerts: Vec<AlertRecord>,
    pub triggered: bool,
    pub trigger_mode: Option<&'static str>,
    pub metadata: AlertListMetadata,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub scan_result: Option<ScanOutcome>,
}

/// The main listing endpoint: evaluate the refresh gate, then read and
/// return the current alerts. The gate outcome is metadata; it never fails
/// the listing.
pub async fn list_alerts(
    State(state): State<AppState>,
    Query(query): Query<ListAlertsQuery>,
) -> AppResult<Json<AlertListResponse>> {
    let effective_ttl = match query.ttl_override {
        Some(ttl) if ttl < 0 => {
            return Err(AppError::bad_request(
                "ttl_override must be non-negative",
            ));
        }
        Some(ttl) => ttl,
        None => state.config.alerts.refresh_ttl_seconds,
    };

    let mode = if query.sync {
        TriggerMode::Sync
    } else {
        TriggerMode::Background
    };

    let report = match &state.gate {
        Some(gate) => gate.evaluate_and_maybe_trigger(effective_ttl, mode).await,
        None => {
            warn!("alert engine not configured, trigger skipped");
            untriggered_report(&state).await
        }
    };

    let (alerts, mode_label) = match state
        .store
        .alerts
        .list_recent(state.config.alerts.max_alerts)
        .await
    {
        Ok(alerts) => (alerts, "store"),
        Err(err) => {
            error!(error = %err, "alert listing failed, returning empty set");
            (Vec::new(), "degraded")
        }
    };

    Ok(Json(AlertListResponse {
        triggered: report.triggered,
        trigger_mode: report.trigger_mode.map(|m| m.as_str()),
        metadata: AlertListMetadata {
            count: alerts.len(),
            last_refresh: report.last_refresh,
            time_since_refresh: report.time_since_refresh,
            ttl: effective_ttl,
            timestamp: report.now,
            mode: mode_label,
        },
        scan_result: report.scan_result,
        alerts,
    }))
}

/// Gate-shaped report for deployments without an engine target.
async fn untriggered_report(state: &AppState) -> TriggerReport {
    let now = Utc::now().timestamp();
    let last_refresh = state
        .store
        .refresh_state
        .last_refresh()
        .await
        .ok()
        .flatten()
        .unwrap_or(0);

    TriggerReport {
        triggered: false,
        trigger_mode: None,
        scan_result: None,
        now,
        last_refresh,
        time_since_refresh: now - last_refresh,
    }
}

pub async fn alerts_health(
    State(state): State<AppState>,
) -> (axum::http::StatusCode, Json<Value>) {
    let store_ok = state.store.refresh_state.last_refresh().await.is_ok();
    let engine_configured = state.engine.is_some();
    let all_ok = store_ok && engine_configured;

    let body = json!({
        "status": if all_ok { "healthy" } else { "degraded" },
        "timestamp": Utc::now().timestamp(),
        "configuration": {
            "store": store_ok,
            "alert_engine": engine_configured,
        },
        "settings": {
            "ttl": state.config.alerts.refresh_ttl_seconds,
            "max_alerts": state.config.alerts.max_alerts,
            "timeout": state.config.alerts.call_timeout_seconds,
        }
    });

    let status = if all_ok {
        axum::http::StatusCode::OK
    } else {
        axum::http::StatusCode::PARTIAL_CONTENT
    };
    (status, Json(body))
}

pub async fn alerts_config(State(state): State<AppState>) -> Json<Value> {
    Json(json!({
        "module": "alerts",
        "version": env!("CARGO_PKG_VERSION"),
        "engine_configured": state.engine.is_some(),
        "settings": {
            "alert_refresh_ttl": state.config.alerts.refresh_ttl_seconds,
            "max_alerts": state.config.alerts.max_alerts,
            "call_timeout_seconds": state.config.alerts.call_timeout_seconds,
        }
    }))
}

#[derive(Debug, Default, Deserialize)]
pub struct TriggerScanRequest {
    pub limit: Option<u32>,
    #[serde(default)]
    pub dry_run: bool,
}

/// Manual sync dispatch, bypassing the TTL gate. Operator tooling only.
pub async fn trigger_scan(
    State(state): State<AppState>,
    body: Option<Json<TriggerScanRequest>>,
) -> AppResult<Json<Value>> {
    let engine = state
        .engine
        .as_ref()
        .ok_or_else(|| AppError::unavailable("Alert engine not configured"))?;

    let request = body.map(|Json(r)| r).unwrap_or_default();
    let outcome = engine.scan_all(request.limit, request.dry_run).await;

    Ok(Json(json!({
        "status": "completed",
        "result": outcome,
    })))
}

use axum::{
    extract::{Path, State},
    response::Json,
};
use chrono::Utc;
use serde::Serialize;
use tracing::info;
use uuid::Uuid;

use vigil_model::{ApiResponse, InfoAlertId, InfoAlertRecord};

use crate::AppState;
use crate::infra::errors::{AppError, AppResult};

/// Watch listings are capped; older findings age out of the view.
const WATCH_LISTING_CAP: i64 = 50;

#[derive(Debug, Serialize)]
pub struct WatchListData {
    pub alerts: Vec<InfoAlertRecord>,
    pub total: usize,
}

pub async fn list_company_alerts(
    State(state): State<AppState>,
    Path(company_id): Path<String>,
) -> AppResult<Json<ApiResponse<WatchListData>>> {
    let alerts = state
        .store
        .info_alerts
        .list_by_company(&company_id, WATCH_LISTING_CAP)
        .await?;

    info!(company_id, count = alerts.len(), "watch alerts listed");

    let total = alerts.len();
    Ok(Json(ApiResponse::success(WatchListData { alerts, total })))
}

#[derive(Debug, Serialize)]
pub struct AnalyzeData {
    pub new_alerts: usize,
    pub alerts: Vec<InfoAlertRecord>,
}

/// Run a regulatory-watch analysis pass for a company.
pub async fn analyze_company(
    State(state): State<AppState>,
    Path(company_id): Path<String>,
) -> AppResult<Json<ApiResponse<AnalyzeData>>> {
    let analyzer = state
        .watch
        .as_ref()
        .ok_or_else(|| AppError::unavailable("Fiscal agent not configured"))?;

    let alerts = analyzer.run(&company_id).await?;

    Ok(Json(ApiResponse::success(AnalyzeData {
        new_alerts: alerts.len(),
        alerts,
    })))
}

#[derive(Debug, Serialize)]
pub struct MarkReadData {
    pub id: Uuid,
    pub status: &'static str,
}

pub async fn mark_alert_read(
    State(state): State<AppState>,
    Path(alert_id): Path<Uuid>,
) -> AppResult<Json<ApiResponse<MarkReadData>>> {
    let updated = state
        .store
        .info_alerts
        .mark_read(InfoAlertId::from(alert_id), Utc::now())
        .await?;

    if !updated {
        return Err(AppError::not_found(format!("watch alert {alert_id}")));
    }

    Ok(Json(ApiResponse::success(MarkReadData {
        id: alert_id,
        status: "read",
    })))
}

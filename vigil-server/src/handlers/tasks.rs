use axum::{
    extract::{Path, State},
    response::Json,
};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::info;
use uuid::Uuid;

use vigil_model::{ApiResponse, ScanOutcome, TaskId, TaskRecord, TaskStats, TaskStatus};

use crate::AppState;
use crate::infra::errors::{AppError, AppResult};

#[derive(Debug, Serialize)]
pub struct TaskListData {
    pub tasks: Vec<TaskRecord>,
    pub count: usize,
}

#[derive(Debug, Serialize)]
pub struct OrgTaskListData {
    pub tasks: Vec<TaskRecord>,
    pub org_id: String,
    pub count: usize,
}

#[derive(Debug, Serialize)]
pub struct TaskStatsData {
    pub org_id: String,
    pub stats: TaskStats,
}

pub async fn list_tasks(
    State(state): State<AppState>,
) -> AppResult<Json<ApiResponse<TaskListData>>> {
    let tasks = state.store.tasks.list_all().await?;
    let count = tasks.len();
    info!(count, "tasks listed");

    Ok(Json(ApiResponse::success(TaskListData { tasks, count })))
}

pub async fn list_tasks_by_org(
    State(state): State<AppState>,
    Path(org_id): Path<String>,
) -> AppResult<Json<ApiResponse<OrgTaskListData>>> {
    let tasks = state.store.tasks.list_by_org(&org_id).await?;
    let count = tasks.len();
    info!(org_id, count, "organisation tasks listed");

    Ok(Json(ApiResponse::success(OrgTaskListData {
        tasks,
        org_id,
        count,
    })))
}

pub async fn get_task(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> AppResult<Json<ApiResponse<TaskRecord>>> {
    let task = state
        .store
        .tasks
        .get(TaskId::from(id))
        .await?
        .ok_or_else(|| AppError::not_found(format!("task {id}")))?;

    Ok(Json(ApiResponse::success(task)))
}

#[derive(Debug, Deserialize)]
pub struct UpdateStatusRequest {
    pub status: String,
}

pub async fn update_task_status(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(request): Json<UpdateStatusRequest>,
) -> AppResult<Json<ApiResponse<TaskRecord>>> {
    let status = request.status.parse::<TaskStatus>().map_err(|_| {
        let accepted = TaskStatus::ALL
            .iter()
            .map(TaskStatus::as_str)
            .collect::<Vec<_>>()
            .join(", ");
        AppError::bad_request(format!(
            "invalid status {:?}, accepted values: {accepted}",
            request.status
        ))
    })?;

    let task = state
        .store
        .tasks
        .update_status(TaskId::from(id), status)
        .await?
        .ok_or_else(|| AppError::not_found(format!("task {id}")))?;

    info!(task_id = %id, status = status.as_str(), "task status updated");
    Ok(Json(ApiResponse::success(task)))
}

pub async fn task_stats(
    State(state): State<AppState>,
    Path(org_id): Path<String>,
) -> AppResult<Json<ApiResponse<TaskStatsData>>> {
    let stats = state.store.tasks.stats(&org_id).await?;
    Ok(Json(ApiResponse::success(TaskStatsData { org_id, stats })))
}

#[derive(Debug, Default, Deserialize)]
pub struct ScanTaskRequest {
    #[serde(default)]
    pub dry_run: bool,
}

#[derive(Debug, Serialize)]
pub struct ScanTaskData {
    pub task_id: Uuid,
    pub result: ScanOutcome,
}

/// Run the engine against a single task document and wait for the outcome.
pub async fn scan_task(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    body: Option<Json<ScanTaskRequest>>,
) -> AppResult<Json<ApiResponse<ScanTaskData>>> {
    let engine = state
        .engine
        .as_ref()
        .ok_or_else(|| AppError::unavailable("Alert engine not configured"))?;

    let task = state
        .store
        .tasks
        .get(TaskId::from(id))
        .await?
        .ok_or_else(|| AppError::not_found(format!("task {id}")))?;

    let request = body.map(|Json(r)| r).unwrap_or_default();
    let document: Value = serde_json::to_value(&task)
        .map_err(|e| AppError::internal(e.to_string()))?;

    let result = engine
        .scan_task(&id.to_string(), &document, request.dry_run)
        .await;

    Ok(Json(ApiResponse::success(ScanTaskData {
        task_id: id,
        result,
    })))
}

use axum::{
    extract::{Query, State},
    response::Json,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use vigil_core::procedures::to_procedure_view;
use vigil_model::{ApiResponse, ProcedureView, UserId};

use crate::AppState;
use crate::infra::errors::AppResult;

#[derive(Debug, Deserialize)]
pub struct ProceduresQuery {
    /// Restrict the board to one account's declarations.
    pub user_id: Option<Uuid>,
}

#[derive(Debug, Serialize)]
pub struct ProceduresData {
    pub procedures: Vec<ProcedureView>,
    pub count: usize,
    pub timestamp: DateTime<Utc>,
}

pub async fn list_procedures(
    State(state): State<AppState>,
    Query(query): Query<ProceduresQuery>,
) -> AppResult<Json<ApiResponse<ProceduresData>>> {
    let declarations = state
        .store
        .declarations
        .list(query.user_id.map(UserId::from))
        .await?;

    let procedures: Vec<ProcedureView> =
        declarations.iter().map(to_procedure_view).collect();

    let count = procedures.len();
    Ok(Json(ApiResponse::success(ProceduresData {
        procedures,
        count,
        timestamp: Utc::now(),
    })))
}

use axum::{
    extract::{Path, State},
    response::Json,
};
use chrono::Utc;
use serde::Deserialize;
use uuid::Uuid;

use vigil_model::{ApiResponse, CompanySettings, UserId};

use crate::AppState;
use crate::infra::errors::{AppError, AppResult};

pub async fn get_settings(
    State(state): State<AppState>,
    Path(company_id): Path<String>,
) -> AppResult<Json<ApiResponse<CompanySettings>>> {
    let settings = state
        .store
        .settings
        .get(&company_id)
        .await?
        .ok_or_else(|| {
            AppError::not_found(format!("settings for company {company_id}"))
        })?;

    Ok(Json(ApiResponse::success(settings)))
}

#[derive(Debug, Deserialize)]
pub struct PutSettingsRequest {
    pub sector: String,
    pub tax_regime: String,
    pub legal_form: String,
    pub user_id: Option<Uuid>,
}

pub async fn put_settings(
    State(state): State<AppState>,
    Path(company_id): Path<String>,
    Json(request): Json<PutSettingsRequest>,
) -> AppResult<Json<ApiResponse<CompanySettings>>> {
    let settings = CompanySettings {
        company_id,
        user_id: request.user_id.map(UserId::from),
        sector: request.sector,
        tax_regime: request.tax_regime,
        legal_form: request.legal_form,
        updated_at: Utc::now(),
    };

    state.store.settings.upsert(&settings).await?;
    Ok(Json(ApiResponse::success(settings)))
}

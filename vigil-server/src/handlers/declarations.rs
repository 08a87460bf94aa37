use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{Html, Json},
};
use chrono::Utc;
use serde::Deserialize;
use serde_json::{Map, Value, json};
use tracing::info;
use uuid::Uuid;

use vigil_core::export::render_declaration_document;
use vigil_model::{
    ApiResponse, DeclarationId, DeclarationKind, DeclarationRecord,
    DeclarationStatus,
};

use crate::AppState;
use crate::infra::auth::AuthUser;
use crate::infra::errors::{AppError, AppResult};

#[derive(Debug, Deserialize)]
pub struct CreateDeclarationRequest {
    pub kind: String,
}

pub async fn create_declaration(
    State(state): State<AppState>,
    AuthUser(claims): AuthUser,
    Json(request): Json<CreateDeclarationRequest>,
) -> AppResult<(StatusCode, Json<ApiResponse<DeclarationRecord>>)> {
    let kind = request.kind.parse::<DeclarationKind>().map_err(|e| {
        AppError::bad_request(e)
    })?;

    let user = state
        .store
        .users
        .get(claims.sub)
        .await?
        .ok_or_else(|| AppError::unauthorized("account no longer exists"))?;

    let now = Utc::now();
    let record = DeclarationRecord {
        id: DeclarationId::new(),
        user_id: user.id,
        company_id: user.company_id.clone(),
        kind,
        status: DeclarationStatus::InProgress,
        // Step one is the scope ("perimeter") step, open on creation.
        current_step: 1,
        total_steps: kind.default_total_steps(),
        data: json!({}),
        created_at: now,
        updated_at: now,
    };

    state.store.declarations.insert(&record).await?;
    info!(declaration_id = %record.id, kind = kind.as_str(), "declaration created");

    Ok((StatusCode::CREATED, Json(ApiResponse::success(record))))
}

/// Load a declaration, hiding other users' records behind a 404.
async fn load_owned(
    state: &AppState,
    id: Uuid,
    owner: vigil_model::UserId,
) -> AppResult<DeclarationRecord> {
    let record = state
        .store
        .declarations
        .get(DeclarationId::from(id))
        .await?
        .filter(|record| record.user_id == owner)
        .ok_or_else(|| AppError::not_found(format!("declaration {id}")))?;
    Ok(record)
}

pub async fn get_declaration(
    State(state): State<AppState>,
    AuthUser(claims): AuthUser,
    Path(id): Path<Uuid>,
) -> AppResult<Json<ApiResponse<DeclarationRecord>>> {
    let record = load_owned(&state, id, claims.sub).await?;
    Ok(Json(ApiResponse::success(record)))
}

#[derive(Debug, Deserialize)]
pub struct DataStepRequest {
    /// Filing period, e.g. `2025-10`.
    pub period: String,
    pub tax_regime: Option<String>,
    #[serde(default)]
    pub figures: Map<String, Value>,
}

/// Record the data step: attach the period and figures, derive the net
/// amount, and advance the workflow one step.
pub async fn record_data_step(
    State(state): State<AppState>,
    AuthUser(claims): AuthUser,
    Path(id): Path<Uuid>,
    Json(request): Json<DataStepRequest>,
) -> AppResult<Json<ApiResponse<DeclarationRecord>>> {
    if request.period.split_once('-').is_none() {
        return Err(AppError::bad_request(
            "period must use the YYYY-MM format",
        ));
    }

    let mut record = load_owned(&state, id, claims.sub).await?;

    let mut figures = request.figures;
    if let (Some(collected), Some(deductible)) = (
        figures.get("vat_collected").and_then(Value::as_f64),
        figures.get("vat_deductible").and_then(Value::as_f64),
    ) {
        figures.insert("vat_due".to_string(), json!(collected - deductible));
    }

    let mut data = record.data.as_object().cloned().unwrap_or_default();
    data.insert("period".to_string(), json!(request.period));
    if let Some(regime) = request.tax_regime {
        data.insert("tax_regime".to_string(), json!(regime));
    }
    data.insert("figures".to_string(), Value::Object(figures));
    record.data = Value::Object(data);

    record.current_step = (record.current_step + 1).min(record.total_steps);
    if record.current_step >= record.total_steps {
        record.status = DeclarationStatus::UnderReview;
    }
    record.updated_at = Utc::now();

    state.store.declarations.update(&record).await?;
    info!(declaration_id = %record.id, step = record.current_step, "data step recorded");

    Ok(Json(ApiResponse::success(record)))
}

/// Render the filled summary document for a declaration.
pub async fn declaration_document(
    State(state): State<AppState>,
    AuthUser(claims): AuthUser,
    Path(id): Path<Uuid>,
) -> AppResult<Html<String>> {
    let record = load_owned(&state, id, claims.sub).await?;

    let user = state
        .store
        .users
        .get(claims.sub)
        .await?
        .ok_or_else(|| AppError::unauthorized("account no longer exists"))?;

    Ok(Html(render_declaration_document(&record, &user.profile())))
}

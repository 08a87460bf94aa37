use axum::{extract::State, response::Json};
use chrono::Utc;
use serde::{Deserialize, Serialize};
use tracing::info;
use uuid::Uuid;

use vigil_model::{ApiResponse, UserId, UserProfile, UserRecord};

use crate::AppState;
use crate::infra::auth::AuthUser;
use crate::infra::errors::{AppError, AppResult};

const MIN_PASSWORD_CHARS: usize = 8;

#[derive(Debug, Deserialize)]
pub struct RegisterRequest {
    pub email: String,
    pub password: String,
    pub company_name: String,
}

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

#[derive(Debug, Serialize)]
pub struct AuthData {
    pub user: UserProfile,
    pub token: String,
    pub expires_in: i64,
}

fn validate_registration(request: &RegisterRequest) -> Result<(), AppError> {
    if !request.email.contains('@') {
        return Err(AppError::bad_request("a valid email address is required"));
    }
    if request.password.chars().count() < MIN_PASSWORD_CHARS {
        return Err(AppError::bad_request(format!(
            "password must be at least {MIN_PASSWORD_CHARS} characters"
        )));
    }
    if request.company_name.trim().is_empty() {
        return Err(AppError::bad_request("company_name is required"));
    }
    Ok(())
}

pub async fn register(
    State(state): State<AppState>,
    Json(request): Json<RegisterRequest>,
) -> AppResult<Json<ApiResponse<AuthData>>> {
    validate_registration(&request)?;

    let email = request.email.trim().to_lowercase();
    if state.store.users.find_by_email(&email).await?.is_some() {
        return Err(AppError::conflict(format!(
            "an account already exists for {email}"
        )));
    }

    let password_hash = state.auth.hash_password(&request.password)?;

    let user = UserRecord {
        id: UserId::new(),
        email,
        password_hash,
        company_id: Uuid::now_v7().to_string(),
        company_name: request.company_name.trim().to_string(),
        created_at: Utc::now(),
    };

    state.store.users.insert(&user).await?;

    let issued = state.auth.issue_token(user.id)?;
    info!(user_id = %user.id, "account registered");

    Ok(Json(ApiResponse::success(AuthData {
        user: user.profile(),
        token: issued.token,
        expires_in: issued.expires_in,
    })))
}

pub async fn login(
    State(state): State<AppState>,
    Json(request): Json<LoginRequest>,
) -> AppResult<Json<ApiResponse<AuthData>>> {
    let email = request.email.trim().to_lowercase();

    let user = state
        .store
        .users
        .find_by_email(&email)
        .await?
        .ok_or_else(|| AppError::unauthorized("invalid credentials"))?;

    state
        .auth
        .verify_password(&request.password, &user.password_hash)?;

    let issued = state.auth.issue_token(user.id)?;
    info!(user_id = %user.id, "login succeeded");

    Ok(Json(ApiResponse::success(AuthData {
        user: user.profile(),
        token: issued.token,
        expires_in: issued.expires_in,
    })))
}

pub async fn current_user(
    State(state): State<AppState>,
    AuthUser(claims): AuthUser,
) -> AppResult<Json<ApiResponse<UserProfile>>> {
    let user = state
        .store
        .users
        .get(claims.sub)
        .await?
        .ok_or_else(|| AppError::unauthorized("account no longer exists"))?;

    Ok(Json(ApiResponse::success(user.profile())))
}

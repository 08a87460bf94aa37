use axum::{extract::FromRequestParts, http::header::AUTHORIZATION, http::request::Parts};

use vigil_core::auth::Claims;

use crate::infra::{app_state::AppState, errors::AppError};

/// Extractor for bearer-guarded endpoints. Rejects with 401 when the header
/// is missing, malformed, or carries an unverifiable token.
#[derive(Debug, Clone)]
pub struct AuthUser(pub Claims);

impl FromRequestParts<AppState> for AuthUser {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let header = parts
            .headers
            .get(AUTHORIZATION)
            .and_then(|value| value.to_str().ok())
            .ok_or_else(|| {
                AppError::unauthorized("Missing Authorization header")
            })?;

        let token = header.strip_prefix("Bearer ").ok_or_else(|| {
            AppError::unauthorized("Expected a bearer token")
        })?;

        let claims = state.auth.verify_token(token)?;
        Ok(AuthUser(claims))
    }
}

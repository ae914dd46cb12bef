//! Registration and login endpoints (public).

use crate::api::handlers::{AppError, ServerState};
use crate::services::auth::{AuthResponse, LoginInput, RegisterInput};
use axum::extract::State;
use axum::http::StatusCode;
use axum::Json;

/// POST /auth/register
pub async fn register(
    State(state): State<ServerState>,
    Json(input): Json<RegisterInput>,
) -> Result<(StatusCode, Json<AuthResponse>), AppError> {
    let response = state.auth_service().register(input).await?;
    Ok((StatusCode::CREATED, Json(response)))
}

/// POST /auth/login
pub async fn login(
    State(state): State<ServerState>,
    Json(input): Json<LoginInput>,
) -> Result<Json<AuthResponse>, AppError> {
    let response = state.auth_service().login(input).await?;
    Ok(Json(response))
}

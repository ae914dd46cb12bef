//! Daily status endpoints: report, coach dashboard, history.

use crate::api::handlers::{AppError, ServerState};
use crate::auth::jwt::Claims;
use crate::auth::policy;
use crate::identity::models::Role;
use crate::services::injuries::StatusUpdateDto;
use crate::services::status::StatusInput;
use axum::extract::{Path, State};
use axum::{Extension, Json};
use serde_json::json;

/// PATCH /status/players/{player_id}/status
pub async fn update_status(
    State(state): State<ServerState>,
    Extension(claims): Extension<Claims>,
    Path(player_id): Path<String>,
    Json(input): Json<StatusInput>,
) -> Result<Json<serde_json::Value>, AppError> {
    if !policy::can_update_status(claims.role, &claims.pseudonym_id, &player_id) {
        return Err(AppError::Forbidden(
            "Players may only update their own status".to_string(),
        ));
    }

    let today = chrono::Utc::now().date_naive();
    let update = state
        .status_service()
        .update_status(&player_id, input, today)
        .await?;
    Ok(Json(json!({ "success": true, "data": update })))
}

/// GET /status/latest — coach dashboard, grouped by managed team.
pub async fn latest(
    State(state): State<ServerState>,
    Extension(claims): Extension<Claims>,
) -> Result<Json<serde_json::Value>, AppError> {
    if claims.role == Role::Player {
        return Err(AppError::Forbidden(
            "Team status overview is staff-only".to_string(),
        ));
    }

    let today = chrono::Utc::now().date_naive();
    let teams = state
        .status_service()
        .latest_team_statuses(&claims.pseudonym_id, today)
        .await?;
    Ok(Json(json!({ "teams": teams })))
}

/// GET /status/players/{player_id}/history
pub async fn history(
    State(state): State<ServerState>,
    Extension(claims): Extension<Claims>,
    Path(player_id): Path<String>,
) -> Result<Json<Vec<StatusUpdateDto>>, AppError> {
    // Same ownership matrix as writes: own history, or any as staff
    if !policy::can_update_status(claims.role, &claims.pseudonym_id, &player_id) {
        return Err(AppError::Forbidden(
            "Players may only view their own history".to_string(),
        ));
    }

    let history = state.status_service().history(&player_id).await?;
    Ok(Json(history))
}

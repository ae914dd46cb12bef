//! Player directory endpoints (staff-only).

use crate::api::handlers::{AppError, ServerState};
use crate::auth::jwt::Claims;
use crate::auth::policy;
use crate::services::players::{PlayerDetailDto, PlayerInjuryDto, PlayerListDto};
use axum::extract::{Path, State};
use axum::{Extension, Json};

fn require_staff(claims: &Claims) -> Result<(), AppError> {
    if policy::can_view_players(claims.role) {
        Ok(())
    } else {
        Err(AppError::Forbidden(
            "Player directory is staff-only".to_string(),
        ))
    }
}

/// GET /players
pub async fn list(
    State(state): State<ServerState>,
    Extension(claims): Extension<Claims>,
) -> Result<Json<Vec<PlayerListDto>>, AppError> {
    require_staff(&claims)?;
    let players = state.player_service().list().await?;
    Ok(Json(players))
}

/// GET /players/{id}
pub async fn get_one(
    State(state): State<ServerState>,
    Extension(claims): Extension<Claims>,
    Path(player_id): Path<String>,
) -> Result<Json<PlayerDetailDto>, AppError> {
    require_staff(&claims)?;
    let player = state.player_service().get(&player_id).await?;
    Ok(Json(player))
}

/// GET /players/{id}/injuries
pub async fn injuries(
    State(state): State<ServerState>,
    Extension(claims): Extension<Claims>,
    Path(player_id): Path<String>,
) -> Result<Json<Vec<PlayerInjuryDto>>, AppError> {
    require_staff(&claims)?;
    let injuries = state.player_service().injuries(&player_id).await?;
    Ok(Json(injuries))
}

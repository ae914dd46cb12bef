//! Team endpoints: roster, details, and the coach's own teams.

use crate::api::handlers::{AppError, ServerState};
use crate::auth::jwt::Claims;
use crate::auth::policy;
use crate::identity::models::Role;
use crate::services::teams::{RosterDto, TeamDetailDto, TeamDto};
use axum::extract::{Path, State};
use axum::{Extension, Json};

/// GET /teams/coach/my-teams
pub async fn my_teams(
    State(state): State<ServerState>,
    Extension(claims): Extension<Claims>,
) -> Result<Json<Vec<TeamDto>>, AppError> {
    if claims.role == Role::Player {
        return Err(AppError::Forbidden("Staff only".to_string()));
    }
    let teams = state.team_service().my_teams(&claims.pseudonym_id).await?;
    Ok(Json(teams))
}

/// GET /teams/{team_id}/players — roster with today's status.
pub async fn roster(
    State(state): State<ServerState>,
    Extension(claims): Extension<Claims>,
    Path(team_id): Path<String>,
) -> Result<Json<RosterDto>, AppError> {
    let service = state.team_service();

    // Fail-closed: an error during the MANAGES check denies access
    let manages = match claims.role {
        Role::Coach => service.coach_has_access(&claims.pseudonym_id, &team_id).await,
        _ => false,
    };
    if !policy::can_view_roster(claims.role, manages) {
        return Err(AppError::Forbidden(
            "Roster access requires managing this team".to_string(),
        ));
    }

    let today = chrono::Utc::now().date_naive();
    let roster = service.roster(&team_id, today).await?;
    Ok(Json(roster))
}

/// GET /teams/{team_id}
pub async fn details(
    State(state): State<ServerState>,
    Extension(claims): Extension<Claims>,
    Path(team_id): Path<String>,
) -> Result<Json<TeamDetailDto>, AppError> {
    if !policy::can_view_players(claims.role) {
        return Err(AppError::Forbidden("Staff only".to_string()));
    }
    let detail = state.team_service().details(&team_id).await?;
    Ok(Json(detail))
}

//! Injury endpoints. Writes are staff-only; reads are owner-or-staff and
//! row-scoped inside the service.

use crate::api::handlers::{AppError, ServerState};
use crate::api::query::InjuryListQuery;
use crate::auth::jwt::Claims;
use crate::auth::policy;
use crate::graph::models::{InjuryChanges, InjuryResolution};
use crate::services::injuries::{CreateInjuryInput, InjuryDetailDto, InjuryListResponse};
use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::{Extension, Json};

fn require_staff(claims: &Claims) -> Result<(), AppError> {
    if policy::can_write_injuries(claims.role) {
        Ok(())
    } else {
        Err(AppError::Forbidden(
            "Only coaches and admins may modify injuries".to_string(),
        ))
    }
}

/// GET /injuries
pub async fn list(
    State(state): State<ServerState>,
    Extension(claims): Extension<Claims>,
    Query(query): Query<InjuryListQuery>,
) -> Result<Json<InjuryListResponse>, AppError> {
    let filter = query.filter().map_err(AppError::BadRequest)?;
    let sort = query.sort().map_err(AppError::BadRequest)?;

    let response = state
        .injury_service()
        .find_all(
            claims.role,
            &claims.pseudonym_id,
            filter,
            sort,
            query.page(),
            query.limit(),
        )
        .await?;
    Ok(Json(response))
}

/// POST /injuries
pub async fn create(
    State(state): State<ServerState>,
    Extension(claims): Extension<Claims>,
    Json(input): Json<CreateInjuryInput>,
) -> Result<(StatusCode, Json<InjuryDetailDto>), AppError> {
    require_staff(&claims)?;
    let detail = state
        .injury_service()
        .create(&claims.pseudonym_id, input)
        .await?;
    Ok((StatusCode::CREATED, Json(detail)))
}

/// GET /injuries/{id}
pub async fn get_one(
    State(state): State<ServerState>,
    Extension(claims): Extension<Claims>,
    Path(injury_id): Path<String>,
) -> Result<Json<InjuryDetailDto>, AppError> {
    let detail = state
        .injury_service()
        .find_one(claims.role, &claims.pseudonym_id, &injury_id)
        .await?;
    Ok(Json(detail))
}

/// PATCH /injuries/{id}
pub async fn update(
    State(state): State<ServerState>,
    Extension(claims): Extension<Claims>,
    Path(injury_id): Path<String>,
    Json(changes): Json<InjuryChanges>,
) -> Result<Json<InjuryDetailDto>, AppError> {
    require_staff(&claims)?;
    let detail = state.injury_service().update(&injury_id, changes).await?;
    Ok(Json(detail))
}

/// POST /injuries/{id}/resolve
pub async fn resolve(
    State(state): State<ServerState>,
    Extension(claims): Extension<Claims>,
    Path(injury_id): Path<String>,
    Json(resolution): Json<InjuryResolution>,
) -> Result<Json<InjuryDetailDto>, AppError> {
    require_staff(&claims)?;
    let detail = state
        .injury_service()
        .resolve(&injury_id, resolution)
        .await?;
    Ok(Json(detail))
}

//! Shared HTTP state, error mapping, and the health endpoint.

use crate::graph::GraphStore;
use crate::identity::IdentityStore;
use crate::services::auth::AuthService;
use crate::services::injuries::InjuryService;
use crate::services::players::PlayerService;
use crate::services::status::StatusService;
use crate::services::teams::TeamService;
use crate::services::{NameResolver, ServiceError};
use crate::AppState;
use axum::extract::State;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::json;
use std::sync::Arc;

/// State shared by every handler.
#[derive(Clone)]
pub struct ServerState {
    pub graph: Arc<dyn GraphStore>,
    pub identity: Arc<dyn IdentityStore>,
    pub jwt_secret: String,
    pub jwt_expiry_secs: u64,
}

/// Build handler state from the connected application state.
pub fn server_state(state: AppState) -> ServerState {
    ServerState {
        graph: state.graph.clone(),
        identity: state.identity.clone(),
        jwt_secret: state.config.jwt_secret.clone(),
        jwt_expiry_secs: state.config.jwt_expiry_secs,
    }
}

impl ServerState {
    fn names(&self) -> NameResolver {
        NameResolver::new(self.identity.clone())
    }

    pub fn auth_service(&self) -> AuthService {
        AuthService::new(
            self.graph.clone(),
            self.identity.clone(),
            self.jwt_secret.clone(),
            self.jwt_expiry_secs,
        )
    }

    pub fn injury_service(&self) -> InjuryService {
        InjuryService::new(self.graph.clone(), self.names())
    }

    pub fn status_service(&self) -> StatusService {
        StatusService::new(self.graph.clone(), self.names())
    }

    pub fn team_service(&self) -> TeamService {
        TeamService::new(self.graph.clone(), self.names())
    }

    pub fn player_service(&self) -> PlayerService {
        PlayerService::new(self.graph.clone(), self.names())
    }
}

// ============================================================================
// Error handling
// ============================================================================

/// API error type that converts to an HTTP response
#[derive(Debug)]
pub enum AppError {
    NotFound(String),
    BadRequest(String),
    Conflict(String),
    Unauthorized(String),
    Forbidden(String),
    Internal(String),
}

impl From<ServiceError> for AppError {
    fn from(err: ServiceError) -> Self {
        match err {
            ServiceError::NotFound(msg) => AppError::NotFound(msg),
            ServiceError::BadRequest(msg) => AppError::BadRequest(msg),
            ServiceError::Conflict(msg) => AppError::Conflict(msg),
            ServiceError::Unauthorized(msg) => AppError::Unauthorized(msg),
            ServiceError::Forbidden(msg) => AppError::Forbidden(msg),
            ServiceError::Internal(e) => AppError::Internal(e.to_string()),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            AppError::NotFound(msg) => (StatusCode::NOT_FOUND, msg),
            AppError::BadRequest(msg) => (StatusCode::BAD_REQUEST, msg),
            AppError::Conflict(msg) => (StatusCode::CONFLICT, msg),
            AppError::Unauthorized(msg) => (StatusCode::UNAUTHORIZED, msg),
            AppError::Forbidden(msg) => (StatusCode::FORBIDDEN, msg),
            AppError::Internal(msg) => {
                tracing::error!("Internal error: {}", msg);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Internal server error".to_string(),
                )
            }
        };

        (status, Json(json!({ "error": message }))).into_response()
    }
}

// ============================================================================
// Health
// ============================================================================

/// GET /health — probes both stores.
pub async fn health(State(state): State<ServerState>) -> impl IntoResponse {
    let graph_ok = state.graph.health_check().await.unwrap_or(false);
    let identity_ok = state.identity.health_check().await.unwrap_or(false);
    let healthy = graph_ok && identity_ok;

    let status = if healthy {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    };
    (
        status,
        Json(json!({
            "status": if healthy { "ok" } else { "degraded" },
            "graph": graph_ok,
            "identity": identity_ok,
        })),
    )
}

//! API route definitions

use super::handlers::{self, ServerState};
use super::{auth_handlers, injury_handlers, player_handlers, status_handlers, team_handlers};
use crate::auth::middleware::require_auth;
use axum::middleware::from_fn_with_state;
use axum::{
    routing::{get, patch, post},
    Router,
};
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

/// Create the API router
pub fn create_router(state: ServerState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    let public = Router::new()
        .route("/health", get(handlers::health))
        .route("/auth/register", post(auth_handlers::register))
        .route("/auth/login", post(auth_handlers::login));

    let protected = Router::new()
        // ====================================================================
        // Injuries
        // ====================================================================
        .route(
            "/injuries",
            get(injury_handlers::list).post(injury_handlers::create),
        )
        .route(
            "/injuries/{injury_id}",
            get(injury_handlers::get_one).patch(injury_handlers::update),
        )
        .route("/injuries/{injury_id}/resolve", post(injury_handlers::resolve))
        // ====================================================================
        // Daily status
        // ====================================================================
        .route(
            "/status/players/{player_id}/status",
            patch(status_handlers::update_status),
        )
        .route("/status/latest", get(status_handlers::latest))
        .route(
            "/status/players/{player_id}/history",
            get(status_handlers::history),
        )
        // ====================================================================
        // Teams
        // ====================================================================
        .route("/teams/coach/my-teams", get(team_handlers::my_teams))
        .route("/teams/{team_id}/players", get(team_handlers::roster))
        .route("/teams/{team_id}", get(team_handlers::details))
        // ====================================================================
        // Players
        // ====================================================================
        .route("/players", get(player_handlers::list))
        .route("/players/{player_id}", get(player_handlers::get_one))
        .route("/players/{player_id}/injuries", get(player_handlers::injuries))
        .layer(from_fn_with_state(state.clone(), require_auth));

    Router::new()
        .merge(public)
        .merge(protected)
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(state)
}

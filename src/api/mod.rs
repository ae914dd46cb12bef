//! HTTP layer: router, shared state, error mapping, and per-domain handlers.

pub mod auth_handlers;
pub mod handlers;
pub mod injury_handlers;
pub mod player_handlers;
pub mod query;
pub mod routes;
pub mod status_handlers;
pub mod team_handlers;

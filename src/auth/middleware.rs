//! Auth middleware for Axum routes.
//!
//! Validates JWT Bearer tokens and injects Claims into request extensions.

use crate::api::handlers::{AppError, ServerState};
use crate::auth::jwt::decode_jwt;
use axum::{
    extract::{Request, State},
    middleware::Next,
    response::Response,
};

/// Middleware that requires a valid JWT Bearer token.
///
/// # Behavior
/// 1. Extract `Authorization: Bearer <token>` header → 401 if missing
/// 2. Validate JWT with the configured secret → 401 if invalid/expired
/// 3. Inject `Claims` into request extensions for downstream handlers
pub async fn require_auth(
    State(state): State<ServerState>,
    mut req: Request,
    next: Next,
) -> Result<Response, AppError> {
    let auth_header = req
        .headers()
        .get("authorization")
        .and_then(|v| v.to_str().ok())
        .ok_or_else(|| AppError::Unauthorized("Missing Authorization header".to_string()))?;

    let token = auth_header
        .strip_prefix("Bearer ")
        .ok_or_else(|| AppError::Unauthorized("Invalid Authorization header format".to_string()))?;

    let claims = decode_jwt(token, &state.jwt_secret)
        .map_err(|e| AppError::Unauthorized(format!("Invalid token: {}", e)))?;

    req.extensions_mut().insert(claims);

    Ok(next.run(req).await)
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::jwt::{encode_jwt, Claims};
    use crate::graph::mock::MockGraphStore;
    use crate::identity::mock::MockIdentityStore;
    use crate::identity::models::Role;
    use axum::body::Body;
    use axum::http::{Request as HttpRequest, StatusCode};
    use axum::middleware::from_fn_with_state;
    use axum::routing::get;
    use axum::{Extension, Router};
    use std::sync::Arc;
    use tower::ServiceExt; // for `oneshot`
    use uuid::Uuid;

    const TEST_SECRET: &str = "test-secret-key-minimum-32-chars!!";

    fn test_state() -> ServerState {
        ServerState {
            graph: Arc::new(MockGraphStore::new()),
            identity: Arc::new(MockIdentityStore::new()),
            jwt_secret: TEST_SECRET.to_string(),
            jwt_expiry_secs: 3600,
        }
    }

    async fn whoami(Extension(claims): Extension<Claims>) -> String {
        claims.pseudonym_id
    }

    fn test_router() -> Router {
        let state = test_state();
        Router::new()
            .route("/whoami", get(whoami))
            .layer(from_fn_with_state(state.clone(), require_auth))
            .with_state(state)
    }

    #[tokio::test]
    async fn test_missing_header_is_401() {
        let response = test_router()
            .oneshot(
                HttpRequest::builder()
                    .uri("/whoami")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn test_malformed_header_is_401() {
        let response = test_router()
            .oneshot(
                HttpRequest::builder()
                    .uri("/whoami")
                    .header("authorization", "Basic abc123")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn test_invalid_token_is_401() {
        let response = test_router()
            .oneshot(
                HttpRequest::builder()
                    .uri("/whoami")
                    .header("authorization", "Bearer not.a.jwt")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn test_valid_token_injects_claims() {
        let token = encode_jwt(
            Uuid::new_v4(),
            "player@club.example",
            Role::Player,
            "PSY-PLAYER-abc123",
            TEST_SECRET,
            3600,
        )
        .unwrap();

        let response = test_router()
            .oneshot(
                HttpRequest::builder()
                    .uri("/whoami")
                    .header("authorization", format!("Bearer {}", token))
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        let body = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        assert_eq!(&body[..], b"PSY-PLAYER-abc123");
    }
}

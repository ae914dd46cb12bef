//! API integration tests
//!
//! Drive the full router in-process over the in-memory stores, covering the
//! register -> seed -> report -> roster flow and the role/ownership gates.

use axum::body::Body;
use axum::http::{Request, StatusCode};
use axum::Router;
use serde_json::{json, Value};
use sideline::api::handlers::ServerState;
use sideline::api::routes::create_router;
use sideline::graph::mock::MockGraphStore;
use sideline::graph::models::TeamNode;
use sideline::graph::GraphStore;
use sideline::identity::mock::MockIdentityStore;
use std::sync::Arc;
use tower::ServiceExt; // for `oneshot`

const TEST_SECRET: &str = "test-secret-key-minimum-32-chars!!";
const TEAM: &str = "TEAM-001";

struct TestApp {
    router: Router,
    graph: Arc<MockGraphStore>,
}

fn test_app() -> TestApp {
    let graph = Arc::new(MockGraphStore::new());
    let identity = Arc::new(MockIdentityStore::new());
    let state = ServerState {
        graph: graph.clone(),
        identity,
        jwt_secret: TEST_SECRET.to_string(),
        jwt_expiry_secs: 3600,
    };
    TestApp {
        router: create_router(state),
        graph,
    }
}

impl TestApp {
    async fn request(
        &self,
        method: &str,
        path: &str,
        token: Option<&str>,
        body: Option<Value>,
    ) -> (StatusCode, Value) {
        let mut builder = Request::builder().method(method).uri(path);
        if let Some(token) = token {
            builder = builder.header("authorization", format!("Bearer {}", token));
        }
        let request = match body {
            Some(body) => builder
                .header("content-type", "application/json")
                .body(Body::from(body.to_string()))
                .unwrap(),
            None => builder.body(Body::empty()).unwrap(),
        };

        let response = self.router.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        let value = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap_or(Value::Null)
        };
        (status, value)
    }

    /// Register an account and return (token, pseudonym id).
    async fn register(&self, email: &str, role: &str, first: &str, last: &str) -> (String, String) {
        let (status, body) = self
            .request(
                "POST",
                "/auth/register",
                None,
                Some(json!({
                    "email": email,
                    "password": "correct-horse",
                    "identityType": role,
                    "firstName": first,
                    "lastName": last,
                })),
            )
            .await;
        assert_eq!(status, StatusCode::CREATED, "register failed: {}", body);
        (
            body["accessToken"].as_str().unwrap().to_string(),
            body["user"]["pseudonymId"].as_str().unwrap().to_string(),
        )
    }

    /// Seed a team and attach the given players and coach to it.
    async fn seed_team(&self, player_ids: &[&str], coach_id: &str) {
        self.graph
            .create_team(
                &TeamNode {
                    team_id: TEAM.to_string(),
                    name: "Falcons".to_string(),
                    sport: "Football".to_string(),
                    age_group: "U17".to_string(),
                    gender: "F".to_string(),
                    season_start: "2026-01-15".parse().unwrap(),
                    season_end: "2026-11-20".parse().unwrap(),
                },
                "Northside Club",
            )
            .await
            .unwrap();
        for id in player_ids {
            self.graph.link_player_to_team(id, TEAM).await.unwrap();
        }
        self.graph.link_coach_to_team(coach_id, TEAM).await.unwrap();
    }
}

fn injury_body(player_id: &str) -> Value {
    json!({
        "playerId": player_id,
        "injuryType": "Sprain",
        "bodyPart": "Ankle",
        "side": "Left",
        "severity": "Moderate",
        "dateOfInjury": "2026-03-01",
        "mechanism": "Landing",
    })
}

// ============================================================================
// Auth
// ============================================================================

#[tokio::test]
async fn test_protected_routes_require_token() {
    let app = test_app();
    let (status, _) = app.request("GET", "/injuries", None, None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_health_is_public() {
    let app = test_app();
    let (status, body) = app.request("GET", "/health", None, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "ok");
}

#[tokio::test]
async fn test_duplicate_registration_is_unauthorized() {
    let app = test_app();
    app.register("maya@club.example", "player", "Maya", "Lindqvist")
        .await;

    let (status, _) = app
        .request(
            "POST",
            "/auth/register",
            None,
            Some(json!({
                "email": "maya@club.example",
                "password": "correct-horse",
                "identityType": "player",
                "firstName": "Maya",
                "lastName": "Lindqvist",
            })),
        )
        .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_login_lockout_after_five_failures() {
    let app = test_app();
    app.register("maya@club.example", "player", "Maya", "Lindqvist")
        .await;

    for _ in 0..5 {
        let (status, _) = app
            .request(
                "POST",
                "/auth/login",
                None,
                Some(json!({ "email": "maya@club.example", "password": "wrong" })),
            )
            .await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
    }

    // Correct credentials are still rejected once locked
    let (status, body) = app
        .request(
            "POST",
            "/auth/login",
            None,
            Some(json!({ "email": "maya@club.example", "password": "correct-horse" })),
        )
        .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["error"], "Account is locked");
}

// ============================================================================
// End-to-end roster flow
// ============================================================================

#[tokio::test]
async fn test_roster_reported_today_and_active_injury_counts() {
    let app = test_app();
    let (player_token, player_id) = app
        .register("maya@club.example", "player", "Maya", "Lindqvist")
        .await;
    let (_, quiet_player_id) = app
        .register("alva@club.example", "player", "Alva", "Nyström")
        .await;
    let (coach_token, coach_id) = app
        .register("jonas@club.example", "coach", "Jonas", "Berg")
        .await;
    app.seed_team(&[&player_id, &quiet_player_id], &coach_id)
        .await;

    // Player reports today's status
    let (status, _) = app
        .request(
            "PATCH",
            &format!("/status/players/{}/status", player_id),
            Some(&player_token),
            Some(json!({ "status": "GREEN" })),
        )
        .await;
    assert_eq!(status, StatusCode::OK);

    // Coach reports an injury for the quiet player
    let (status, _) = app
        .request(
            "POST",
            "/injuries",
            Some(&coach_token),
            Some(injury_body(&quiet_player_id)),
        )
        .await;
    assert_eq!(status, StatusCode::CREATED);

    // Coach fetches the roster
    let (status, body) = app
        .request(
            "GET",
            &format!("/teams/{}/players", TEAM),
            Some(&coach_token),
            None,
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["totalPlayers"], 2);
    assert_eq!(body["playersReportedToday"], 1);

    let players = body["players"].as_array().unwrap();
    let reported = players
        .iter()
        .find(|p| p["playerId"] == player_id.as_str())
        .unwrap();
    assert_eq!(reported["status"], "GREEN");
    assert_eq!(reported["playerName"], "Maya Lindqvist");
    assert_eq!(reported["activeInjuryCount"], 0);

    let injured = players
        .iter()
        .find(|p| p["playerId"] == quiet_player_id.as_str())
        .unwrap();
    assert_eq!(injured["status"], "UNKNOWN");
    assert_eq!(injured["activeInjuryCount"], 1);
}

#[tokio::test]
async fn test_roster_denied_for_non_managing_coach_and_players() {
    let app = test_app();
    let (player_token, player_id) = app
        .register("maya@club.example", "player", "Maya", "Lindqvist")
        .await;
    let (coach_token, coach_id) = app
        .register("jonas@club.example", "coach", "Jonas", "Berg")
        .await;
    let (other_coach_token, _) = app
        .register("erik@club.example", "coach", "Erik", "Dahl")
        .await;
    app.seed_team(&[&player_id], &coach_id).await;

    let path = format!("/teams/{}/players", TEAM);
    let (status, _) = app.request("GET", &path, Some(&coach_token), None).await;
    assert_eq!(status, StatusCode::OK);

    let (status, _) = app
        .request("GET", &path, Some(&other_coach_token), None)
        .await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (status, _) = app.request("GET", &path, Some(&player_token), None).await;
    assert_eq!(status, StatusCode::FORBIDDEN);
}

// ============================================================================
// Injuries
// ============================================================================

#[tokio::test]
async fn test_player_injury_listing_is_subset_of_admin() {
    let app = test_app();
    let (player_token, player_id) = app
        .register("maya@club.example", "player", "Maya", "Lindqvist")
        .await;
    let (_, other_id) = app
        .register("alva@club.example", "player", "Alva", "Nyström")
        .await;
    let (admin_token, _) = app
        .register("admin@club.example", "admin", "Sam", "Holm")
        .await;

    for target in [&player_id, &other_id] {
        let (status, _) = app
            .request(
                "POST",
                "/injuries",
                Some(&admin_token),
                Some(injury_body(target)),
            )
            .await;
        assert_eq!(status, StatusCode::CREATED);
    }

    let (_, admin_view) = app
        .request("GET", "/injuries", Some(&admin_token), None)
        .await;
    let (_, player_view) = app
        .request("GET", "/injuries", Some(&player_token), None)
        .await;

    assert_eq!(admin_view["pagination"]["total"], 2);
    assert_eq!(player_view["pagination"]["total"], 1);
    for injury in player_view["data"].as_array().unwrap() {
        assert_eq!(injury["playerId"], player_id.as_str());
    }
}

#[tokio::test]
async fn test_player_cannot_create_injury() {
    let app = test_app();
    let (player_token, player_id) = app
        .register("maya@club.example", "player", "Maya", "Lindqvist")
        .await;

    let (status, _) = app
        .request(
            "POST",
            "/injuries",
            Some(&player_token),
            Some(injury_body(&player_id)),
        )
        .await;
    assert_eq!(status, StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn test_double_resolve_returns_conflict() {
    let app = test_app();
    let (_, player_id) = app
        .register("maya@club.example", "player", "Maya", "Lindqvist")
        .await;
    let (coach_token, _) = app
        .register("jonas@club.example", "coach", "Jonas", "Berg")
        .await;

    let (_, created) = app
        .request(
            "POST",
            "/injuries",
            Some(&coach_token),
            Some(injury_body(&player_id)),
        )
        .await;
    let injury_id = created["injuryId"].as_str().unwrap().to_string();

    let resolve_body = json!({
        "returnToPlayDate": "2026-04-01",
        "resolutionNotes": "Cleared for full training",
        "medicalClearance": true,
    });
    let path = format!("/injuries/{}/resolve", injury_id);

    let (status, resolved) = app
        .request("POST", &path, Some(&coach_token), Some(resolve_body.clone()))
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(resolved["status"], "Recovered");

    let (status, _) = app
        .request("POST", &path, Some(&coach_token), Some(resolve_body))
        .await;
    assert_eq!(status, StatusCode::CONFLICT);

    // State unchanged after the failed second resolve
    let (_, detail) = app
        .request(
            "GET",
            &format!("/injuries/{}", injury_id),
            Some(&coach_token),
            None,
        )
        .await;
    assert_eq!(detail["status"], "Recovered");
    assert_eq!(detail["medicalClearance"], true);
}

#[tokio::test]
async fn test_partial_update_appends_history() {
    let app = test_app();
    let (_, player_id) = app
        .register("maya@club.example", "player", "Maya", "Lindqvist")
        .await;
    let (coach_token, _) = app
        .register("jonas@club.example", "coach", "Jonas", "Berg")
        .await;

    let (_, created) = app
        .request(
            "POST",
            "/injuries",
            Some(&coach_token),
            Some(injury_body(&player_id)),
        )
        .await;
    let injury_id = created["injuryId"].as_str().unwrap();

    let (status, updated) = app
        .request(
            "PATCH",
            &format!("/injuries/{}", injury_id),
            Some(&coach_token),
            Some(json!({ "status": "Recovering", "statusNote": "Swelling down" })),
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(updated["status"], "Recovering");
    // Untouched fields keep their values
    assert_eq!(updated["bodyPart"], "Ankle");
    let history = updated["history"].as_array().unwrap();
    assert_eq!(history.len(), 1);
    assert_eq!(history[0]["note"], "Swelling down");
}

// ============================================================================
// Status ownership
// ============================================================================

#[tokio::test]
async fn test_status_update_ownership() {
    let app = test_app();
    let (player_token, _) = app
        .register("maya@club.example", "player", "Maya", "Lindqvist")
        .await;
    let (_, other_id) = app
        .register("alva@club.example", "player", "Alva", "Nyström")
        .await;
    let (coach_token, _) = app
        .register("jonas@club.example", "coach", "Jonas", "Berg")
        .await;

    let path = format!("/status/players/{}/status", other_id);
    let body = json!({ "status": "RED", "notes": "Knee pain" });

    let (status, _) = app
        .request("PATCH", &path, Some(&player_token), Some(body.clone()))
        .await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (status, response) = app
        .request("PATCH", &path, Some(&coach_token), Some(body))
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(response["success"], true);
    assert_eq!(response["data"]["status"], "RED");
    assert_eq!(response["data"]["note"], "Knee pain");
}

#[tokio::test]
async fn test_status_dashboard_is_staff_only() {
    let app = test_app();
    let (player_token, _) = app
        .register("maya@club.example", "player", "Maya", "Lindqvist")
        .await;
    let (status, _) = app
        .request("GET", "/status/latest", Some(&player_token), None)
        .await;
    assert_eq!(status, StatusCode::FORBIDDEN);
}

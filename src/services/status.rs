//! Daily readiness reporting and the coach dashboard.

use crate::graph::models::{DailyStatus, StatusUpdateNode, TeamStatusRow};
use crate::graph::GraphStore;
use crate::services::error::{ServiceError, ServiceResult};
use crate::services::injuries::StatusUpdateDto;
use crate::services::NameResolver;
use chrono::{NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use uuid::Uuid;

/// Status label shown when a player has not reported today
const UNKNOWN_STATUS: &str = "UNKNOWN";

pub struct StatusService {
    graph: Arc<dyn GraphStore>,
    names: NameResolver,
}

// ============================================================================
// DTOs
// ============================================================================

/// Daily status report payload
#[derive(Debug, Clone, Deserialize)]
pub struct StatusInput {
    pub status: DailyStatus,
    #[serde(alias = "notes")]
    pub note: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PlayerStatusDto {
    pub player_id: String,
    pub player_name: String,
    pub status: String,
    pub note: Option<String>,
    pub active_injury_count: i64,
}

/// Per-team tallies, computed in application code over the assembled
/// player list.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StatusSummary {
    pub green: usize,
    pub orange: usize,
    pub red: usize,
    pub no_status: usize,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TeamStatusDto {
    pub team_id: String,
    pub team_name: String,
    pub sport: String,
    pub players: Vec<PlayerStatusDto>,
    pub summary: StatusSummary,
}

impl StatusService {
    pub fn new(graph: Arc<dyn GraphStore>, names: NameResolver) -> Self {
        Self { graph, names }
    }

    /// Record a daily status for a player. Ownership is enforced by the
    /// handler guard before this is called.
    pub async fn update_status(
        &self,
        player_pseudonym_id: &str,
        input: StatusInput,
        today: NaiveDate,
    ) -> ServiceResult<StatusUpdateDto> {
        self.graph
            .get_player(player_pseudonym_id)
            .await?
            .ok_or_else(|| ServiceError::NotFound("Player not found".to_string()))?;

        let update = StatusUpdateNode {
            update_id: format!("SU-{}", Uuid::new_v4()),
            status: input.status,
            note: input.note,
            date: today,
            recorded_at: Utc::now(),
        };
        self.graph
            .create_status_update(player_pseudonym_id, &update)
            .await?;

        tracing::debug!(
            player_id = %player_pseudonym_id,
            status = update.status.as_str(),
            "Daily status recorded"
        );
        Ok(update.into())
    }

    /// Coach dashboard: every player on every managed team with today's
    /// status, grouped by team with traffic-light tallies.
    pub async fn latest_team_statuses(
        &self,
        coach_pseudonym_id: &str,
        today: NaiveDate,
    ) -> ServiceResult<Vec<TeamStatusDto>> {
        let rows = self
            .graph
            .latest_team_statuses(coach_pseudonym_id, today)
            .await?;

        let player_ids: Vec<String> = rows
            .iter()
            .map(|r| r.player.pseudonym_id.clone())
            .collect();
        let names = self.names.resolve(&player_ids).await;

        // Group rows by team, preserving query order
        let mut teams: Vec<TeamStatusDto> = Vec::new();
        for row in rows {
            let TeamStatusRow {
                team,
                player,
                today_status,
                today_note,
                open_injuries,
            } = row;

            let dto = PlayerStatusDto {
                player_name: NameResolver::display(&names, &player.pseudonym_id, "Unknown Player"),
                player_id: player.pseudonym_id,
                status: today_status
                    .map(|s| s.as_str().to_string())
                    .unwrap_or_else(|| UNKNOWN_STATUS.to_string()),
                note: today_note,
                active_injury_count: open_injuries,
            };

            match teams.iter_mut().find(|t| t.team_id == team.team_id) {
                Some(entry) => entry.players.push(dto),
                None => teams.push(TeamStatusDto {
                    team_id: team.team_id,
                    team_name: team.name,
                    sport: team.sport,
                    players: vec![dto],
                    summary: StatusSummary {
                        green: 0,
                        orange: 0,
                        red: 0,
                        no_status: 0,
                    },
                }),
            }
        }

        for team in &mut teams {
            team.summary = Self::tally(&team.players);
        }
        Ok(teams)
    }

    fn tally(players: &[PlayerStatusDto]) -> StatusSummary {
        let count = |label: &str| players.iter().filter(|p| p.status == label).count();
        StatusSummary {
            green: count("GREEN"),
            orange: count("ORANGE"),
            red: count("RED"),
            no_status: count(UNKNOWN_STATUS),
        }
    }

    /// Full status history for one player, newest first, unpaginated.
    pub async fn history(&self, player_pseudonym_id: &str) -> ServiceResult<Vec<StatusUpdateDto>> {
        self.graph
            .get_player(player_pseudonym_id)
            .await?
            .ok_or_else(|| ServiceError::NotFound("Player not found".to_string()))?;

        let updates = self.graph.status_history(player_pseudonym_id).await?;
        Ok(updates.into_iter().map(Into::into).collect())
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::mock::MockGraphStore;
    use crate::graph::models::{PlayerNode, TeamNode};
    use crate::identity::mock::MockIdentityStore;

    const COACH: &str = "PSY-COACH-ccc333";
    const TEAM: &str = "TEAM-001";

    fn team(id: &str, name: &str) -> TeamNode {
        TeamNode {
            team_id: id.to_string(),
            name: name.to_string(),
            sport: "Football".to_string(),
            age_group: "U17".to_string(),
            gender: "F".to_string(),
            season_start: "2026-01-15".parse().unwrap(),
            season_end: "2026-11-20".parse().unwrap(),
        }
    }

    fn player(id: &str) -> PlayerNode {
        PlayerNode {
            pseudonym_id: id.to_string(),
            position: None,
            jersey_number: None,
            active: true,
        }
    }

    async fn service_with_team() -> (Arc<MockGraphStore>, StatusService) {
        let graph = Arc::new(MockGraphStore::new());
        graph.create_team(&team(TEAM, "Falcons"), "Northside Club").await.unwrap();
        for id in ["PSY-PLAYER-aaa111", "PSY-PLAYER-bbb222", "PSY-PLAYER-ddd444"] {
            graph.create_player(&player(id)).await.unwrap();
            graph.link_player_to_team(id, TEAM).await.unwrap();
        }
        graph.link_coach_to_team(COACH, TEAM).await.unwrap();

        let service = StatusService::new(
            graph.clone(),
            NameResolver::new(Arc::new(MockIdentityStore::new())),
        );
        (graph, service)
    }

    fn today() -> NaiveDate {
        "2026-05-10".parse().unwrap()
    }

    #[tokio::test]
    async fn test_update_status_for_unknown_player_is_not_found() {
        let (_, service) = service_with_team().await;
        let err = service
            .update_status(
                "PSY-PLAYER-missing",
                StatusInput {
                    status: DailyStatus::Green,
                    note: None,
                },
                today(),
            )
            .await
            .unwrap_err();
        assert!(matches!(err, ServiceError::NotFound(_)));
    }

    #[tokio::test]
    async fn test_dashboard_tallies_and_unknown_status() {
        let (_, service) = service_with_team().await;
        service
            .update_status(
                "PSY-PLAYER-aaa111",
                StatusInput {
                    status: DailyStatus::Green,
                    note: None,
                },
                today(),
            )
            .await
            .unwrap();
        service
            .update_status(
                "PSY-PLAYER-bbb222",
                StatusInput {
                    status: DailyStatus::Red,
                    note: Some("Hamstring tight".to_string()),
                },
                today(),
            )
            .await
            .unwrap();
        // A report from yesterday does not count as today's status
        service
            .update_status(
                "PSY-PLAYER-ddd444",
                StatusInput {
                    status: DailyStatus::Orange,
                    note: None,
                },
                "2026-05-09".parse().unwrap(),
            )
            .await
            .unwrap();

        let dashboard = service.latest_team_statuses(COACH, today()).await.unwrap();
        assert_eq!(dashboard.len(), 1);
        let team = &dashboard[0];
        assert_eq!(team.team_name, "Falcons");
        assert_eq!(team.players.len(), 3);
        assert_eq!(team.summary.green, 1);
        assert_eq!(team.summary.red, 1);
        assert_eq!(team.summary.orange, 0);
        assert_eq!(team.summary.no_status, 1);

        let unreported = team
            .players
            .iter()
            .find(|p| p.player_id == "PSY-PLAYER-ddd444")
            .unwrap();
        assert_eq!(unreported.status, "UNKNOWN");
    }

    #[tokio::test]
    async fn test_same_day_reports_keep_most_recent() {
        let (_, service) = service_with_team().await;
        service
            .update_status(
                "PSY-PLAYER-aaa111",
                StatusInput {
                    status: DailyStatus::Orange,
                    note: None,
                },
                today(),
            )
            .await
            .unwrap();
        service
            .update_status(
                "PSY-PLAYER-aaa111",
                StatusInput {
                    status: DailyStatus::Green,
                    note: Some("Felt better after warmup".to_string()),
                },
                today(),
            )
            .await
            .unwrap();

        let dashboard = service.latest_team_statuses(COACH, today()).await.unwrap();
        let player = dashboard[0]
            .players
            .iter()
            .find(|p| p.player_id == "PSY-PLAYER-aaa111")
            .unwrap();
        assert_eq!(player.status, "GREEN");
    }

    #[tokio::test]
    async fn test_history_newest_first() {
        let (_, service) = service_with_team().await;
        for (date, status) in [
            ("2026-05-08", DailyStatus::Green),
            ("2026-05-09", DailyStatus::Orange),
            ("2026-05-10", DailyStatus::Red),
        ] {
            service
                .update_status(
                    "PSY-PLAYER-aaa111",
                    StatusInput {
                        status,
                        note: None,
                    },
                    date.parse().unwrap(),
                )
                .await
                .unwrap();
        }

        let history = service.history("PSY-PLAYER-aaa111").await.unwrap();
        assert_eq!(history.len(), 3);
        assert_eq!(history[0].status, DailyStatus::Red);
        assert_eq!(history[2].status, DailyStatus::Green);
    }

    #[tokio::test]
    async fn test_dashboard_empty_for_coach_without_teams() {
        let (_, service) = service_with_team().await;
        let dashboard = service
            .latest_team_statuses("PSY-COACH-other", today())
            .await
            .unwrap();
        assert!(dashboard.is_empty());
    }
}

//! Team roster, team details, and coach access checks.

use crate::graph::models::TeamNode;
use crate::graph::GraphStore;
use crate::services::error::{ServiceError, ServiceResult};
use crate::services::NameResolver;
use chrono::NaiveDate;
use serde::Serialize;
use std::sync::Arc;

pub struct TeamService {
    graph: Arc<dyn GraphStore>,
    names: NameResolver,
}

// ============================================================================
// DTOs
// ============================================================================

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TeamDto {
    pub team_id: String,
    pub name: String,
    pub sport: String,
    pub age_group: String,
    pub gender: String,
    pub season_start: NaiveDate,
    pub season_end: NaiveDate,
}

impl From<TeamNode> for TeamDto {
    fn from(team: TeamNode) -> Self {
        Self {
            team_id: team.team_id,
            name: team.name,
            sport: team.sport,
            age_group: team.age_group,
            gender: team.gender,
            season_start: team.season_start,
            season_end: team.season_end,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RosterPlayerDto {
    pub player_id: String,
    pub player_name: String,
    pub position: Option<String>,
    pub jersey_number: Option<i64>,
    pub status: String,
    pub status_note: Option<String>,
    pub active_injury_count: i64,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RosterDto {
    pub team_id: String,
    pub team_name: String,
    pub sport: String,
    pub total_players: usize,
    pub players_reported_today: usize,
    pub players: Vec<RosterPlayerDto>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CoachDto {
    pub coach_id: String,
    pub coach_name: String,
    pub specialization: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TeamDetailDto {
    #[serde(flatten)]
    pub team: TeamDto,
    pub organization: String,
    pub player_count: i64,
    pub coaches: Vec<CoachDto>,
}

impl TeamService {
    pub fn new(graph: Arc<dyn GraphStore>, names: NameResolver) -> Self {
        Self { graph, names }
    }

    /// Roster with today's traffic-light per player and reporting counts.
    pub async fn roster(&self, team_id: &str, today: NaiveDate) -> ServiceResult<RosterDto> {
        let (team, rows) = self
            .graph
            .team_roster(team_id, today)
            .await?
            .ok_or_else(|| ServiceError::NotFound("Team not found".to_string()))?;

        let player_ids: Vec<String> = rows
            .iter()
            .map(|r| r.player.pseudonym_id.clone())
            .collect();
        let names = self.names.resolve(&player_ids).await;

        let total_players = rows.len();
        let players_reported_today = rows.iter().filter(|r| r.today_status.is_some()).count();

        let players = rows
            .into_iter()
            .map(|row| RosterPlayerDto {
                player_name: NameResolver::display(
                    &names,
                    &row.player.pseudonym_id,
                    "Unknown Player",
                ),
                player_id: row.player.pseudonym_id,
                position: row.player.position,
                jersey_number: row.player.jersey_number,
                status: row
                    .today_status
                    .map(|s| s.as_str().to_string())
                    .unwrap_or_else(|| "UNKNOWN".to_string()),
                status_note: row.today_note,
                active_injury_count: row.open_injuries,
            })
            .collect();

        Ok(RosterDto {
            team_id: team.team_id,
            team_name: team.name,
            sport: team.sport,
            total_players,
            players_reported_today,
            players,
        })
    }

    /// Team with organization, coaching staff, and player count.
    pub async fn details(&self, team_id: &str) -> ServiceResult<TeamDetailDto> {
        let detail = self
            .graph
            .get_team_detail(team_id)
            .await?
            .ok_or_else(|| ServiceError::NotFound("Team not found".to_string()))?;

        let coach_ids: Vec<String> = detail
            .coaches
            .iter()
            .map(|c| c.pseudonym_id.clone())
            .collect();
        let names = self.names.resolve(&coach_ids).await;

        let coaches = detail
            .coaches
            .into_iter()
            .map(|coach| CoachDto {
                coach_name: NameResolver::display(&names, &coach.pseudonym_id, "Unknown"),
                coach_id: coach.pseudonym_id,
                specialization: coach.specialization,
            })
            .collect();

        Ok(TeamDetailDto {
            team: detail.team.into(),
            organization: detail.organization,
            player_count: detail.player_count,
            coaches,
        })
    }

    /// Fail-closed MANAGES check: any error while verifying access denies it.
    pub async fn coach_has_access(&self, coach_pseudonym_id: &str, team_id: &str) -> bool {
        match self
            .graph
            .coach_manages_team(coach_pseudonym_id, team_id)
            .await
        {
            Ok(manages) => manages,
            Err(e) => {
                tracing::warn!(
                    coach_id = %coach_pseudonym_id,
                    team_id = %team_id,
                    "Access check failed, denying: {}",
                    e
                );
                false
            }
        }
    }

    /// Teams managed by the calling coach.
    pub async fn my_teams(&self, coach_pseudonym_id: &str) -> ServiceResult<Vec<TeamDto>> {
        let teams = self.graph.teams_for_coach(coach_pseudonym_id).await?;
        Ok(teams.into_iter().map(Into::into).collect())
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::mock::MockGraphStore;
    use crate::graph::models::{CoachNode, DailyStatus, PlayerNode, StatusUpdateNode, TeamNode};
    use crate::identity::mock::MockIdentityStore;
    use crate::identity::models::NameInfo;
    use chrono::Utc;

    const COACH: &str = "PSY-COACH-ccc333";
    const TEAM: &str = "TEAM-001";

    async fn service() -> (Arc<MockGraphStore>, TeamService) {
        let graph = Arc::new(MockGraphStore::new());
        graph
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
        graph
            .create_coach(&CoachNode {
                pseudonym_id: COACH.to_string(),
                specialization: Some("Strength".to_string()),
            })
            .await
            .unwrap();
        graph.link_coach_to_team(COACH, TEAM).await.unwrap();

        for id in ["PSY-PLAYER-aaa111", "PSY-PLAYER-bbb222"] {
            graph
                .create_player(&PlayerNode {
                    pseudonym_id: id.to_string(),
                    position: Some("Forward".to_string()),
                    jersey_number: Some(9),
                    active: true,
                })
                .await
                .unwrap();
            graph.link_player_to_team(id, TEAM).await.unwrap();
        }

        let identity = Arc::new(MockIdentityStore::new());
        identity.names.write().await.insert(
            COACH.to_string(),
            NameInfo {
                first_name: "Jonas".to_string(),
                last_name: "Berg".to_string(),
            },
        );

        let service = TeamService::new(graph.clone(), NameResolver::new(identity));
        (graph, service)
    }

    fn today() -> NaiveDate {
        "2026-05-10".parse().unwrap()
    }

    #[tokio::test]
    async fn test_roster_counts_players_reported_today() {
        let (graph, service) = service().await;
        graph
            .create_status_update(
                "PSY-PLAYER-aaa111",
                &StatusUpdateNode {
                    update_id: "SU-1".to_string(),
                    status: DailyStatus::Green,
                    note: None,
                    date: today(),
                    recorded_at: Utc::now(),
                },
            )
            .await
            .unwrap();

        let roster = service.roster(TEAM, today()).await.unwrap();
        assert_eq!(roster.total_players, 2);
        assert_eq!(roster.players_reported_today, 1);
        assert_eq!(roster.players.len(), 2);
        // Unresolved names fall back to a placeholder
        assert_eq!(roster.players[0].player_name, "Unknown Player");
    }

    #[tokio::test]
    async fn test_roster_unknown_team_is_not_found() {
        let (_, service) = service().await;
        let err = service.roster("TEAM-nope", today()).await.unwrap_err();
        assert!(matches!(err, ServiceError::NotFound(_)));
    }

    #[tokio::test]
    async fn test_details_include_named_coaches() {
        let (_, service) = service().await;
        let detail = service.details(TEAM).await.unwrap();
        assert_eq!(detail.organization, "Northside Club");
        assert_eq!(detail.player_count, 2);
        assert_eq!(detail.coaches.len(), 1);
        assert_eq!(detail.coaches[0].coach_name, "Jonas Berg");
    }

    #[tokio::test]
    async fn test_access_check_happy_paths() {
        let (_, service) = service().await;
        assert!(service.coach_has_access(COACH, TEAM).await);
        assert!(!service.coach_has_access("PSY-COACH-other", TEAM).await);
    }

    #[tokio::test]
    async fn test_access_check_fails_closed_on_store_error() {
        let (graph, service) = service().await;
        graph.set_failing(true).await;
        assert!(!service.coach_has_access(COACH, TEAM).await);
    }

    #[tokio::test]
    async fn test_my_teams() {
        let (_, service) = service().await;
        let teams = service.my_teams(COACH).await.unwrap();
        assert_eq!(teams.len(), 1);
        assert_eq!(teams[0].name, "Falcons");
        assert!(service.my_teams("PSY-COACH-other").await.unwrap().is_empty());
    }
}

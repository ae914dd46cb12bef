//! Player directory and per-player views (staff-facing).

use crate::graph::models::TeamRef;
use crate::graph::GraphStore;
use crate::services::error::{ServiceError, ServiceResult};
use crate::services::NameResolver;
use chrono::{DateTime, NaiveDate, Utc};
use serde::Serialize;
use std::sync::Arc;

pub struct PlayerService {
    graph: Arc<dyn GraphStore>,
    names: NameResolver,
}

// ============================================================================
// DTOs
// ============================================================================

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PlayerListDto {
    pub player_id: String,
    pub player_name: String,
    pub position: Option<String>,
    pub jersey_number: Option<i64>,
    pub active: bool,
    pub team_name: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PlayerDetailDto {
    pub player_id: String,
    pub player_name: String,
    pub position: Option<String>,
    pub jersey_number: Option<i64>,
    pub active: bool,
    pub team: Option<TeamRef>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PlayerInjuryDto {
    pub injury_id: String,
    pub injury_type: String,
    pub body_part: String,
    pub severity: String,
    pub status: crate::graph::models::InjuryStatus,
    pub date_of_injury: NaiveDate,
    pub diagnosed_date: Option<NaiveDate>,
    pub reported_by: Option<String>,
    pub reported_by_name: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl PlayerService {
    pub fn new(graph: Arc<dyn GraphStore>, names: NameResolver) -> Self {
        Self { graph, names }
    }

    /// Directory of all players with team names, sorted by display name.
    pub async fn list(&self) -> ServiceResult<Vec<PlayerListDto>> {
        let rows = self.graph.list_players().await?;

        let ids: Vec<String> = rows.iter().map(|r| r.player.pseudonym_id.clone()).collect();
        let names = self.names.resolve(&ids).await;

        let mut players: Vec<PlayerListDto> = rows
            .into_iter()
            .map(|row| PlayerListDto {
                player_name: NameResolver::display(
                    &names,
                    &row.player.pseudonym_id,
                    "Unknown Player",
                ),
                player_id: row.player.pseudonym_id,
                position: row.player.position,
                jersey_number: row.player.jersey_number,
                active: row.player.active,
                team_name: row.team_name,
            })
            .collect();

        players.sort_by(|a, b| {
            a.player_name
                .cmp(&b.player_name)
                .then(a.player_id.cmp(&b.player_id))
        });
        Ok(players)
    }

    /// One player with their team reference.
    pub async fn get(&self, player_pseudonym_id: &str) -> ServiceResult<PlayerDetailDto> {
        let detail = self
            .graph
            .get_player_detail(player_pseudonym_id)
            .await?
            .ok_or_else(|| ServiceError::NotFound("Player not found".to_string()))?;

        let names = self.names.resolve(&[player_pseudonym_id.to_string()]).await;

        Ok(PlayerDetailDto {
            player_name: NameResolver::display(&names, player_pseudonym_id, "Unknown Player"),
            player_id: detail.player.pseudonym_id,
            position: detail.player.position,
            jersey_number: detail.player.jersey_number,
            active: detail.player.active,
            team: detail.team,
        })
    }

    /// Injury history for one player, newest first, with reporter names.
    pub async fn injuries(&self, player_pseudonym_id: &str) -> ServiceResult<Vec<PlayerInjuryDto>> {
        self.graph
            .get_player(player_pseudonym_id)
            .await?
            .ok_or_else(|| ServiceError::NotFound("Player not found".to_string()))?;

        let rows = self.graph.get_player_injuries(player_pseudonym_id).await?;

        let reporter_ids: Vec<String> = rows
            .iter()
            .filter_map(|r| r.reported_by.clone())
            .collect();
        let names = self.names.resolve(&reporter_ids).await;

        Ok(rows
            .into_iter()
            .map(|row| PlayerInjuryDto {
                injury_id: row.injury.injury_id,
                injury_type: row.injury.injury_type,
                body_part: row.injury.body_part,
                severity: row.injury.severity,
                status: row.injury.status,
                date_of_injury: row.injury.date_of_injury,
                diagnosed_date: row.diagnosed_date,
                reported_by_name: row
                    .reported_by
                    .as_deref()
                    .map(|id| NameResolver::display(&names, id, "Unknown")),
                reported_by: row.reported_by,
                created_at: row.injury.created_at,
            })
            .collect())
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
    use crate::identity::models::NameInfo;

    async fn service() -> (Arc<MockGraphStore>, PlayerService) {
        let graph = Arc::new(MockGraphStore::new());
        graph
            .create_team(
                &TeamNode {
                    team_id: "TEAM-001".to_string(),
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

        let identity = Arc::new(MockIdentityStore::new());
        for (id, first, last) in [
            ("PSY-PLAYER-aaa111", "Maya", "Lindqvist"),
            ("PSY-PLAYER-bbb222", "Alva", "Nyström"),
        ] {
            graph
                .create_player(&PlayerNode {
                    pseudonym_id: id.to_string(),
                    position: None,
                    jersey_number: None,
                    active: true,
                })
                .await
                .unwrap();
            graph.link_player_to_team(id, "TEAM-001").await.unwrap();
            identity.names.write().await.insert(
                id.to_string(),
                NameInfo {
                    first_name: first.to_string(),
                    last_name: last.to_string(),
                },
            );
        }

        let service = PlayerService::new(graph.clone(), NameResolver::new(identity));
        (graph, service)
    }

    #[tokio::test]
    async fn test_list_sorted_by_display_name() {
        let (_, service) = service().await;
        let players = service.list().await.unwrap();
        assert_eq!(players.len(), 2);
        assert_eq!(players[0].player_name, "Alva Nyström");
        assert_eq!(players[1].player_name, "Maya Lindqvist");
        assert_eq!(players[0].team_name.as_deref(), Some("Falcons"));
    }

    #[tokio::test]
    async fn test_get_includes_team_ref() {
        let (_, service) = service().await;
        let player = service.get("PSY-PLAYER-aaa111").await.unwrap();
        assert_eq!(player.player_name, "Maya Lindqvist");
        let team = player.team.unwrap();
        assert_eq!(team.team_id, "TEAM-001");
        assert_eq!(team.sport, "Football");
    }

    #[tokio::test]
    async fn test_get_unknown_player_is_not_found() {
        let (_, service) = service().await;
        let err = service.get("PSY-PLAYER-missing").await.unwrap_err();
        assert!(matches!(err, ServiceError::NotFound(_)));
    }

    #[tokio::test]
    async fn test_injuries_empty_for_healthy_player() {
        let (_, service) = service().await;
        let injuries = service.injuries("PSY-PLAYER-aaa111").await.unwrap();
        assert!(injuries.is_empty());
    }
}

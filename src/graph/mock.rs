//! In-memory mock implementation of GraphStore.
//!
//! Backed by `tokio::sync::RwLock<HashMap<K, V>>` collections plus adjacency
//! maps for the edges. Used by unit tests and the integration suite, so it is
//! compiled unconditionally.

use crate::graph::models::*;
use crate::graph::traits::GraphStore;
use anyhow::{anyhow, Result};
use async_trait::async_trait;
use chrono::NaiveDate;
use std::collections::HashMap;
use tokio::sync::RwLock;

/// In-memory mock implementation of GraphStore.
#[derive(Default)]
pub struct MockGraphStore {
    // Entity stores
    pub players: RwLock<HashMap<String, PlayerNode>>,
    pub coaches: RwLock<HashMap<String, CoachNode>>,
    /// team_id -> (team, organization name)
    pub teams: RwLock<HashMap<String, (TeamNode, String)>>,
    pub injuries: RwLock<HashMap<String, InjuryNode>>,

    // Edges
    /// injury_id -> (player pseudonym_id, SUSTAINED properties)
    pub sustained: RwLock<HashMap<String, (String, SustainedEdge)>>,
    /// player pseudonym_id -> team_id (PLAYS_FOR)
    pub player_teams: RwLock<HashMap<String, String>>,
    /// coach pseudonym_id -> team_ids (MANAGES)
    pub coach_teams: RwLock<HashMap<String, Vec<String>>>,
    /// player pseudonym_id -> StatusUpdates (HAS_STATUS, insertion order)
    pub player_statuses: RwLock<HashMap<String, Vec<StatusUpdateNode>>>,
    /// injury_id -> StatusUpdates (HAS_STATUS_UPDATE, insertion order)
    pub injury_updates: RwLock<HashMap<String, Vec<StatusUpdateNode>>>,

    /// When true, every query returns an error. Used to exercise
    /// fail-closed and degraded-mode paths.
    pub fail_queries: RwLock<bool>,

    /// Pending compare-and-swap misses: while positive, `create_injury`
    /// reports the id as taken without writing, as if a concurrent create
    /// won the race. Decremented on each miss.
    pub cas_misses: RwLock<u32>,
}

impl MockGraphStore {
    /// Create a new empty MockGraphStore.
    pub fn new() -> Self {
        Self::default()
    }

    /// Make every subsequent query fail.
    pub async fn set_failing(&self, failing: bool) {
        *self.fail_queries.write().await = failing;
    }

    async fn check_failing(&self) -> Result<()> {
        if *self.fail_queries.read().await {
            Err(anyhow!("mock graph store failure"))
        } else {
            Ok(())
        }
    }

    fn matches_filter(
        injury: &InjuryNode,
        player_id: Option<&str>,
        filter: &InjuryFilter,
    ) -> bool {
        if let Some(status) = filter.status {
            if injury.status != status {
                return false;
            }
        }
        if let Some(ref severity) = filter.severity {
            if injury.severity != *severity {
                return false;
            }
        }
        if let Some(ref body_part) = filter.body_part {
            if injury.body_part != *body_part {
                return false;
            }
        }
        if let Some(ref wanted) = filter.player_id {
            if player_id != Some(wanted.as_str()) {
                return false;
            }
        }
        if let Some(from) = filter.from_date {
            if injury.date_of_injury < from {
                return false;
            }
        }
        if let Some(to) = filter.to_date {
            if injury.date_of_injury > to {
                return false;
            }
        }
        true
    }

    /// Players visible to a coach: everyone on a team they manage.
    async fn players_for_coach(&self, coach_id: &str) -> Vec<String> {
        let managed = self
            .coach_teams
            .read()
            .await
            .get(coach_id)
            .cloned()
            .unwrap_or_default();
        self.player_teams
            .read()
            .await
            .iter()
            .filter(|(_, team_id)| managed.contains(team_id))
            .map(|(player_id, _)| player_id.clone())
            .collect()
    }

    /// Scope + filter + sort; shared by count and list.
    async fn scoped_injuries(
        &self,
        scope: &RoleScope,
        filter: &InjuryFilter,
        sort: &InjurySort,
    ) -> Vec<InjuryWithPlayer> {
        let injuries = self.injuries.read().await;
        let sustained = self.sustained.read().await;

        let coach_players = match scope {
            RoleScope::Coach(id) => Some(self.players_for_coach(id).await),
            _ => None,
        };

        let mut rows: Vec<InjuryWithPlayer> = injuries
            .values()
            .filter_map(|injury| {
                let player_id = sustained
                    .get(&injury.injury_id)
                    .map(|(pid, _)| pid.clone());

                let in_scope = match scope {
                    RoleScope::Admin => true,
                    RoleScope::Player(id) => player_id.as_deref() == Some(id.as_str()),
                    RoleScope::Coach(_) => match (&player_id, &coach_players) {
                        (Some(pid), Some(visible)) => visible.contains(pid),
                        _ => false,
                    },
                };
                if !in_scope {
                    return None;
                }
                if !Self::matches_filter(injury, player_id.as_deref(), filter) {
                    return None;
                }
                Some(InjuryWithPlayer {
                    injury: injury.clone(),
                    player_pseudonym_id: player_id,
                })
            })
            .collect();

        rows.sort_by(|a, b| {
            let ord = match sort.field {
                InjurySortField::DateOfInjury => {
                    a.injury.date_of_injury.cmp(&b.injury.date_of_injury)
                }
                InjurySortField::Severity => a.injury.severity.cmp(&b.injury.severity),
                InjurySortField::Status => {
                    a.injury.status.as_str().cmp(b.injury.status.as_str())
                }
                InjurySortField::CreatedAt => a.injury.created_at.cmp(&b.injury.created_at),
            };
            // Tie-break on injury id for deterministic paging
            let ord = ord.then(a.injury.injury_id.cmp(&b.injury.injury_id));
            if sort.ascending {
                ord
            } else {
                ord.reverse()
            }
        });

        rows
    }

    /// Most recent same-day status for a player.
    async fn today_status(
        &self,
        player_id: &str,
        today: NaiveDate,
    ) -> Option<StatusUpdateNode> {
        self.player_statuses
            .read()
            .await
            .get(player_id)
            .and_then(|updates| {
                updates
                    .iter()
                    .filter(|u| u.date == today)
                    .max_by_key(|u| u.recorded_at)
                    .cloned()
            })
    }

    /// Count of unresolved injuries on a player's SUSTAINED edges.
    async fn open_injury_count(&self, player_id: &str) -> i64 {
        let injuries = self.injuries.read().await;
        self.sustained
            .read()
            .await
            .iter()
            .filter(|(injury_id, (pid, _))| {
                pid == player_id
                    && injuries
                        .get(*injury_id)
                        .map(|i| i.status.is_open())
                        .unwrap_or(false)
            })
            .count() as i64
    }
}

#[async_trait]
impl GraphStore for MockGraphStore {
    // ========================================================================
    // Player / coach nodes
    // ========================================================================

    async fn create_player(&self, player: &PlayerNode) -> Result<()> {
        self.check_failing().await?;
        self.players
            .write()
            .await
            .insert(player.pseudonym_id.clone(), player.clone());
        Ok(())
    }

    async fn create_coach(&self, coach: &CoachNode) -> Result<()> {
        self.check_failing().await?;
        self.coaches
            .write()
            .await
            .insert(coach.pseudonym_id.clone(), coach.clone());
        Ok(())
    }

    async fn get_player(&self, pseudonym_id: &str) -> Result<Option<PlayerNode>> {
        self.check_failing().await?;
        Ok(self.players.read().await.get(pseudonym_id).cloned())
    }

    async fn list_players(&self) -> Result<Vec<PlayerWithTeam>> {
        self.check_failing().await?;
        let player_teams = self.player_teams.read().await;
        let teams = self.teams.read().await;
        let mut rows: Vec<PlayerWithTeam> = self
            .players
            .read()
            .await
            .values()
            .map(|player| {
                let team_name = player_teams
                    .get(&player.pseudonym_id)
                    .and_then(|tid| teams.get(tid))
                    .map(|(t, _)| t.name.clone());
                PlayerWithTeam {
                    player: player.clone(),
                    team_name,
                }
            })
            .collect();
        rows.sort_by(|a, b| {
            (a.team_name.clone(), a.player.pseudonym_id.clone())
                .cmp(&(b.team_name.clone(), b.player.pseudonym_id.clone()))
        });
        Ok(rows)
    }

    async fn get_player_detail(&self, pseudonym_id: &str) -> Result<Option<PlayerDetail>> {
        self.check_failing().await?;
        let player = match self.players.read().await.get(pseudonym_id).cloned() {
            Some(p) => p,
            None => return Ok(None),
        };
        let team_id = self.player_teams.read().await.get(pseudonym_id).cloned();
        let team = match team_id {
            Some(tid) => self.teams.read().await.get(&tid).map(|(t, _)| TeamRef {
                team_id: t.team_id.clone(),
                name: t.name.clone(),
                sport: t.sport.clone(),
            }),
            None => None,
        };
        Ok(Some(PlayerDetail { player, team }))
    }

    async fn get_player_injuries(&self, pseudonym_id: &str) -> Result<Vec<InjuryWithReporter>> {
        self.check_failing().await?;
        let injuries = self.injuries.read().await;
        let mut rows: Vec<InjuryWithReporter> = self
            .sustained
            .read()
            .await
            .iter()
            .filter(|(_, (pid, _))| pid == pseudonym_id)
            .filter_map(|(injury_id, (_, edge))| {
                injuries.get(injury_id).map(|injury| InjuryWithReporter {
                    injury: injury.clone(),
                    reported_by: Some(edge.reported_by.clone()),
                    diagnosed_date: Some(edge.diagnosed_date),
                })
            })
            .collect();
        rows.sort_by(|a, b| b.injury.date_of_injury.cmp(&a.injury.date_of_injury));
        Ok(rows)
    }

    // ========================================================================
    // Injuries
    // ========================================================================

    async fn last_injury_id_with_prefix(&self, prefix: &str) -> Result<Option<String>> {
        self.check_failing().await?;
        Ok(self
            .injuries
            .read()
            .await
            .keys()
            .filter(|id| id.starts_with(prefix))
            .max()
            .cloned())
    }

    async fn create_injury(
        &self,
        player_pseudonym_id: &str,
        injury: &InjuryNode,
        sustained: &SustainedEdge,
    ) -> Result<bool> {
        self.check_failing().await?;
        {
            let mut misses = self.cas_misses.write().await;
            if *misses > 0 {
                *misses -= 1;
                return Ok(false);
            }
        }
        if !self.players.read().await.contains_key(player_pseudonym_id) {
            return Ok(false);
        }
        let mut injuries = self.injuries.write().await;
        if injuries.contains_key(&injury.injury_id) {
            return Ok(false);
        }
        injuries.insert(injury.injury_id.clone(), injury.clone());
        self.sustained.write().await.insert(
            injury.injury_id.clone(),
            (player_pseudonym_id.to_string(), sustained.clone()),
        );
        Ok(true)
    }

    async fn get_injury_detail(&self, injury_id: &str) -> Result<Option<InjuryDetail>> {
        self.check_failing().await?;
        let injury = match self.injuries.read().await.get(injury_id).cloned() {
            Some(i) => i,
            None => return Ok(None),
        };
        let (player_pseudonym_id, sustained) =
            match self.sustained.read().await.get(injury_id).cloned() {
                Some((pid, edge)) => (Some(pid), Some(edge)),
                None => (None, None),
            };
        let mut history = self
            .injury_updates
            .read()
            .await
            .get(injury_id)
            .cloned()
            .unwrap_or_default();
        history.sort_by(|a, b| b.recorded_at.cmp(&a.recorded_at));

        Ok(Some(InjuryDetail {
            injury,
            player_pseudonym_id,
            sustained,
            history,
        }))
    }

    async fn get_injury_status(&self, injury_id: &str) -> Result<Option<InjuryStatus>> {
        self.check_failing().await?;
        Ok(self
            .injuries
            .read()
            .await
            .get(injury_id)
            .map(|i| i.status))
    }

    async fn update_injury(&self, injury_id: &str, changes: &InjuryChanges) -> Result<()> {
        self.check_failing().await?;
        let mut injuries = self.injuries.write().await;
        let injury = injuries
            .get_mut(injury_id)
            .ok_or_else(|| anyhow!("injury not found: {}", injury_id))?;

        if let Some(ref injury_type) = changes.injury_type {
            injury.injury_type = injury_type.clone();
        }
        if let Some(ref body_part) = changes.body_part {
            injury.body_part = body_part.clone();
        }
        if let Some(ref side) = changes.side {
            injury.side = Some(side.clone());
        }
        if let Some(ref severity) = changes.severity {
            injury.severity = severity.clone();
        }
        if let Some(status) = changes.status {
            injury.status = status;
        }
        if let Some(expected_return) = changes.expected_return {
            injury.expected_return = Some(expected_return);
        }
        if let Some(ref description) = changes.description {
            injury.description = Some(description.clone());
        }
        if let Some(ref mechanism) = changes.mechanism {
            injury.mechanism = Some(mechanism.clone());
        }
        injury.updated_at = chrono::Utc::now();
        Ok(())
    }

    async fn append_injury_status_update(
        &self,
        injury_id: &str,
        update: &StatusUpdateNode,
    ) -> Result<()> {
        self.check_failing().await?;
        self.injury_updates
            .write()
            .await
            .entry(injury_id.to_string())
            .or_default()
            .push(update.clone());
        Ok(())
    }

    async fn resolve_injury(&self, injury_id: &str, resolution: &InjuryResolution) -> Result<()> {
        self.check_failing().await?;
        let mut injuries = self.injuries.write().await;
        let injury = injuries
            .get_mut(injury_id)
            .ok_or_else(|| anyhow!("injury not found: {}", injury_id))?;
        injury.status = InjuryStatus::Recovered;
        injury.return_to_play_date = Some(resolution.return_to_play_date);
        injury.resolution_notes = resolution.resolution_notes.clone();
        injury.medical_clearance = Some(resolution.medical_clearance);
        injury.updated_at = chrono::Utc::now();
        Ok(())
    }

    async fn count_injuries(&self, scope: &RoleScope, filter: &InjuryFilter) -> Result<usize> {
        self.check_failing().await?;
        Ok(self
            .scoped_injuries(scope, filter, &InjurySort::default())
            .await
            .len())
    }

    async fn list_injuries(
        &self,
        scope: &RoleScope,
        filter: &InjuryFilter,
        sort: &InjurySort,
        skip: usize,
        limit: usize,
    ) -> Result<Vec<InjuryWithPlayer>> {
        self.check_failing().await?;
        Ok(self
            .scoped_injuries(scope, filter, sort)
            .await
            .into_iter()
            .skip(skip)
            .take(limit)
            .collect())
    }

    // ========================================================================
    // Daily status
    // ========================================================================

    async fn create_status_update(
        &self,
        player_pseudonym_id: &str,
        update: &StatusUpdateNode,
    ) -> Result<()> {
        self.check_failing().await?;
        self.player_statuses
            .write()
            .await
            .entry(player_pseudonym_id.to_string())
            .or_default()
            .push(update.clone());
        Ok(())
    }

    async fn latest_team_statuses(
        &self,
        coach_pseudonym_id: &str,
        today: NaiveDate,
    ) -> Result<Vec<TeamStatusRow>> {
        self.check_failing().await?;
        let managed = self
            .coach_teams
            .read()
            .await
            .get(coach_pseudonym_id)
            .cloned()
            .unwrap_or_default();

        let teams = self.teams.read().await;
        let players = self.players.read().await;
        let player_teams = self.player_teams.read().await;

        let mut rows = Vec::new();
        for team_id in &managed {
            let (team, _) = match teams.get(team_id) {
                Some(entry) => entry,
                None => continue,
            };
            let mut member_ids: Vec<&String> = player_teams
                .iter()
                .filter(|(_, tid)| *tid == team_id)
                .map(|(pid, _)| pid)
                .collect();
            member_ids.sort();

            for player_id in member_ids {
                let player = match players.get(player_id) {
                    Some(p) => p.clone(),
                    None => continue,
                };
                let today_update = self.today_status(player_id, today).await;
                rows.push(TeamStatusRow {
                    team: team.clone(),
                    player,
                    today_status: today_update.as_ref().map(|u| u.status),
                    today_note: today_update.and_then(|u| u.note),
                    open_injuries: self.open_injury_count(player_id).await,
                });
            }
        }
        rows.sort_by(|a, b| {
            (a.team.name.clone(), a.player.pseudonym_id.clone())
                .cmp(&(b.team.name.clone(), b.player.pseudonym_id.clone()))
        });
        Ok(rows)
    }

    async fn status_history(&self, player_pseudonym_id: &str) -> Result<Vec<StatusUpdateNode>> {
        self.check_failing().await?;
        let mut history = self
            .player_statuses
            .read()
            .await
            .get(player_pseudonym_id)
            .cloned()
            .unwrap_or_default();
        history.sort_by(|a, b| b.recorded_at.cmp(&a.recorded_at));
        Ok(history)
    }

    // ========================================================================
    // Teams
    // ========================================================================

    async fn create_team(&self, team: &TeamNode, organization: &str) -> Result<()> {
        self.check_failing().await?;
        self.teams
            .write()
            .await
            .insert(team.team_id.clone(), (team.clone(), organization.to_string()));
        Ok(())
    }

    async fn link_player_to_team(&self, player_pseudonym_id: &str, team_id: &str) -> Result<()> {
        self.check_failing().await?;
        self.player_teams
            .write()
            .await
            .insert(player_pseudonym_id.to_string(), team_id.to_string());
        Ok(())
    }

    async fn link_coach_to_team(&self, coach_pseudonym_id: &str, team_id: &str) -> Result<()> {
        self.check_failing().await?;
        self.coach_teams
            .write()
            .await
            .entry(coach_pseudonym_id.to_string())
            .or_default()
            .push(team_id.to_string());
        Ok(())
    }

    async fn team_roster(
        &self,
        team_id: &str,
        today: NaiveDate,
    ) -> Result<Option<(TeamNode, Vec<RosterRow>)>> {
        self.check_failing().await?;
        let team = match self.teams.read().await.get(team_id) {
            Some((team, _)) => team.clone(),
            None => return Ok(None),
        };

        let member_ids: Vec<String> = {
            let player_teams = self.player_teams.read().await;
            let mut ids: Vec<String> = player_teams
                .iter()
                .filter(|(_, tid)| tid.as_str() == team_id)
                .map(|(pid, _)| pid.clone())
                .collect();
            ids.sort();
            ids
        };

        let players = self.players.read().await;
        let mut rows = Vec::new();
        for player_id in &member_ids {
            let player = match players.get(player_id) {
                Some(p) => p.clone(),
                None => continue,
            };
            let today_update = self.today_status(player_id, today).await;
            rows.push(RosterRow {
                player,
                today_status: today_update.as_ref().map(|u| u.status),
                today_note: today_update.and_then(|u| u.note),
                open_injuries: self.open_injury_count(player_id).await,
            });
        }

        Ok(Some((team, rows)))
    }

    async fn get_team_detail(&self, team_id: &str) -> Result<Option<TeamDetail>> {
        self.check_failing().await?;
        let (team, organization) = match self.teams.read().await.get(team_id) {
            Some(entry) => entry.clone(),
            None => return Ok(None),
        };

        let coach_teams = self.coach_teams.read().await;
        let coaches_map = self.coaches.read().await;
        let mut coaches: Vec<CoachNode> = coach_teams
            .iter()
            .filter(|(_, tids)| tids.iter().any(|t| t == team_id))
            .filter_map(|(cid, _)| coaches_map.get(cid).cloned())
            .collect();
        coaches.sort_by(|a, b| a.pseudonym_id.cmp(&b.pseudonym_id));

        let player_count = self
            .player_teams
            .read()
            .await
            .values()
            .filter(|tid| tid.as_str() == team_id)
            .count() as i64;

        Ok(Some(TeamDetail {
            team,
            organization,
            coaches,
            player_count,
        }))
    }

    async fn coach_manages_team(&self, coach_pseudonym_id: &str, team_id: &str) -> Result<bool> {
        self.check_failing().await?;
        Ok(self
            .coach_teams
            .read()
            .await
            .get(coach_pseudonym_id)
            .map(|tids| tids.iter().any(|t| t == team_id))
            .unwrap_or(false))
    }

    async fn teams_for_coach(&self, coach_pseudonym_id: &str) -> Result<Vec<TeamNode>> {
        self.check_failing().await?;
        let teams = self.teams.read().await;
        let mut result: Vec<TeamNode> = self
            .coach_teams
            .read()
            .await
            .get(coach_pseudonym_id)
            .cloned()
            .unwrap_or_default()
            .iter()
            .filter_map(|tid| teams.get(tid).map(|(t, _)| t.clone()))
            .collect();
        result.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(result)
    }

    // ========================================================================
    // Health
    // ========================================================================

    async fn health_check(&self) -> Result<bool> {
        Ok(!*self.fail_queries.read().await)
    }
}

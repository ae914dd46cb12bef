//! GraphStore trait definition
//!
//! Defines the abstract interface for all Neo4j graph operations.
//! This trait mirrors the public async methods of `Neo4jClient`, enabling
//! testing with mock implementations and future backend swaps.

use crate::graph::models::*;
use anyhow::Result;
use async_trait::async_trait;
use chrono::NaiveDate;

/// Abstract interface for all graph database operations.
#[async_trait]
pub trait GraphStore: Send + Sync {
    // ========================================================================
    // Player / coach nodes
    // ========================================================================

    /// Create a player node (registration)
    async fn create_player(&self, player: &PlayerNode) -> Result<()>;

    /// Create a coach node (registration)
    async fn create_coach(&self, coach: &CoachNode) -> Result<()>;

    /// Get a player by pseudonym id
    async fn get_player(&self, pseudonym_id: &str) -> Result<Option<PlayerNode>>;

    /// List all players with their team names, sorted by team then player
    async fn list_players(&self) -> Result<Vec<PlayerWithTeam>>;

    /// Get a single player with team id/name/sport
    async fn get_player_detail(&self, pseudonym_id: &str) -> Result<Option<PlayerDetail>>;

    /// All injuries on a player's SUSTAINED edges, with reporter metadata,
    /// newest first
    async fn get_player_injuries(&self, pseudonym_id: &str) -> Result<Vec<InjuryWithReporter>>;

    // ========================================================================
    // Injuries
    // ========================================================================

    /// Lexicographically-last injury id starting with `prefix`
    /// (e.g. "INJ-2026-"), used to derive the next per-year sequence number
    async fn last_injury_id_with_prefix(&self, prefix: &str) -> Result<Option<String>>;

    /// Create an injury plus its SUSTAINED edge in one statement.
    ///
    /// Compare-and-swap semantics: the write succeeds only if no Injury with
    /// the same id exists yet. Returns false when the id was already taken
    /// (caller re-derives the sequence and retries).
    async fn create_injury(
        &self,
        player_pseudonym_id: &str,
        injury: &InjuryNode,
        sustained: &SustainedEdge,
    ) -> Result<bool>;

    /// Injury plus optional reporting player and status-update history
    /// (newest first)
    async fn get_injury_detail(&self, injury_id: &str) -> Result<Option<InjuryDetail>>;

    /// Current status only (cheap read for the resolve check)
    async fn get_injury_status(&self, injury_id: &str) -> Result<Option<InjuryStatus>>;

    /// Partial update: only fields present in `changes` are SET
    async fn update_injury(&self, injury_id: &str, changes: &InjuryChanges) -> Result<()>;

    /// Append a StatusUpdate node linked to the injury via HAS_STATUS_UPDATE
    async fn append_injury_status_update(
        &self,
        injury_id: &str,
        update: &StatusUpdateNode,
    ) -> Result<()>;

    /// Set status to Recovered with return-to-play date, notes, and clearance
    async fn resolve_injury(&self, injury_id: &str, resolution: &InjuryResolution) -> Result<()>;

    /// Count injuries matching scope + filter (same pattern as `list_injuries`)
    async fn count_injuries(&self, scope: &RoleScope, filter: &InjuryFilter) -> Result<usize>;

    /// Paged injury listing. `skip`/`limit` are applied after scope, filters,
    /// and sort.
    async fn list_injuries(
        &self,
        scope: &RoleScope,
        filter: &InjuryFilter,
        sort: &InjurySort,
        skip: usize,
        limit: usize,
    ) -> Result<Vec<InjuryWithPlayer>>;

    // ========================================================================
    // Daily status
    // ========================================================================

    /// Create a StatusUpdate node linked to the player via HAS_STATUS
    async fn create_status_update(
        &self,
        player_pseudonym_id: &str,
        update: &StatusUpdateNode,
    ) -> Result<()>;

    /// One row per player on each team the coach MANAGES, left-joined with
    /// the most recent StatusUpdate dated `today` and the open-injury count
    async fn latest_team_statuses(
        &self,
        coach_pseudonym_id: &str,
        today: NaiveDate,
    ) -> Result<Vec<TeamStatusRow>>;

    /// All StatusUpdates for a player, newest first, unpaginated
    async fn status_history(&self, player_pseudonym_id: &str) -> Result<Vec<StatusUpdateNode>>;

    // ========================================================================
    // Teams
    // ========================================================================

    /// Create a team node plus its Organization and Sport edges
    /// (seeding / admin tooling)
    async fn create_team(&self, team: &TeamNode, organization: &str) -> Result<()>;

    /// Create a PLAYS_FOR edge
    async fn link_player_to_team(&self, player_pseudonym_id: &str, team_id: &str) -> Result<()>;

    /// Create a MANAGES edge
    async fn link_coach_to_team(&self, coach_pseudonym_id: &str, team_id: &str) -> Result<()>;

    /// Team plus its roster rows (today's status + open-injury count per
    /// player). None if the team does not exist.
    async fn team_roster(
        &self,
        team_id: &str,
        today: NaiveDate,
    ) -> Result<Option<(TeamNode, Vec<RosterRow>)>>;

    /// Team with organization, coaches, and player count
    async fn get_team_detail(&self, team_id: &str) -> Result<Option<TeamDetail>>;

    /// Whether a MANAGES edge exists between the coach and the team
    async fn coach_manages_team(&self, coach_pseudonym_id: &str, team_id: &str) -> Result<bool>;

    /// Teams managed by a coach, sorted by name
    async fn teams_for_coach(&self, coach_pseudonym_id: &str) -> Result<Vec<TeamNode>>;

    // ========================================================================
    // Health
    // ========================================================================

    /// Connectivity probe
    async fn health_check(&self) -> Result<bool>;
}

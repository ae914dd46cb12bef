//! Graph node types and domain enums.
//!
//! All graph entities carry pseudonymous identifiers; real names live in the
//! Postgres identity store and are only joined in at the service layer.
//!
//! Canonical property names used in every query: `team_id` for teams,
//! `pseudonym_id` for players and coaches, `injury_id` for injuries.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

// ============================================================================
// Enums
// ============================================================================

/// Lifecycle status of an injury
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum InjuryStatus {
    Active,
    Recovering,
    Recovered,
    Chronic,
    #[serde(rename = "Re-injured")]
    Reinjured,
}

impl InjuryStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            InjuryStatus::Active => "Active",
            InjuryStatus::Recovering => "Recovering",
            InjuryStatus::Recovered => "Recovered",
            InjuryStatus::Chronic => "Chronic",
            InjuryStatus::Reinjured => "Re-injured",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "Active" => Some(InjuryStatus::Active),
            "Recovering" => Some(InjuryStatus::Recovering),
            "Recovered" => Some(InjuryStatus::Recovered),
            "Chronic" => Some(InjuryStatus::Chronic),
            "Re-injured" => Some(InjuryStatus::Reinjured),
            _ => None,
        }
    }

    /// Statuses that count as "unresolved" for roster / dashboard counts
    pub fn is_open(&self) -> bool {
        !matches!(self, InjuryStatus::Recovered)
    }
}

/// Daily traffic-light readiness status reported by (or for) a player
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum DailyStatus {
    #[serde(rename = "GREEN")]
    Green,
    #[serde(rename = "ORANGE")]
    Orange,
    #[serde(rename = "RED")]
    Red,
}

impl DailyStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            DailyStatus::Green => "GREEN",
            DailyStatus::Orange => "ORANGE",
            DailyStatus::Red => "RED",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "GREEN" => Some(DailyStatus::Green),
            "ORANGE" => Some(DailyStatus::Orange),
            "RED" => Some(DailyStatus::Red),
            _ => None,
        }
    }
}

// ============================================================================
// Nodes
// ============================================================================

/// Team node
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TeamNode {
    pub team_id: String,
    pub name: String,
    pub sport: String,
    pub age_group: String,
    pub gender: String,
    pub season_start: NaiveDate,
    pub season_end: NaiveDate,
}

/// Player node — pseudonym_id is the foreign key into the identity store
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlayerNode {
    pub pseudonym_id: String,
    pub position: Option<String>,
    pub jersey_number: Option<i64>,
    pub active: bool,
}

/// Coach node
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CoachNode {
    pub pseudonym_id: String,
    pub specialization: Option<String>,
}

/// Injury node. Never deleted; resolved injuries keep their history.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InjuryNode {
    /// Format: INJ-<year>-<seq>, sequence monotonic per year
    pub injury_id: String,
    pub injury_type: String,
    pub body_part: String,
    pub side: Option<String>,
    pub severity: String,
    pub status: InjuryStatus,
    pub date_of_injury: NaiveDate,
    pub expected_return: Option<NaiveDate>,
    pub description: Option<String>,
    pub mechanism: Option<String>,
    pub return_to_play_date: Option<NaiveDate>,
    pub resolution_notes: Option<String>,
    pub medical_clearance: Option<bool>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// StatusUpdate node — immutable once created.
///
/// Linked to a Player via HAS_STATUS (daily report) and/or to an Injury via
/// HAS_STATUS_UPDATE (injury-specific history).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StatusUpdateNode {
    pub update_id: String,
    pub status: DailyStatus,
    pub note: Option<String>,
    pub date: NaiveDate,
    pub recorded_at: DateTime<Utc>,
}

/// Properties carried by a SUSTAINED edge
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SustainedEdge {
    pub diagnosed_date: NaiveDate,
    /// Pseudonym id of the reporter (coach or admin)
    pub reported_by: String,
}

// ============================================================================
// Composite read rows
// ============================================================================

/// Injury list row: injury plus the pseudonym id of the player who sustained it
#[derive(Debug, Clone)]
pub struct InjuryWithPlayer {
    pub injury: InjuryNode,
    pub player_pseudonym_id: Option<String>,
}

/// Full injury view: player, SUSTAINED edge metadata, status-update history
/// (newest first)
#[derive(Debug, Clone)]
pub struct InjuryDetail {
    pub injury: InjuryNode,
    pub player_pseudonym_id: Option<String>,
    pub sustained: Option<SustainedEdge>,
    pub history: Vec<StatusUpdateNode>,
}

/// Player list row with the name of the team they play for
#[derive(Debug, Clone)]
pub struct PlayerWithTeam {
    pub player: PlayerNode,
    pub team_name: Option<String>,
}

/// Minimal team reference attached to a player detail view
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TeamRef {
    pub team_id: String,
    pub name: String,
    pub sport: String,
}

/// Single player with their team
#[derive(Debug, Clone)]
pub struct PlayerDetail {
    pub player: PlayerNode,
    pub team: Option<TeamRef>,
}

/// Injury with SUSTAINED edge metadata, for per-player injury listings
#[derive(Debug, Clone)]
pub struct InjuryWithReporter {
    pub injury: InjuryNode,
    pub reported_by: Option<String>,
    pub diagnosed_date: Option<NaiveDate>,
}

/// Roster row: player joined with today's status and open-injury count
#[derive(Debug, Clone)]
pub struct RosterRow {
    pub player: PlayerNode,
    pub today_status: Option<DailyStatus>,
    pub today_note: Option<String>,
    pub open_injuries: i64,
}

/// Flat row for the coach dashboard: one player on one managed team.
/// Grouping and tallying happen in the status service, not in the query.
#[derive(Debug, Clone)]
pub struct TeamStatusRow {
    pub team: TeamNode,
    pub player: PlayerNode,
    pub today_status: Option<DailyStatus>,
    pub today_note: Option<String>,
    pub open_injuries: i64,
}

/// Team detail view: organization, coaches, player count
#[derive(Debug, Clone)]
pub struct TeamDetail {
    pub team: TeamNode,
    pub organization: String,
    pub coaches: Vec<CoachNode>,
    pub player_count: i64,
}

// ============================================================================
// Query inputs
// ============================================================================

/// Role-based row scope for injury listings. Applied before any other filter
/// and not bypassable by query parameters.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RoleScope {
    /// All injuries
    Admin,
    /// Injuries of players on teams this coach MANAGES
    Coach(String),
    /// Only injuries on this player's own SUSTAINED edges
    Player(String),
}

/// Filters for injury listings. All optional; combined with AND.
#[derive(Debug, Clone, Default)]
pub struct InjuryFilter {
    pub status: Option<InjuryStatus>,
    pub severity: Option<String>,
    pub body_part: Option<String>,
    /// Restricted to coach/admin by the service layer
    pub player_id: Option<String>,
    pub from_date: Option<NaiveDate>,
    pub to_date: Option<NaiveDate>,
}

/// Allow-listed sort fields for injury listings
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InjurySortField {
    DateOfInjury,
    Severity,
    Status,
    CreatedAt,
}

impl InjurySortField {
    /// Graph property name for the sort field
    pub fn property(&self) -> &'static str {
        match self {
            InjurySortField::DateOfInjury => "date_of_injury",
            InjurySortField::Severity => "severity",
            InjurySortField::Status => "status",
            InjurySortField::CreatedAt => "created_at",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "dateOfInjury" | "date_of_injury" => Some(InjurySortField::DateOfInjury),
            "severity" => Some(InjurySortField::Severity),
            "status" => Some(InjurySortField::Status),
            "createdAt" | "created_at" => Some(InjurySortField::CreatedAt),
            _ => None,
        }
    }
}

/// Sort order for injury listings
#[derive(Debug, Clone, Copy)]
pub struct InjurySort {
    pub field: InjurySortField,
    pub ascending: bool,
}

impl Default for InjurySort {
    fn default() -> Self {
        Self {
            field: InjurySortField::DateOfInjury,
            ascending: false,
        }
    }
}

/// Partial-update field set for an injury. Only present fields are written;
/// absent fields are left untouched, never nulled.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InjuryChanges {
    pub injury_type: Option<String>,
    pub body_part: Option<String>,
    pub side: Option<String>,
    pub severity: Option<String>,
    pub status: Option<InjuryStatus>,
    pub expected_return: Option<NaiveDate>,
    pub description: Option<String>,
    pub mechanism: Option<String>,
    /// Free-text note attached to the StatusUpdate appended when `status` changes
    pub status_note: Option<String>,
}

impl InjuryChanges {
    /// True when no field is present (nothing to write)
    pub fn is_empty(&self) -> bool {
        self.injury_type.is_none()
            && self.body_part.is_none()
            && self.side.is_none()
            && self.severity.is_none()
            && self.status.is_none()
            && self.expected_return.is_none()
            && self.description.is_none()
            && self.mechanism.is_none()
    }
}

/// Terminal resolution data for an injury
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InjuryResolution {
    pub return_to_play_date: NaiveDate,
    pub resolution_notes: Option<String>,
    pub medical_clearance: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_injury_status_roundtrip() {
        for s in [
            InjuryStatus::Active,
            InjuryStatus::Recovering,
            InjuryStatus::Recovered,
            InjuryStatus::Chronic,
            InjuryStatus::Reinjured,
        ] {
            assert_eq!(InjuryStatus::parse(s.as_str()), Some(s));
        }
        assert_eq!(InjuryStatus::parse("Healed"), None);
    }

    #[test]
    fn test_reinjured_serde_rename() {
        let json = serde_json::to_string(&InjuryStatus::Reinjured).unwrap();
        assert_eq!(json, "\"Re-injured\"");
        let back: InjuryStatus = serde_json::from_str("\"Re-injured\"").unwrap();
        assert_eq!(back, InjuryStatus::Reinjured);
    }

    #[test]
    fn test_open_statuses() {
        assert!(InjuryStatus::Active.is_open());
        assert!(InjuryStatus::Chronic.is_open());
        assert!(!InjuryStatus::Recovered.is_open());
    }

    #[test]
    fn test_daily_status_parse() {
        assert_eq!(DailyStatus::parse("GREEN"), Some(DailyStatus::Green));
        assert_eq!(DailyStatus::parse("green"), None);
        assert_eq!(DailyStatus::Red.as_str(), "RED");
    }

    #[test]
    fn test_sort_field_allow_list() {
        assert_eq!(
            InjurySortField::parse("dateOfInjury"),
            Some(InjurySortField::DateOfInjury)
        );
        assert_eq!(
            InjurySortField::parse("created_at"),
            Some(InjurySortField::CreatedAt)
        );
        // Anything outside the allow-list is rejected, not passed through
        assert_eq!(InjurySortField::parse("injury_id; DROP"), None);
        assert_eq!(InjurySortField::parse(""), None);
    }

    #[test]
    fn test_injury_changes_empty() {
        assert!(InjuryChanges::default().is_empty());
        let changes = InjuryChanges {
            severity: Some("Moderate".to_string()),
            ..Default::default()
        };
        assert!(!changes.is_empty());
    }

    #[test]
    fn test_injury_changes_partial_deserialization() {
        let json = r#"{"severity":"Severe","statusNote":"swelling down"}"#;
        let changes: InjuryChanges = serde_json::from_str(json).unwrap();
        assert_eq!(changes.severity, Some("Severe".to_string()));
        assert_eq!(changes.status_note, Some("swelling down".to_string()));
        assert!(changes.injury_type.is_none());
        assert!(changes.status.is_none());
    }
}

//! Injury reporting, updates, resolution, and the role-scoped listing.

use crate::auth::policy;
use crate::graph::models::{
    DailyStatus, InjuryChanges, InjuryDetail, InjuryFilter, InjuryNode, InjuryResolution,
    InjurySort, InjuryStatus, RoleScope, StatusUpdateNode, SustainedEdge,
};
use crate::graph::GraphStore;
use crate::identity::models::Role;
use crate::services::error::{ServiceError, ServiceResult};
use crate::services::{NameResolver, Pagination};
use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use uuid::Uuid;

/// Retries for the compare-and-swap id allocation. Each retry re-derives the
/// sequence number from the store before trying again.
const ID_ALLOCATION_ATTEMPTS: usize = 3;

pub struct InjuryService {
    graph: Arc<dyn GraphStore>,
    names: NameResolver,
}

// ============================================================================
// DTOs
// ============================================================================

/// New injury report
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateInjuryInput {
    pub player_id: String,
    pub injury_type: String,
    pub body_part: String,
    pub side: Option<String>,
    pub severity: String,
    pub date_of_injury: NaiveDate,
    pub expected_return: Option<NaiveDate>,
    pub description: Option<String>,
    pub mechanism: Option<String>,
    /// Defaults to date_of_injury when absent
    pub diagnosed_date: Option<NaiveDate>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct InjuryDto {
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
    pub player_id: Option<String>,
    pub player_name: Option<String>,
}

impl InjuryDto {
    fn from_node(injury: InjuryNode, player_id: Option<String>, player_name: Option<String>) -> Self {
        Self {
            injury_id: injury.injury_id,
            injury_type: injury.injury_type,
            body_part: injury.body_part,
            side: injury.side,
            severity: injury.severity,
            status: injury.status,
            date_of_injury: injury.date_of_injury,
            expected_return: injury.expected_return,
            description: injury.description,
            mechanism: injury.mechanism,
            return_to_play_date: injury.return_to_play_date,
            resolution_notes: injury.resolution_notes,
            medical_clearance: injury.medical_clearance,
            created_at: injury.created_at,
            updated_at: injury.updated_at,
            player_id,
            player_name,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StatusUpdateDto {
    pub update_id: String,
    pub status: DailyStatus,
    pub note: Option<String>,
    pub date: NaiveDate,
    pub recorded_at: DateTime<Utc>,
}

impl From<StatusUpdateNode> for StatusUpdateDto {
    fn from(node: StatusUpdateNode) -> Self {
        Self {
            update_id: node.update_id,
            status: node.status,
            note: node.note,
            date: node.date,
            recorded_at: node.recorded_at,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct InjuryDetailDto {
    #[serde(flatten)]
    pub injury: InjuryDto,
    pub diagnosed_date: Option<NaiveDate>,
    pub reported_by: Option<String>,
    pub reported_by_name: Option<String>,
    pub history: Vec<StatusUpdateDto>,
}

#[derive(Debug, Clone, Serialize)]
pub struct InjuryListResponse {
    pub data: Vec<InjuryDto>,
    pub pagination: Pagination,
}

/// Traffic-light rendering of an injury status, used for the StatusUpdate
/// nodes appended to the injury history.
fn traffic_light(status: InjuryStatus) -> DailyStatus {
    match status {
        InjuryStatus::Recovered => DailyStatus::Green,
        InjuryStatus::Recovering => DailyStatus::Orange,
        InjuryStatus::Active | InjuryStatus::Chronic | InjuryStatus::Reinjured => DailyStatus::Red,
    }
}

impl InjuryService {
    pub fn new(graph: Arc<dyn GraphStore>, names: NameResolver) -> Self {
        Self { graph, names }
    }

    // ========================================================================
    // Create
    // ========================================================================

    /// Report a new injury. Caller identity (reporter) goes onto the
    /// SUSTAINED edge.
    pub async fn create(
        &self,
        reporter_pseudonym_id: &str,
        input: CreateInjuryInput,
    ) -> ServiceResult<InjuryDetailDto> {
        self.graph
            .get_player(&input.player_id)
            .await?
            .ok_or_else(|| ServiceError::NotFound("Player not found".to_string()))?;

        let prefix = format!("INJ-{}-", input.date_of_injury.format("%Y"));
        let sustained = SustainedEdge {
            diagnosed_date: input.diagnosed_date.unwrap_or(input.date_of_injury),
            reported_by: reporter_pseudonym_id.to_string(),
        };

        let mut injury_id = None;
        for attempt in 0..ID_ALLOCATION_ATTEMPTS {
            let candidate = self.next_injury_id(&prefix).await?;
            let now = Utc::now();
            let node = InjuryNode {
                injury_id: candidate.clone(),
                injury_type: input.injury_type.clone(),
                body_part: input.body_part.clone(),
                side: input.side.clone(),
                severity: input.severity.clone(),
                status: InjuryStatus::Active,
                date_of_injury: input.date_of_injury,
                expected_return: input.expected_return,
                description: input.description.clone(),
                mechanism: input.mechanism.clone(),
                return_to_play_date: None,
                resolution_notes: None,
                medical_clearance: None,
                created_at: now,
                updated_at: now,
            };

            if self
                .graph
                .create_injury(&input.player_id, &node, &sustained)
                .await?
            {
                injury_id = Some(candidate);
                break;
            }
            tracing::debug!(candidate = %candidate, attempt, "Injury id taken, re-deriving sequence");
        }

        let injury_id = injury_id.ok_or_else(|| {
            ServiceError::Conflict("Could not allocate an injury id, please retry".to_string())
        })?;

        tracing::info!(injury_id = %injury_id, player_id = %input.player_id, "Injury reported");
        self.compose_detail(&injury_id).await
    }

    /// Next id for the year prefix: trailing 3-digit counter of the
    /// lexicographically-last existing id, plus one.
    async fn next_injury_id(&self, prefix: &str) -> ServiceResult<String> {
        let last = self.graph.last_injury_id_with_prefix(prefix).await?;
        let seq = last
            .as_deref()
            .and_then(|id| id.rsplit('-').next())
            .and_then(|tail| tail.parse::<u32>().ok())
            .map(|n| n + 1)
            .unwrap_or(1);
        Ok(format!("{}{:03}", prefix, seq))
    }

    // ========================================================================
    // Read
    // ========================================================================

    /// Fetch one injury with history, enforcing the player-ownership rule.
    pub async fn find_one(
        &self,
        role: Role,
        own_pseudonym_id: &str,
        injury_id: &str,
    ) -> ServiceResult<InjuryDetailDto> {
        let detail = self
            .graph
            .get_injury_detail(injury_id)
            .await?
            .ok_or_else(|| ServiceError::NotFound("Injury not found".to_string()))?;

        let owner = detail.player_pseudonym_id.as_deref().unwrap_or("");
        if !policy::can_view_injury(role, own_pseudonym_id, owner) {
            return Err(ServiceError::Forbidden("Access denied".to_string()));
        }

        Ok(self.detail_to_dto(detail).await)
    }

    /// Role-scoped, filtered, sorted, paginated listing.
    pub async fn find_all(
        &self,
        role: Role,
        own_pseudonym_id: &str,
        filter: InjuryFilter,
        sort: InjurySort,
        page: usize,
        limit: usize,
    ) -> ServiceResult<InjuryListResponse> {
        if filter.player_id.is_some() && !policy::can_filter_by_player(role) {
            return Err(ServiceError::Forbidden(
                "Player filter is restricted to staff".to_string(),
            ));
        }

        let scope = match role {
            Role::Admin => RoleScope::Admin,
            Role::Coach => RoleScope::Coach(own_pseudonym_id.to_string()),
            Role::Player => RoleScope::Player(own_pseudonym_id.to_string()),
        };

        // Pages are 1-based; callers below the HTTP clamp get page 1
        let page = page.max(1);

        // Count and page are separate queries over the same pattern; the
        // total may be stale relative to the page under concurrent writes.
        let total = self.graph.count_injuries(&scope, &filter).await?;
        let skip = (page - 1) * limit;
        let rows = self
            .graph
            .list_injuries(&scope, &filter, &sort, skip, limit)
            .await?;

        let player_ids: Vec<String> = rows
            .iter()
            .filter_map(|r| r.player_pseudonym_id.clone())
            .collect();
        let names = self.names.resolve(&player_ids).await;

        let data = rows
            .into_iter()
            .map(|row| {
                let player_name = row
                    .player_pseudonym_id
                    .as_deref()
                    .map(|id| NameResolver::display(&names, id, "Unknown Player"));
                InjuryDto::from_node(row.injury, row.player_pseudonym_id, player_name)
            })
            .collect();

        Ok(InjuryListResponse {
            data,
            pagination: Pagination::new(total, page, limit),
        })
    }

    // ========================================================================
    // Update / resolve
    // ========================================================================

    /// Partial update. When `status` is among the changes, a StatusUpdate is
    /// appended to the injury history. Returns the re-fetched injury.
    pub async fn update(
        &self,
        injury_id: &str,
        changes: InjuryChanges,
    ) -> ServiceResult<InjuryDetailDto> {
        if changes.is_empty() {
            return Err(ServiceError::BadRequest("No fields to update".to_string()));
        }

        self.graph
            .get_injury_status(injury_id)
            .await?
            .ok_or_else(|| ServiceError::NotFound("Injury not found".to_string()))?;

        self.graph.update_injury(injury_id, &changes).await?;

        if let Some(new_status) = changes.status {
            let note = changes
                .status_note
                .clone()
                .or_else(|| Some(format!("Status changed to {}", new_status.as_str())));
            self.append_history(injury_id, traffic_light(new_status), note)
                .await?;
        }

        self.compose_detail(injury_id).await
    }

    /// Two-phase resolution: status check, then the terminal write plus a
    /// closing history entry. Double-resolve is a conflict.
    pub async fn resolve(
        &self,
        injury_id: &str,
        resolution: InjuryResolution,
    ) -> ServiceResult<InjuryDetailDto> {
        let status = self
            .graph
            .get_injury_status(injury_id)
            .await?
            .ok_or_else(|| ServiceError::NotFound("Injury not found".to_string()))?;
        if status == InjuryStatus::Recovered {
            return Err(ServiceError::Conflict(
                "Injury is already resolved".to_string(),
            ));
        }

        self.graph.resolve_injury(injury_id, &resolution).await?;

        let note = resolution
            .resolution_notes
            .clone()
            .or_else(|| Some("Resolved".to_string()));
        self.append_history(injury_id, DailyStatus::Green, note)
            .await?;

        tracing::info!(injury_id, "Injury resolved");
        self.compose_detail(injury_id).await
    }

    async fn append_history(
        &self,
        injury_id: &str,
        status: DailyStatus,
        note: Option<String>,
    ) -> ServiceResult<()> {
        let now = Utc::now();
        let update = StatusUpdateNode {
            update_id: format!("SU-{}", Uuid::new_v4()),
            status,
            note,
            date: now.date_naive(),
            recorded_at: now,
        };
        self.graph
            .append_injury_status_update(injury_id, &update)
            .await?;
        Ok(())
    }

    // ========================================================================
    // Composition
    // ========================================================================

    /// Unscoped detail fetch used after writes (callers already passed a
    /// staff-role gate).
    async fn compose_detail(&self, injury_id: &str) -> ServiceResult<InjuryDetailDto> {
        let detail = self
            .graph
            .get_injury_detail(injury_id)
            .await?
            .ok_or_else(|| ServiceError::NotFound("Injury not found".to_string()))?;
        Ok(self.detail_to_dto(detail).await)
    }

    async fn detail_to_dto(&self, detail: InjuryDetail) -> InjuryDetailDto {
        let mut ids = Vec::new();
        if let Some(ref id) = detail.player_pseudonym_id {
            ids.push(id.clone());
        }
        if let Some(ref edge) = detail.sustained {
            ids.push(edge.reported_by.clone());
        }
        let names = self.names.resolve(&ids).await;

        let player_name = detail
            .player_pseudonym_id
            .as_deref()
            .map(|id| NameResolver::display(&names, id, "Unknown Player"));
        let reported_by = detail.sustained.as_ref().map(|e| e.reported_by.clone());
        let reported_by_name = reported_by
            .as_deref()
            .map(|id| NameResolver::display(&names, id, "Unknown"));

        InjuryDetailDto {
            injury: InjuryDto::from_node(detail.injury, detail.player_pseudonym_id, player_name),
            diagnosed_date: detail.sustained.map(|e| e.diagnosed_date),
            reported_by,
            reported_by_name,
            history: detail.history.into_iter().map(Into::into).collect(),
        }
    }
}

// ============================================================================
// Tests
// ============================================================================

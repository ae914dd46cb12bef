//! Query-parameter parsing for the injury listing.

use crate::graph::models::{InjuryFilter, InjurySort, InjurySortField, InjuryStatus};
use chrono::NaiveDate;
use serde::Deserialize;

const DEFAULT_LIMIT: usize = 20;
const MAX_LIMIT: usize = 100;

/// GET /injuries query string. Everything is optional; invalid enum values
/// are rejected rather than ignored.
#[derive(Debug, Default, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InjuryListQuery {
    pub status: Option<String>,
    pub severity: Option<String>,
    pub body_part: Option<String>,
    pub player_id: Option<String>,
    pub from_date: Option<NaiveDate>,
    pub to_date: Option<NaiveDate>,
    pub page: Option<usize>,
    pub limit: Option<usize>,
    pub sort_by: Option<String>,
    pub sort_order: Option<String>,
}

impl InjuryListQuery {
    pub fn page(&self) -> usize {
        self.page.unwrap_or(1).max(1)
    }

    pub fn limit(&self) -> usize {
        self.limit.unwrap_or(DEFAULT_LIMIT).clamp(1, MAX_LIMIT)
    }

    pub fn filter(&self) -> Result<InjuryFilter, String> {
        let status = match self.status.as_deref() {
            Some(s) => Some(
                InjuryStatus::parse(s).ok_or_else(|| format!("Invalid status filter: {}", s))?,
            ),
            None => None,
        };
        Ok(InjuryFilter {
            status,
            severity: self.severity.clone(),
            body_part: self.body_part.clone(),
            player_id: self.player_id.clone(),
            from_date: self.from_date,
            to_date: self.to_date,
        })
    }

    pub fn sort(&self) -> Result<InjurySort, String> {
        let field = match self.sort_by.as_deref() {
            Some(s) => {
                InjurySortField::parse(s).ok_or_else(|| format!("Invalid sort field: {}", s))?
            }
            None => InjurySort::default().field,
        };
        let ascending = match self.sort_order.as_deref() {
            None => InjurySort::default().ascending,
            Some("asc") => true,
            Some("desc") => false,
            Some(other) => return Err(format!("Invalid sort order: {}", other)),
        };
        Ok(InjurySort { field, ascending })
    }
}

//! Batch pseudonym -> display-name resolution.
//!
//! The graph only stores pseudonym ids; every outward-facing DTO passes
//! through here to pick up names. Resolution degrades rather than fails:
//! if the identity store errors, callers get an empty map and DTOs fall
//! back to placeholder names.

use crate::identity::models::NameInfo;
use crate::identity::IdentityStore;
use std::collections::HashMap;
use std::sync::Arc;

#[derive(Clone)]
pub struct NameResolver {
    identity: Arc<dyn IdentityStore>,
}

impl NameResolver {
    pub fn new(identity: Arc<dyn IdentityStore>) -> Self {
        Self { identity }
    }

    /// Resolve a batch of pseudonym ids to names. Deduplicates and drops
    /// empty ids before querying; ids with no identity record are absent
    /// from the result.
    pub async fn resolve(&self, pseudonym_ids: &[String]) -> HashMap<String, NameInfo> {
        let mut unique: Vec<String> = pseudonym_ids
            .iter()
            .filter(|id| !id.is_empty())
            .cloned()
            .collect();
        unique.sort();
        unique.dedup();

        if unique.is_empty() {
            return HashMap::new();
        }

        match self.identity.resolve_names(&unique).await {
            Ok(names) => names,
            Err(e) => {
                tracing::warn!("Name resolution failed, returning pseudonyms only: {}", e);
                HashMap::new()
            }
        }
    }

    /// Display name for an id out of a resolved map, with a fallback label.
    pub fn display(names: &HashMap<String, NameInfo>, id: &str, fallback: &str) -> String {
        names
            .get(id)
            .map(|n| n.display_name())
            .unwrap_or_else(|| fallback.to_string())
    }
}

//! Neo4j client for the relationship graph.
//!
//! All queries are parameterized. Optional string properties use the
//! empty-string sentinel on write and are mapped back to None on read;
//! jersey numbers use -1 for "not assigned".

use super::models::*;
use super::traits::GraphStore;
use anyhow::{Context, Result};
use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, Utc};
use neo4rs::{query, Graph, Query};
use std::sync::Arc;

/// Client for Neo4j operations
pub struct Neo4jClient {
    graph: Arc<Graph>,
}

/// Builder for the scope + filter portion of injury listing queries.
///
/// The role scope decides the MATCH pattern; filters become parameterized
/// WHERE conditions. Both the count and the data query are built from the
/// same instance so they always agree on the row set.
struct InjuryQuery {
    match_clause: String,
    conditions: Vec<String>,
    params: Vec<(&'static str, String)>,
}

impl InjuryQuery {
    fn new(scope: &RoleScope, filter: &InjuryFilter) -> Self {
        let mut params: Vec<(&'static str, String)> = Vec::new();

        let match_clause = match scope {
            RoleScope::Admin => {
                "MATCH (pl:Player)-[:SUSTAINED]->(i:Injury)".to_string()
            }
            RoleScope::Player(id) => {
                params.push(("scope_id", id.clone()));
                "MATCH (pl:Player {pseudonym_id: $scope_id})-[:SUSTAINED]->(i:Injury)".to_string()
            }
            RoleScope::Coach(id) => {
                params.push(("scope_id", id.clone()));
                "MATCH (c:Coach {pseudonym_id: $scope_id})-[:MANAGES]->(:Team)\
                 <-[:PLAYS_FOR]-(pl:Player)-[:SUSTAINED]->(i:Injury)"
                    .to_string()
            }
        };

        let mut conditions = Vec::new();
        if let Some(status) = filter.status {
            conditions.push("i.status = $f_status".to_string());
            params.push(("f_status", status.as_str().to_string()));
        }
        if let Some(ref severity) = filter.severity {
            conditions.push("i.severity = $f_severity".to_string());
            params.push(("f_severity", severity.clone()));
        }
        if let Some(ref body_part) = filter.body_part {
            conditions.push("i.body_part = $f_body_part".to_string());
            params.push(("f_body_part", body_part.clone()));
        }
        if let Some(ref player_id) = filter.player_id {
            conditions.push("pl.pseudonym_id = $f_player".to_string());
            params.push(("f_player", player_id.clone()));
        }
        // Dates are stored as ISO strings, so string comparison is date order
        if let Some(from) = filter.from_date {
            conditions.push("i.date_of_injury >= $f_from".to_string());
            params.push(("f_from", from.to_string()));
        }
        if let Some(to) = filter.to_date {
            conditions.push("i.date_of_injury <= $f_to".to_string());
            params.push(("f_to", to.to_string()));
        }

        Self {
            match_clause,
            conditions,
            params,
        }
    }

    fn where_clause(&self) -> String {
        if self.conditions.is_empty() {
            String::new()
        } else {
            format!("WHERE {}", self.conditions.join(" AND "))
        }
    }

    fn count_cypher(&self) -> String {
        // DISTINCT guards the coach pattern against double-counting an
        // injury when a player is linked to more than one managed team
        format!(
            "{} {} RETURN count(DISTINCT i) AS total",
            self.match_clause,
            self.where_clause()
        )
    }

    fn page_cypher(&self, sort: &InjurySort, skip: usize, limit: usize) -> String {
        let order_dir = if sort.ascending { "ASC" } else { "DESC" };

        // Sort field comes from the allow-list enum, never from raw input
        format!(
            r#"
            {}
            {}
            WITH DISTINCT i, pl
            RETURN i, pl.pseudonym_id AS player_id
            ORDER BY i.{} {}
            SKIP {}
            LIMIT {}
            "#,
            self.match_clause,
            self.where_clause(),
            sort.field.property(),
            order_dir,
            skip,
            limit
        )
    }

    fn apply_params(&self, mut q: Query) -> Query {
        for (name, value) in &self.params {
            q = q.param(name, value.clone());
        }
        q
    }
}

/// A concurrent create losing on the injury_id uniqueness constraint is a
/// compare-and-swap miss, not a failure. Matched on the error text because
/// neo4rs surfaces server errors by code and message.
fn is_unique_violation(message: &str) -> bool {
    message.contains("ConstraintValidationFailed") || message.contains("already exists with label")
}

impl Neo4jClient {
    /// Create a new Neo4j client and initialize the schema
    pub async fn new(uri: &str, user: &str, password: &str) -> Result<Self> {
        let graph = Graph::new(uri, user, password)
            .await
            .context("Failed to connect to Neo4j")?;

        let client = Self {
            graph: Arc::new(graph),
        };

        client.init_schema().await?;

        Ok(client)
    }

    /// Initialize the graph schema with constraints and indexes.
    ///
    /// The uniqueness constraint on Injury.injury_id backs the
    /// compare-and-swap create; the pseudonym/team constraints make any
    /// property-name drift fail loudly instead of silently matching nothing.
    async fn init_schema(&self) -> Result<()> {
        let constraints = vec![
            "CREATE CONSTRAINT team_id IF NOT EXISTS FOR (t:Team) REQUIRE t.team_id IS UNIQUE",
            "CREATE CONSTRAINT player_pseudonym IF NOT EXISTS FOR (p:Player) REQUIRE p.pseudonym_id IS UNIQUE",
            "CREATE CONSTRAINT coach_pseudonym IF NOT EXISTS FOR (c:Coach) REQUIRE c.pseudonym_id IS UNIQUE",
            "CREATE CONSTRAINT injury_id IF NOT EXISTS FOR (i:Injury) REQUIRE i.injury_id IS UNIQUE",
            "CREATE CONSTRAINT status_update_id IF NOT EXISTS FOR (u:StatusUpdate) REQUIRE u.update_id IS UNIQUE",
            "CREATE CONSTRAINT organization_name IF NOT EXISTS FOR (o:Organization) REQUIRE o.name IS UNIQUE",
        ];

        let indexes = vec![
            "CREATE INDEX injury_status IF NOT EXISTS FOR (i:Injury) ON (i.status)",
            "CREATE INDEX injury_severity IF NOT EXISTS FOR (i:Injury) ON (i.severity)",
            "CREATE INDEX injury_date IF NOT EXISTS FOR (i:Injury) ON (i.date_of_injury)",
            "CREATE INDEX status_update_date IF NOT EXISTS FOR (u:StatusUpdate) ON (u.date)",
            "CREATE INDEX team_name IF NOT EXISTS FOR (t:Team) ON (t.name)",
        ];

        for constraint in constraints {
            if let Err(e) = self.graph.run(query(constraint)).await {
                tracing::warn!("Constraint may already exist: {}", e);
            }
        }

        for index in indexes {
            if let Err(e) = self.graph.run(query(index)).await {
                tracing::warn!("Index may already exist: {}", e);
            }
        }

        Ok(())
    }

    // ========================================================================
    // Node conversions
    // ========================================================================

    fn opt_string(node: &neo4rs::Node, key: &str) -> Option<String> {
        node.get::<String>(key).ok().filter(|s| !s.is_empty())
    }

    fn node_to_player(node: &neo4rs::Node) -> Result<PlayerNode> {
        Ok(PlayerNode {
            pseudonym_id: node.get("pseudonym_id")?,
            position: Self::opt_string(node, "position"),
            jersey_number: node.get::<i64>("jersey_number").ok().filter(|n| *n >= 0),
            active: node.get("active").unwrap_or(true),
        })
    }

    fn node_to_coach(node: &neo4rs::Node) -> Result<CoachNode> {
        Ok(CoachNode {
            pseudonym_id: node.get("pseudonym_id")?,
            specialization: Self::opt_string(node, "specialization"),
        })
    }

    fn node_to_team(node: &neo4rs::Node) -> Result<TeamNode> {
        Ok(TeamNode {
            team_id: node.get("team_id")?,
            name: node.get("name")?,
            sport: node.get("sport")?,
            age_group: node.get("age_group")?,
            gender: node.get("gender")?,
            season_start: node.get::<String>("season_start")?.parse()?,
            season_end: node.get::<String>("season_end")?.parse()?,
        })
    }

    fn node_to_injury(node: &neo4rs::Node) -> Result<InjuryNode> {
        let status_str: String = node.get("status")?;
        let status = InjuryStatus::parse(&status_str)
            .with_context(|| format!("Unknown injury status in graph: {}", status_str))?;

        Ok(InjuryNode {
            injury_id: node.get("injury_id")?,
            injury_type: node.get("injury_type")?,
            body_part: node.get("body_part")?,
            side: Self::opt_string(node, "side"),
            severity: node.get("severity")?,
            status,
            date_of_injury: node.get::<String>("date_of_injury")?.parse()?,
            expected_return: Self::opt_string(node, "expected_return").and_then(|s| s.parse().ok()),
            description: Self::opt_string(node, "description"),
            mechanism: Self::opt_string(node, "mechanism"),
            return_to_play_date: Self::opt_string(node, "return_to_play_date")
                .and_then(|s| s.parse().ok()),
            resolution_notes: Self::opt_string(node, "resolution_notes"),
            medical_clearance: node.get::<bool>("medical_clearance").ok(),
            created_at: node
                .get::<String>("created_at")?
                .parse()
                .unwrap_or_else(|_| Utc::now()),
            updated_at: node
                .get::<String>("updated_at")?
                .parse()
                .unwrap_or_else(|_| Utc::now()),
        })
    }

    fn node_to_status_update(node: &neo4rs::Node) -> Result<StatusUpdateNode> {
        let status_str: String = node.get("status")?;
        let status = DailyStatus::parse(&status_str)
            .with_context(|| format!("Unknown daily status in graph: {}", status_str))?;

        Ok(StatusUpdateNode {
            update_id: node.get("update_id")?,
            status,
            note: Self::opt_string(node, "note"),
            date: node.get::<String>("date")?.parse()?,
            recorded_at: node
                .get::<String>("recorded_at")?
                .parse()
                .unwrap_or_else(|_| Utc::now()),
        })
    }

    fn row_to_daily_status(row: &neo4rs::Row, key: &str) -> Option<DailyStatus> {
        row.get::<String>(key)
            .ok()
            .and_then(|s| DailyStatus::parse(&s))
    }
}

#[async_trait]
impl GraphStore for Neo4jClient {
    // ========================================================================
    // Player / coach nodes
    // ========================================================================

    async fn create_player(&self, player: &PlayerNode) -> Result<()> {
        let q = query(
            r#"
            CREATE (p:Player {
                pseudonym_id: $pseudonym_id,
                position: $position,
                jersey_number: $jersey_number,
                active: $active
            })
            "#,
        )
        .param("pseudonym_id", player.pseudonym_id.clone())
        .param("position", player.position.clone().unwrap_or_default())
        .param("jersey_number", player.jersey_number.unwrap_or(-1))
        .param("active", player.active);

        self.graph.run(q).await?;
        Ok(())
    }

    async fn create_coach(&self, coach: &CoachNode) -> Result<()> {
        let q = query(
            r#"
            CREATE (c:Coach {
                pseudonym_id: $pseudonym_id,
                specialization: $specialization
            })
            "#,
        )
        .param("pseudonym_id", coach.pseudonym_id.clone())
        .param(
            "specialization",
            coach.specialization.clone().unwrap_or_default(),
        );

        self.graph.run(q).await?;
        Ok(())
    }

    async fn get_player(&self, pseudonym_id: &str) -> Result<Option<PlayerNode>> {
        let q = query("MATCH (p:Player {pseudonym_id: $pseudonym_id}) RETURN p")
            .param("pseudonym_id", pseudonym_id);

        let mut result = self.graph.execute(q).await?;
        if let Some(row) = result.next().await? {
            let node: neo4rs::Node = row.get("p")?;
            Ok(Some(Self::node_to_player(&node)?))
        } else {
            Ok(None)
        }
    }

    async fn list_players(&self) -> Result<Vec<PlayerWithTeam>> {
        let q = query(
            r#"
            MATCH (p:Player)
            OPTIONAL MATCH (p)-[:PLAYS_FOR]->(t:Team)
            RETURN p, t.name AS team_name
            ORDER BY t.name, p.pseudonym_id
            "#,
        );

        let mut result = self.graph.execute(q).await?;
        let mut players = Vec::new();
        while let Some(row) = result.next().await? {
            let node: neo4rs::Node = row.get("p")?;
            players.push(PlayerWithTeam {
                player: Self::node_to_player(&node)?,
                team_name: row.get::<String>("team_name").ok(),
            });
        }

        Ok(players)
    }

    async fn get_player_detail(&self, pseudonym_id: &str) -> Result<Option<PlayerDetail>> {
        let q = query(
            r#"
            MATCH (p:Player {pseudonym_id: $pseudonym_id})
            OPTIONAL MATCH (p)-[:PLAYS_FOR]->(t:Team)
            RETURN p, t
            "#,
        )
        .param("pseudonym_id", pseudonym_id);

        let mut result = self.graph.execute(q).await?;
        if let Some(row) = result.next().await? {
            let node: neo4rs::Node = row.get("p")?;
            let team = match row.get::<neo4rs::Node>("t") {
                Ok(t) => Some(TeamRef {
                    team_id: t.get("team_id")?,
                    name: t.get("name")?,
                    sport: t.get("sport")?,
                }),
                Err(_) => None,
            };
            Ok(Some(PlayerDetail {
                player: Self::node_to_player(&node)?,
                team,
            }))
        } else {
            Ok(None)
        }
    }

    async fn get_player_injuries(&self, pseudonym_id: &str) -> Result<Vec<InjuryWithReporter>> {
        let q = query(
            r#"
            MATCH (p:Player {pseudonym_id: $pseudonym_id})-[s:SUSTAINED]->(i:Injury)
            RETURN i, s.reported_by AS reported_by, s.diagnosed_date AS diagnosed_date
            ORDER BY i.date_of_injury DESC
            "#,
        )
        .param("pseudonym_id", pseudonym_id);

        let mut result = self.graph.execute(q).await?;
        let mut injuries = Vec::new();
        while let Some(row) = result.next().await? {
            let node: neo4rs::Node = row.get("i")?;
            injuries.push(InjuryWithReporter {
                injury: Self::node_to_injury(&node)?,
                reported_by: row.get::<String>("reported_by").ok(),
                diagnosed_date: row
                    .get::<String>("diagnosed_date")
                    .ok()
                    .and_then(|s| s.parse().ok()),
            });
        }

        Ok(injuries)
    }

    // ========================================================================
    // Injuries
    // ========================================================================

    async fn last_injury_id_with_prefix(&self, prefix: &str) -> Result<Option<String>> {
        let q = query(
            r#"
            MATCH (i:Injury)
            WHERE i.injury_id STARTS WITH $prefix
            RETURN i.injury_id AS id
            ORDER BY id DESC
            LIMIT 1
            "#,
        )
        .param("prefix", prefix);

        let mut result = self.graph.execute(q).await?;
        if let Some(row) = result.next().await? {
            Ok(Some(row.get("id")?))
        } else {
            Ok(None)
        }
    }

    async fn create_injury(
        &self,
        player_pseudonym_id: &str,
        injury: &InjuryNode,
        sustained: &SustainedEdge,
    ) -> Result<bool> {
        // Compare-and-swap: the CREATE only runs when no Injury with this id
        // exists yet. An empty result means the id was taken between the
        // sequence read and this write; a writer that passes the null check
        // concurrently loses on the uniqueness constraint instead, which is
        // the same miss.
        let q = query(
            r#"
            OPTIONAL MATCH (existing:Injury {injury_id: $injury_id})
            WITH existing
            WHERE existing IS NULL
            MATCH (p:Player {pseudonym_id: $player_id})
            CREATE (i:Injury {
                injury_id: $injury_id,
                injury_type: $injury_type,
                body_part: $body_part,
                side: $side,
                severity: $severity,
                status: $status,
                date_of_injury: $date_of_injury,
                expected_return: $expected_return,
                description: $description,
                mechanism: $mechanism,
                created_at: $created_at,
                updated_at: $updated_at
            })
            CREATE (p)-[:SUSTAINED {
                diagnosed_date: $diagnosed_date,
                reported_by: $reported_by
            }]->(i)
            RETURN i.injury_id AS created
            "#,
        )
        .param("player_id", player_pseudonym_id)
        .param("injury_id", injury.injury_id.clone())
        .param("injury_type", injury.injury_type.clone())
        .param("body_part", injury.body_part.clone())
        .param("side", injury.side.clone().unwrap_or_default())
        .param("severity", injury.severity.clone())
        .param("status", injury.status.as_str())
        .param("date_of_injury", injury.date_of_injury.to_string())
        .param(
            "expected_return",
            injury
                .expected_return
                .map(|d| d.to_string())
                .unwrap_or_default(),
        )
        .param("description", injury.description.clone().unwrap_or_default())
        .param("mechanism", injury.mechanism.clone().unwrap_or_default())
        .param("created_at", injury.created_at.to_rfc3339())
        .param("updated_at", injury.updated_at.to_rfc3339())
        .param("diagnosed_date", sustained.diagnosed_date.to_string())
        .param("reported_by", sustained.reported_by.clone());

        let mut result = match self.graph.execute(q).await {
            Ok(result) => result,
            Err(e) if is_unique_violation(&e.to_string()) => return Ok(false),
            Err(e) => return Err(e.into()),
        };
        match result.next().await {
            Ok(row) => Ok(row.is_some()),
            Err(e) if is_unique_violation(&e.to_string()) => Ok(false),
            Err(e) => Err(e.into()),
        }
    }

    async fn get_injury_detail(&self, injury_id: &str) -> Result<Option<InjuryDetail>> {
        let q = query(
            r#"
            MATCH (i:Injury {injury_id: $injury_id})
            OPTIONAL MATCH (p:Player)-[s:SUSTAINED]->(i)
            OPTIONAL MATCH (i)-[:HAS_STATUS_UPDATE]->(u:StatusUpdate)
            WITH i, p, s, u
            ORDER BY u.recorded_at DESC
            RETURN i,
                   p.pseudonym_id AS player_id,
                   s.diagnosed_date AS diagnosed_date,
                   s.reported_by AS reported_by,
                   collect(u) AS history
            "#,
        )
        .param("injury_id", injury_id);

        let mut result = self.graph.execute(q).await?;
        if let Some(row) = result.next().await? {
            let node: neo4rs::Node = row.get("i")?;
            let injury = Self::node_to_injury(&node)?;

            let sustained = match (
                row.get::<String>("diagnosed_date").ok(),
                row.get::<String>("reported_by").ok(),
            ) {
                (Some(date), Some(reported_by)) => Some(SustainedEdge {
                    diagnosed_date: date.parse()?,
                    reported_by,
                }),
                _ => None,
            };

            let history_nodes: Vec<neo4rs::Node> = row.get("history").unwrap_or_default();
            let mut history = Vec::with_capacity(history_nodes.len());
            for n in &history_nodes {
                history.push(Self::node_to_status_update(n)?);
            }

            Ok(Some(InjuryDetail {
                injury,
                player_pseudonym_id: row.get::<String>("player_id").ok(),
                sustained,
                history,
            }))
        } else {
            Ok(None)
        }
    }

    async fn get_injury_status(&self, injury_id: &str) -> Result<Option<InjuryStatus>> {
        let q = query("MATCH (i:Injury {injury_id: $injury_id}) RETURN i.status AS status")
            .param("injury_id", injury_id);

        let mut result = self.graph.execute(q).await?;
        if let Some(row) = result.next().await? {
            let status_str: String = row.get("status")?;
            Ok(InjuryStatus::parse(&status_str))
        } else {
            Ok(None)
        }
    }

    async fn update_injury(&self, injury_id: &str, changes: &InjuryChanges) -> Result<()> {
        // Explicit field iteration: only present fields become SET clauses,
        // absent fields are never touched.
        let mut set_clauses = vec!["i.updated_at = $updated_at"];
        let mut q_params: Vec<(&str, String)> = vec![
            ("injury_id", injury_id.to_string()),
            ("updated_at", Utc::now().to_rfc3339()),
        ];

        if let Some(ref injury_type) = changes.injury_type {
            set_clauses.push("i.injury_type = $injury_type");
            q_params.push(("injury_type", injury_type.clone()));
        }
        if let Some(ref body_part) = changes.body_part {
            set_clauses.push("i.body_part = $body_part");
            q_params.push(("body_part", body_part.clone()));
        }
        if let Some(ref side) = changes.side {
            set_clauses.push("i.side = $side");
            q_params.push(("side", side.clone()));
        }
        if let Some(ref severity) = changes.severity {
            set_clauses.push("i.severity = $severity");
            q_params.push(("severity", severity.clone()));
        }
        if let Some(status) = changes.status {
            set_clauses.push("i.status = $status");
            q_params.push(("status", status.as_str().to_string()));
        }
        if let Some(expected_return) = changes.expected_return {
            set_clauses.push("i.expected_return = $expected_return");
            q_params.push(("expected_return", expected_return.to_string()));
        }
        if let Some(ref description) = changes.description {
            set_clauses.push("i.description = $description");
            q_params.push(("description", description.clone()));
        }
        if let Some(ref mechanism) = changes.mechanism {
            set_clauses.push("i.mechanism = $mechanism");
            q_params.push(("mechanism", mechanism.clone()));
        }

        let cypher = format!(
            "MATCH (i:Injury {{injury_id: $injury_id}}) SET {}",
            set_clauses.join(", ")
        );

        let mut q = query(&cypher);
        for (name, value) in q_params {
            q = q.param(name, value);
        }

        self.graph.run(q).await?;
        Ok(())
    }

    async fn append_injury_status_update(
        &self,
        injury_id: &str,
        update: &StatusUpdateNode,
    ) -> Result<()> {
        let q = query(
            r#"
            MATCH (i:Injury {injury_id: $injury_id})
            CREATE (u:StatusUpdate {
                update_id: $update_id,
                status: $status,
                note: $note,
                date: $date,
                recorded_at: $recorded_at
            })
            CREATE (i)-[:HAS_STATUS_UPDATE]->(u)
            "#,
        )
        .param("injury_id", injury_id)
        .param("update_id", update.update_id.clone())
        .param("status", update.status.as_str())
        .param("note", update.note.clone().unwrap_or_default())
        .param("date", update.date.to_string())
        .param("recorded_at", update.recorded_at.to_rfc3339());

        self.graph.run(q).await?;
        Ok(())
    }

    async fn resolve_injury(&self, injury_id: &str, resolution: &InjuryResolution) -> Result<()> {
        let q = query(
            r#"
            MATCH (i:Injury {injury_id: $injury_id})
            SET i.status = 'Recovered',
                i.return_to_play_date = $return_to_play_date,
                i.resolution_notes = $resolution_notes,
                i.medical_clearance = $medical_clearance,
                i.updated_at = $updated_at
            "#,
        )
        .param("injury_id", injury_id)
        .param(
            "return_to_play_date",
            resolution.return_to_play_date.to_string(),
        )
        .param(
            "resolution_notes",
            resolution.resolution_notes.clone().unwrap_or_default(),
        )
        .param("medical_clearance", resolution.medical_clearance)
        .param("updated_at", Utc::now().to_rfc3339());

        self.graph.run(q).await?;
        Ok(())
    }

    async fn count_injuries(&self, scope: &RoleScope, filter: &InjuryFilter) -> Result<usize> {
        let iq = InjuryQuery::new(scope, filter);
        let q = iq.apply_params(query(&iq.count_cypher()));
        let mut result = self.graph.execute(q).await?;
        let total: i64 = match result.next().await? {
            Some(row) => row.get("total").unwrap_or(0),
            None => 0,
        };

        Ok(total as usize)
    }

    async fn list_injuries(
        &self,
        scope: &RoleScope,
        filter: &InjuryFilter,
        sort: &InjurySort,
        skip: usize,
        limit: usize,
    ) -> Result<Vec<InjuryWithPlayer>> {
        let iq = InjuryQuery::new(scope, filter);
        let q = iq.apply_params(query(&iq.page_cypher(sort, skip, limit)));
        let mut result = self.graph.execute(q).await?;
        let mut injuries = Vec::new();
        while let Some(row) = result.next().await? {
            let node: neo4rs::Node = row.get("i")?;
            injuries.push(InjuryWithPlayer {
                injury: Self::node_to_injury(&node)?,
                player_pseudonym_id: row.get::<String>("player_id").ok(),
            });
        }

        Ok(injuries)
    }

    // ========================================================================
    // Daily status
    // ========================================================================

    async fn create_status_update(
        &self,
        player_pseudonym_id: &str,
        update: &StatusUpdateNode,
    ) -> Result<()> {
        let q = query(
            r#"
            MATCH (p:Player {pseudonym_id: $player_id})
            CREATE (u:StatusUpdate {
                update_id: $update_id,
                status: $status,
                note: $note,
                date: $date,
                recorded_at: $recorded_at
            })
            CREATE (p)-[:HAS_STATUS]->(u)
            "#,
        )
        .param("player_id", player_pseudonym_id)
        .param("update_id", update.update_id.clone())
        .param("status", update.status.as_str())
        .param("note", update.note.clone().unwrap_or_default())
        .param("date", update.date.to_string())
        .param("recorded_at", update.recorded_at.to_rfc3339());

        self.graph.run(q).await?;
        Ok(())
    }

    async fn latest_team_statuses(
        &self,
        coach_pseudonym_id: &str,
        today: NaiveDate,
    ) -> Result<Vec<TeamStatusRow>> {
        let q = query(
            r#"
            MATCH (c:Coach {pseudonym_id: $coach_id})-[:MANAGES]->(t:Team)
            MATCH (pl:Player)-[:PLAYS_FOR]->(t)
            OPTIONAL MATCH (pl)-[:HAS_STATUS]->(su:StatusUpdate {date: $today})
            WITH t, pl, su
            ORDER BY su.recorded_at DESC
            WITH t, pl, collect(su)[0] AS today_status
            OPTIONAL MATCH (pl)-[:SUSTAINED]->(inj:Injury)
            WHERE inj.status <> 'Recovered'
            RETURN t, pl,
                   today_status.status AS status,
                   today_status.note AS note,
                   count(inj) AS open_injuries
            ORDER BY t.name, pl.pseudonym_id
            "#,
        )
        .param("coach_id", coach_pseudonym_id)
        .param("today", today.to_string());

        let mut result = self.graph.execute(q).await?;
        let mut rows = Vec::new();
        while let Some(row) = result.next().await? {
            let team_node: neo4rs::Node = row.get("t")?;
            let player_node: neo4rs::Node = row.get("pl")?;
            rows.push(TeamStatusRow {
                team: Self::node_to_team(&team_node)?,
                player: Self::node_to_player(&player_node)?,
                today_status: Self::row_to_daily_status(&row, "status"),
                today_note: row.get::<String>("note").ok().filter(|s| !s.is_empty()),
                open_injuries: row.get("open_injuries").unwrap_or(0),
            });
        }

        Ok(rows)
    }

    async fn status_history(&self, player_pseudonym_id: &str) -> Result<Vec<StatusUpdateNode>> {
        // Unbounded on purpose: daily history volumes are small in this domain
        let q = query(
            r#"
            MATCH (p:Player {pseudonym_id: $player_id})-[:HAS_STATUS]->(u:StatusUpdate)
            RETURN u
            ORDER BY u.recorded_at DESC
            "#,
        )
        .param("player_id", player_pseudonym_id);

        let mut result = self.graph.execute(q).await?;
        let mut history = Vec::new();
        while let Some(row) = result.next().await? {
            let node: neo4rs::Node = row.get("u")?;
            history.push(Self::node_to_status_update(&node)?);
        }

        Ok(history)
    }

    // ========================================================================
    // Teams
    // ========================================================================

    async fn create_team(&self, team: &TeamNode, organization: &str) -> Result<()> {
        let q = query(
            r#"
            CREATE (t:Team {
                team_id: $team_id,
                name: $name,
                sport: $sport,
                age_group: $age_group,
                gender: $gender,
                season_start: $season_start,
                season_end: $season_end
            })
            WITH t
            MERGE (o:Organization {name: $organization})
            CREATE (t)-[:BELONGS_TO]->(o)
            WITH t
            MERGE (s:Sport {name: $sport})
            CREATE (t)-[:PLAYS]->(s)
            "#,
        )
        .param("team_id", team.team_id.clone())
        .param("name", team.name.clone())
        .param("sport", team.sport.clone())
        .param("age_group", team.age_group.clone())
        .param("gender", team.gender.clone())
        .param("season_start", team.season_start.to_string())
        .param("season_end", team.season_end.to_string())
        .param("organization", organization);

        self.graph.run(q).await?;
        Ok(())
    }

    async fn link_player_to_team(&self, player_pseudonym_id: &str, team_id: &str) -> Result<()> {
        let q = query(
            r#"
            MATCH (p:Player {pseudonym_id: $player_id})
            MATCH (t:Team {team_id: $team_id})
            MERGE (p)-[:PLAYS_FOR]->(t)
            "#,
        )
        .param("player_id", player_pseudonym_id)
        .param("team_id", team_id);

        self.graph.run(q).await?;
        Ok(())
    }

    async fn link_coach_to_team(&self, coach_pseudonym_id: &str, team_id: &str) -> Result<()> {
        let q = query(
            r#"
            MATCH (c:Coach {pseudonym_id: $coach_id})
            MATCH (t:Team {team_id: $team_id})
            MERGE (c)-[:MANAGES]->(t)
            "#,
        )
        .param("coach_id", coach_pseudonym_id)
        .param("team_id", team_id);

        self.graph.run(q).await?;
        Ok(())
    }

    async fn team_roster(
        &self,
        team_id: &str,
        today: NaiveDate,
    ) -> Result<Option<(TeamNode, Vec<RosterRow>)>> {
        let q = query(
            r#"
            MATCH (t:Team {team_id: $team_id})
            OPTIONAL MATCH (pl:Player)-[:PLAYS_FOR]->(t)
            OPTIONAL MATCH (pl)-[:HAS_STATUS]->(su:StatusUpdate {date: $today})
            WITH t, pl, su
            ORDER BY su.recorded_at DESC
            WITH t, pl, collect(su)[0] AS today_status
            OPTIONAL MATCH (pl)-[:SUSTAINED]->(inj:Injury)
            WHERE inj.status <> 'Recovered'
            RETURN t, pl,
                   today_status.status AS status,
                   today_status.note AS note,
                   count(inj) AS open_injuries
            ORDER BY pl.pseudonym_id
            "#,
        )
        .param("team_id", team_id)
        .param("today", today.to_string());

        let mut result = self.graph.execute(q).await?;
        let mut team = None;
        let mut rows = Vec::new();
        while let Some(row) = result.next().await? {
            if team.is_none() {
                let team_node: neo4rs::Node = row.get("t")?;
                team = Some(Self::node_to_team(&team_node)?);
            }
            // A team without players yields one row with a null player
            if let Ok(player_node) = row.get::<neo4rs::Node>("pl") {
                rows.push(RosterRow {
                    player: Self::node_to_player(&player_node)?,
                    today_status: Self::row_to_daily_status(&row, "status"),
                    today_note: row.get::<String>("note").ok().filter(|s| !s.is_empty()),
                    open_injuries: row.get("open_injuries").unwrap_or(0),
                });
            }
        }

        Ok(team.map(|t| (t, rows)))
    }

    async fn get_team_detail(&self, team_id: &str) -> Result<Option<TeamDetail>> {
        let q = query(
            r#"
            MATCH (t:Team {team_id: $team_id})
            OPTIONAL MATCH (t)-[:BELONGS_TO]->(o:Organization)
            OPTIONAL MATCH (c:Coach)-[:MANAGES]->(t)
            OPTIONAL MATCH (pl:Player)-[:PLAYS_FOR]->(t)
            RETURN t,
                   o.name AS organization,
                   collect(DISTINCT c) AS coaches,
                   count(DISTINCT pl) AS player_count
            "#,
        )
        .param("team_id", team_id);

        let mut result = self.graph.execute(q).await?;
        if let Some(row) = result.next().await? {
            let team_node: neo4rs::Node = row.get("t")?;
            // collect(DISTINCT c) drops nulls, so no placeholder filtering needed
            let coach_nodes: Vec<neo4rs::Node> = row.get("coaches").unwrap_or_default();
            let mut coaches = Vec::with_capacity(coach_nodes.len());
            for n in &coach_nodes {
                coaches.push(Self::node_to_coach(n)?);
            }

            Ok(Some(TeamDetail {
                team: Self::node_to_team(&team_node)?,
                organization: row.get::<String>("organization").unwrap_or_default(),
                coaches,
                player_count: row.get("player_count").unwrap_or(0),
            }))
        } else {
            Ok(None)
        }
    }

    async fn coach_manages_team(&self, coach_pseudonym_id: &str, team_id: &str) -> Result<bool> {
        let q = query(
            r#"
            MATCH (c:Coach {pseudonym_id: $coach_id})-[:MANAGES]->(t:Team {team_id: $team_id})
            RETURN count(t) > 0 AS manages
            "#,
        )
        .param("coach_id", coach_pseudonym_id)
        .param("team_id", team_id);

        let mut result = self.graph.execute(q).await?;
        match result.next().await? {
            Some(row) => Ok(row.get("manages").unwrap_or(false)),
            None => Ok(false),
        }
    }

    async fn teams_for_coach(&self, coach_pseudonym_id: &str) -> Result<Vec<TeamNode>> {
        let q = query(
            r#"
            MATCH (c:Coach {pseudonym_id: $coach_id})-[:MANAGES]->(t:Team)
            RETURN t
            ORDER BY t.name
            "#,
        )
        .param("coach_id", coach_pseudonym_id);

        let mut result = self.graph.execute(q).await?;
        let mut teams = Vec::new();
        while let Some(row) = result.next().await? {
            let node: neo4rs::Node = row.get("t")?;
            teams.push(Self::node_to_team(&node)?);
        }

        Ok(teams)
    }

    // ========================================================================
    // Health
    // ========================================================================

    async fn health_check(&self) -> Result<bool> {
        let mut result = self.graph.execute(query("RETURN 1 AS ok")).await?;
        Ok(result.next().await?.is_some())
    }
}

// ============================================================================
// Tests
// ============================================================================

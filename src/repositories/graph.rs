//! Whole-graph reads and administrative writes.

use serde::Deserialize;
use serde_json::{Map, Value as JsonValue};

use crate::context::{AppGraph, Context};
use crate::di::FromContext;
use crate::error::AppError;
use crate::graph::{QueryExt, Row, Statement};
use crate::models::{
    EdgeTypeCount, GraphData, GraphLink, GraphNode, GraphSummary, NodeLabelCount,
};
use crate::transform::{INTERACTS_WITH_EDGE, MEMBER_OF_EDGE, RELATIONSHIP_EDGE};

/// Deletes all data; migration bookkeeping survives.
pub const CLEAR_ALL: &str = "MATCH (n) WHERE NOT n:SchemaVersion DETACH DELETE n";

/// Repository for reading the graph as a whole and for bulk writes.
#[derive(FromContext, Clone)]
pub struct GraphRepository {
    graph: AppGraph,
}

#[derive(Deserialize)]
struct NodeRow {
    label: Option<String>,
    #[serde(default)]
    props: Map<String, JsonValue>,
}

#[derive(Deserialize)]
struct LinkRow {
    source: JsonValue,
    target: JsonValue,
    #[serde(rename = "type")]
    rel_type: String,
    #[serde(default)]
    props: Map<String, JsonValue>,
}

impl GraphRepository {
    /// Deletes every node and relationship.
    pub async fn clear(&self) -> Result<(), AppError> {
        self.graph.query(CLEAR_ALL).run().await
    }

    /// Applies statements as one atomic batch.
    pub async fn apply(&self, statements: Vec<Statement>) -> Result<(), AppError> {
        self.graph.run_batch(statements).await
    }

    pub async fn count_nodes(&self) -> Result<u64, AppError> {
        let row = self
            .graph
            .query("MATCH (n) WHERE NOT n:SchemaVersion RETURN count(n) AS count")
            .fetch_one()
            .await?;
        match row {
            Some(row) => Ok(row.get_opt::<u64>("count")?.unwrap_or(0)),
            None => Ok(0),
        }
    }

    /// Every node and relationship.
    pub async fn full_graph(&self) -> Result<GraphData, AppError> {
        let nodes = self
            .fetch_nodes(
                "MATCH (n) WHERE NOT n:SchemaVersion
                 RETURN labels(n)[0] AS label, properties(n) AS props",
            )
            .await?;
        let links = self
            .fetch_links(
                "MATCH (a)-[r]->(b)
                 RETURN a.id AS source, b.id AS target, type(r) AS type, properties(r) AS props",
            )
            .await?;
        Ok(GraphData::new(nodes, links))
    }

    /// Entities and the derived edges between them.
    pub async fn aggregated_graph(&self) -> Result<GraphData, AppError> {
        let nodes = self
            .fetch_nodes("MATCH (n:Entity) RETURN 'Entity' AS label, properties(n) AS props")
            .await?;
        let links = self
            .graph
            .query(
                "MATCH (a:Entity)-[r]->(b:Entity)
                 WHERE type(r) IN $types
                 RETURN a.id AS source, b.id AS target, type(r) AS type, properties(r) AS props",
            )
            .param(
                "types",
                [INTERACTS_WITH_EDGE, RELATIONSHIP_EDGE, MEMBER_OF_EDGE],
            )
            .fetch_all()
            .await?
            .iter()
            .map(link_from_row)
            .collect::<Result<Vec<_>, _>>()?;
        Ok(GraphData::new(nodes, links))
    }

    pub async fn summary(&self) -> Result<GraphSummary, AppError> {
        let nodes = self
            .graph
            .query(
                "MATCH (n) WHERE NOT n:SchemaVersion
                 RETURN labels(n)[0] AS label, n.sub_type AS sub_type, count(*) AS count
                 ORDER BY label, sub_type",
            )
            .fetch_all()
            .await?
            .iter()
            .map(|row| {
                Ok(NodeLabelCount {
                    label: row.get_opt("label")?.unwrap_or_default(),
                    sub_type: row.get_text("sub_type"),
                    count: row.get("count")?,
                })
            })
            .collect::<Result<Vec<_>, AppError>>()?;

        let edges = self
            .graph
            .query(
                "MATCH ()-[r]->()
                 RETURN type(r) AS type, count(*) AS count
                 ORDER BY count DESC, type",
            )
            .fetch_all()
            .await?
            .iter()
            .map(|row| {
                Ok(EdgeTypeCount {
                    edge_type: row.get("type")?,
                    count: row.get("count")?,
                })
            })
            .collect::<Result<Vec<_>, AppError>>()?;

        Ok(GraphSummary::new(nodes, edges))
    }

    async fn fetch_nodes(&self, cypher: &str) -> Result<Vec<GraphNode>, AppError> {
        self.graph
            .query(cypher)
            .fetch_all()
            .await?
            .iter()
            .map(node_from_row)
            .collect()
    }

    async fn fetch_links(&self, cypher: &str) -> Result<Vec<GraphLink>, AppError> {
        self.graph
            .query(cypher)
            .fetch_all()
            .await?
            .iter()
            .map(link_from_row)
            .collect()
    }
}

impl LinkRow {
    fn into_link(self) -> GraphLink {
        GraphLink::from_properties(
            id_text(&self.source),
            id_text(&self.target),
            &self.rel_type,
            self.props,
        )
    }
}

fn id_text(value: &JsonValue) -> String {
    match value {
        JsonValue::String(s) => s.clone(),
        JsonValue::Null => String::new(),
        other => other.to_string(),
    }
}

/// Reads a `source, target, type, props` row as a link.
pub(crate) fn link_from_row(row: &Row) -> Result<GraphLink, AppError> {
    row.parse::<LinkRow>().map(LinkRow::into_link)
}

/// Reads a `label, props` row as a node.
pub(crate) fn node_from_row(row: &Row) -> Result<GraphNode, AppError> {
    let row: NodeRow = row.parse()?;
    Ok(GraphNode::from_properties(
        row.label.as_deref().unwrap_or("Node"),
        row.props,
    ))
}

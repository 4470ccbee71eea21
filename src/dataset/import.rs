//! Turns a parsed dataset into batched, parameterized write statements.

use std::collections::{BTreeMap, HashMap};

use serde_json::{json, Value as JsonValue};

use super::node_link::NodeLinkGraph;
use super::properties::sanitize_properties;
use crate::graph::{Label, Statement};
use crate::models::ImportSummary;

/// Label for nodes without a `type`.
pub const DEFAULT_NODE_LABEL: &str = "Node";
/// Relationship type for edges without a `type`.
pub const DEFAULT_EDGE_TYPE: &str = "RELATED_TO";

type EdgeKey = (Label, Label, Label);

/// Nodes grouped by label and edges grouped by endpoint labels and type.
///
/// Labels come from dataset text, so they are sanitized before they reach
/// Cypher; every value travels as a parameter.
#[derive(Debug, Default)]
pub struct ImportPlan {
    nodes: BTreeMap<Label, Vec<JsonValue>>,
    edges: BTreeMap<EdgeKey, Vec<JsonValue>>,
    skipped_edges: usize,
}

impl ImportPlan {
    pub fn from_graph(graph: &NodeLinkGraph) -> Self {
        let mut plan = Self::default();
        let mut labels: HashMap<&str, Label> = HashMap::new();

        for node in &graph.nodes {
            let label = Label::sanitize(node.node_type().unwrap_or(""), DEFAULT_NODE_LABEL);
            // First occurrence of an id wins.
            if labels.contains_key(node.id.as_str()) {
                continue;
            }
            labels.insert(node.id.as_str(), label.clone());

            let mut props = sanitize_properties(&node.properties);
            props.insert("id".to_string(), JsonValue::String(node.id.clone()));
            plan.nodes
                .entry(label)
                .or_default()
                .push(json!({"id": node.id, "props": props}));
        }

        for edge in &graph.links {
            let (Some(source), Some(target)) = (
                labels.get(edge.source.as_str()),
                labels.get(edge.target.as_str()),
            ) else {
                plan.skipped_edges += 1;
                continue;
            };
            let rel_type = Label::sanitize(edge.edge_type().unwrap_or(""), DEFAULT_EDGE_TYPE);
            let props = sanitize_properties(&edge.properties);

            plan.edges
                .entry((source.clone(), target.clone(), rel_type))
                .or_default()
                .push(json!({"source": edge.source, "target": edge.target, "props": props}));
        }

        if plan.skipped_edges > 0 {
            tracing::warn!(
                skipped = plan.skipped_edges,
                "Edges reference unknown node ids and will not be imported"
            );
        }
        plan
    }

    pub fn summary(&self) -> ImportSummary {
        ImportSummary {
            nodes: self.nodes.values().map(Vec::len).sum(),
            edges: self.edges.values().map(Vec::len).sum(),
            skipped_edges: self.skipped_edges,
        }
    }

    /// Node statements first, then edge statements, `batch_size` rows each.
    pub fn statements(&self, batch_size: usize) -> Vec<Statement> {
        let batch_size = batch_size.max(1);
        let mut statements = Vec::new();

        for (label, rows) in &self.nodes {
            let cypher = format!(
                "UNWIND $rows AS row MERGE (n:{label} {{id: row.id}}) SET n += row.props"
            );
            for chunk in rows.chunks(batch_size) {
                statements.push(Statement::new(cypher.clone()).param("rows", chunk.to_vec()));
            }
        }

        for ((source, target, rel_type), rows) in &self.edges {
            let cypher = format!(
                "UNWIND $rows AS row \
                 MATCH (a:{source} {{id: row.source}}) \
                 MATCH (b:{target} {{id: row.target}}) \
                 CREATE (a)-[r:{rel_type}]->(b) SET r += row.props"
            );
            for chunk in rows.chunks(batch_size) {
                statements.push(Statement::new(cypher.clone()).param("rows", chunk.to_vec()));
            }
        }

        statements
    }
}

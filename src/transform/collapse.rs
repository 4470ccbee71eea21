//! Relationship nodes to direct `RELATIONSHIP` edges.

use std::collections::BTreeSet;

use serde::Deserialize;
use serde_json::{json, Map, Value as JsonValue};

use super::{Pass, RELATIONSHIP_EDGE};
use crate::dataset::sanitize_properties;
use crate::graph::Statement;
use crate::models::PassReport;

/// A Relationship node with the entities around it.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct RelationshipRow {
    pub id: String,
    pub sub_type: Option<String>,
    #[serde(default)]
    pub props: Map<String, JsonValue>,
    /// Entities with an edge into the relationship node.
    #[serde(default)]
    pub sources: Vec<String>,
    /// Entities the relationship node points to.
    #[serde(default)]
    pub targets: Vec<String>,
}

#[derive(Debug, Clone, PartialEq)]
struct CollapsedEdge {
    relationship_id: String,
    source: String,
    target: String,
    directed: bool,
    sub_type: Option<String>,
    props: Map<String, JsonValue>,
}

#[derive(Debug, Default)]
pub struct CollapsePlan {
    edges: Vec<CollapsedEdge>,
    delete: Vec<String>,
}

/// Sources times targets give directed edges. With only one side present,
/// every unordered pair on that side is linked undirected. Nodes that
/// yield no edge are left in place.
pub fn plan(relationships: Vec<RelationshipRow>) -> CollapsePlan {
    let mut plan = CollapsePlan::default();

    for rel in relationships {
        let sources: BTreeSet<&str> = rel.sources.iter().map(String::as_str).collect();
        let targets: BTreeSet<&str> = rel.targets.iter().map(String::as_str).collect();

        let (pairs, directed): (Vec<(&str, &str)>, bool) =
            match (sources.is_empty(), targets.is_empty()) {
                (false, false) => (
                    sources
                        .iter()
                        .flat_map(|s| targets.iter().map(move |t| (*s, *t)))
                        .filter(|(s, t)| s != t)
                        .collect(),
                    true,
                ),
                (false, true) => (unordered_pairs(&sources), false),
                (true, false) => (unordered_pairs(&targets), false),
                (true, true) => (Vec::new(), false),
            };

        if pairs.is_empty() {
            continue;
        }

        let mut props = sanitize_properties(&rel.props);
        for key in ["id", "type", "sub_type"] {
            props.remove(key);
        }
        for (source, target) in pairs {
            plan.edges.push(CollapsedEdge {
                relationship_id: rel.id.clone(),
                source: source.to_string(),
                target: target.to_string(),
                directed,
                sub_type: rel.sub_type.clone(),
                props: props.clone(),
            });
        }
        plan.delete.push(rel.id);
    }

    plan
}

fn unordered_pairs<'a>(ids: &BTreeSet<&'a str>) -> Vec<(&'a str, &'a str)> {
    let ids: Vec<&str> = ids.iter().copied().collect();
    let mut pairs = Vec::new();
    for (i, a) in ids.iter().enumerate() {
        for b in &ids[i + 1..] {
            pairs.push((*a, *b));
        }
    }
    pairs
}

impl CollapsePlan {
    pub fn is_empty(&self) -> bool {
        self.delete.is_empty()
    }

    pub fn report(&self) -> PassReport {
        PassReport {
            created: self.edges.len(),
            deleted: self.delete.len(),
            ..PassReport::new(Pass::CollapseRelationships.name())
        }
    }

    /// Edge creation comes before node deletion.
    pub fn statements(&self, batch_size: usize) -> Vec<Statement> {
        let batch_size = batch_size.max(1);
        let create = format!(
            "UNWIND $rows AS row \
             MATCH (a:Entity {{id: row.source}}) \
             MATCH (b:Entity {{id: row.target}}) \
             MERGE (a)-[r:{RELATIONSHIP_EDGE} {{relationship_id: row.relationship_id}}]->(b) \
             SET r += row.props, r.sub_type = row.sub_type, r.directed = row.directed"
        );

        let mut statements: Vec<Statement> = self
            .edges
            .chunks(batch_size)
            .map(|chunk| {
                let rows: Vec<JsonValue> = chunk
                    .iter()
                    .map(|edge| {
                        json!({
                            "relationship_id": edge.relationship_id,
                            "source": edge.source,
                            "target": edge.target,
                            "directed": edge.directed,
                            "sub_type": edge.sub_type,
                            "props": edge.props,
                        })
                    })
                    .collect();
                Statement::new(create.clone()).param("rows", rows)
            })
            .collect();

        statements.extend(self.delete.chunks(batch_size).map(|chunk| {
            Statement::new("UNWIND $ids AS id MATCH (n:Relationship {id: id}) DETACH DELETE n")
                .param("ids", chunk.to_vec())
        }));
        statements
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rel(id: &str, sources: &[&str], targets: &[&str]) -> RelationshipRow {
        RelationshipRow {
            id: id.to_string(),
            sub_type: Some("Colleagues".to_string()),
            props: json!({"id": id, "type": "Relationship", "start_date": "2040-10-01"})
                .as_object()
                .cloned()
                .unwrap(),
            sources: sources.iter().map(|s| s.to_string()).collect(),
            targets: targets.iter().map(|s| s.to_string()).collect(),
        }
    }

    #[test]
    fn test_directed_product() {
        let plan = plan(vec![rel("r1", &["a", "b"], &["c", "a"])]);
        let pairs: Vec<_> = plan
            .edges
            .iter()
            .map(|e| (e.source.as_str(), e.target.as_str(), e.directed))
            .collect();
        assert_eq!(
            pairs,
            vec![("a", "c", true), ("b", "a", true), ("b", "c", true)]
        );
        assert_eq!(plan.delete, vec!["r1".to_string()]);
        assert_eq!(plan.edges[0].props.len(), 1);
    }

    #[test]
    fn test_one_sided_becomes_undirected_pairs() {
        let plan = plan(vec![rel("r1", &["c", "a", "b"], &[])]);
        let pairs: Vec<_> = plan
            .edges
            .iter()
            .map(|e| (e.source.as_str(), e.target.as_str(), e.directed))
            .collect();
        assert_eq!(
            pairs,
            vec![("a", "b", false), ("a", "c", false), ("b", "c", false)]
        );
    }

    #[test]
    fn test_isolated_relationship_is_kept() {
        let plan = plan(vec![rel("r1", &["a"], &[]), rel("r2", &[], &[])]);
        assert!(plan.is_empty());
        assert!(plan.report().is_noop());
    }

    #[test]
    fn test_statements_create_before_delete() {
        let plan = plan(vec![rel("r1", &["a"], &["b"])]);
        let statements = plan.statements(100);
        assert_eq!(statements.len(), 2);
        assert!(statements[0].cypher.contains("MERGE (a)-[r:RELATIONSHIP"));
        assert!(statements[1].cypher.contains("DETACH DELETE n"));
    }
}

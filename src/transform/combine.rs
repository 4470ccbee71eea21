//! Parallel edges of the same type merged into one edge with a `count`.

use std::collections::BTreeMap;

use serde::Deserialize;
use serde_json::json;

use super::{Pass, DERIVED_EDGES};
use crate::dataset::CONNECTED_TO;
use crate::graph::Statement;
use crate::models::PassReport;

/// An edge keyed by database element ids.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct EdgeRow {
    pub rel_id: String,
    pub source: String,
    pub target: String,
    #[serde(rename = "type")]
    pub rel_type: String,
    /// Multiplicity recorded by an earlier combine, if any.
    pub count: Option<u64>,
}

/// Edge types combine never merges: the derived types plus the airport
/// network, whose parallel routes are distinct flights.
pub fn excluded_types() -> Vec<&'static str> {
    let mut types = DERIVED_EDGES.to_vec();
    types.push(CONNECTED_TO);
    types
}

fn is_combinable(rel_type: &str) -> bool {
    !DERIVED_EDGES.contains(&rel_type) && rel_type != CONNECTED_TO
}

#[derive(Debug, Default)]
pub struct CombinePlan {
    /// Surviving edge id and its new count.
    keep: Vec<(String, u64)>,
    delete: Vec<String>,
}

/// Keeps the lowest element id of every (source, target, type) group.
///
/// Edges written by the pipeline itself are left alone; a `COMMUNICATION`
/// edge stands for one event and a `RELATIONSHIP` edge for one
/// relationship node. Airport `CONNECTED_TO` edges are skipped as well.
pub fn plan(edges: Vec<EdgeRow>) -> CombinePlan {
    let mut groups: BTreeMap<(String, String, String), Vec<EdgeRow>> = BTreeMap::new();
    for edge in edges {
        if !is_combinable(&edge.rel_type) {
            continue;
        }
        groups
            .entry((edge.source.clone(), edge.target.clone(), edge.rel_type.clone()))
            .or_default()
            .push(edge);
    }

    let mut plan = CombinePlan::default();
    for (_, mut group) in groups {
        if group.len() < 2 {
            continue;
        }
        group.sort_by(|a, b| a.rel_id.cmp(&b.rel_id));
        let total: u64 = group.iter().map(|e| e.count.unwrap_or(1)).sum();
        let mut members = group.into_iter();
        if let Some(first) = members.next() {
            plan.keep.push((first.rel_id, total));
        }
        plan.delete.extend(members.map(|e| e.rel_id));
    }
    plan
}

impl CombinePlan {
    pub fn is_empty(&self) -> bool {
        self.delete.is_empty()
    }

    pub fn report(&self) -> PassReport {
        PassReport {
            deleted: self.delete.len(),
            ..PassReport::new(Pass::CombineLinks.name())
        }
    }

    pub fn statements(&self, batch_size: usize) -> Vec<Statement> {
        let batch_size = batch_size.max(1);
        let mut statements = Vec::new();

        for chunk in self.keep.chunks(batch_size) {
            let rows: Vec<_> = chunk
                .iter()
                .map(|(id, count)| json!({"id": id, "count": count}))
                .collect();
            statements.push(
                Statement::new(
                    "UNWIND $rows AS row \
                     MATCH ()-[r]->() WHERE elementId(r) = row.id \
                     SET r.count = row.count",
                )
                .param("rows", rows),
            );
        }
        for chunk in self.delete.chunks(batch_size) {
            statements.push(
                Statement::new(
                    "UNWIND $ids AS id \
                     MATCH ()-[r]->() WHERE elementId(r) = id \
                     DELETE r",
                )
                .param("ids", chunk.to_vec()),
            );
        }
        statements
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::transform::{COMMUNICATION_EDGE, RELATIONSHIP_EDGE};

    fn edge(rel_id: &str, source: &str, target: &str, rel_type: &str) -> EdgeRow {
        EdgeRow {
            rel_id: rel_id.to_string(),
            source: source.to_string(),
            target: target.to_string(),
            rel_type: rel_type.to_string(),
            count: None,
        }
    }

    #[test]
    fn test_merges_parallel_edges() {
        let plan = plan(vec![
            edge("5:r3", "n1", "n2", "evidence_for"),
            edge("5:r1", "n1", "n2", "evidence_for"),
            edge("5:r2", "n1", "n2", "evidence_for"),
            edge("5:r4", "n1", "n2", "sent"),
            edge("5:r5", "n2", "n1", "evidence_for"),
        ]);
        assert_eq!(plan.keep, vec![("5:r1".to_string(), 3)]);
        assert_eq!(plan.delete, vec!["5:r2".to_string(), "5:r3".to_string()]);
        assert_eq!(plan.report().deleted, 2);
        assert_eq!(plan.statements(10).len(), 2);
    }

    #[test]
    fn test_derived_edges_untouched() {
        let plan = plan(vec![
            edge("5:r1", "n1", "n2", COMMUNICATION_EDGE),
            edge("5:r2", "n1", "n2", COMMUNICATION_EDGE),
            edge("5:r3", "n1", "n2", RELATIONSHIP_EDGE),
            edge("5:r4", "n1", "n2", RELATIONSHIP_EDGE),
        ]);
        assert!(plan.is_empty());
    }

    #[test]
    fn test_airport_routes_untouched() {
        let plan = plan(vec![
            edge("5:r1", "JFK", "LHR", CONNECTED_TO),
            edge("5:r2", "JFK", "LHR", CONNECTED_TO),
            edge("5:r3", "JFK", "LHR", CONNECTED_TO),
        ]);
        assert!(plan.is_empty());
        assert!(excluded_types().contains(&CONNECTED_TO));
        assert!(excluded_types().contains(&COMMUNICATION_EDGE));
    }

    #[test]
    fn test_existing_counts_are_summed() {
        let mut kept = edge("5:r1", "n1", "n2", "evidence_for");
        kept.count = Some(3);
        let plan = plan(vec![kept, edge("5:r9", "n1", "n2", "evidence_for")]);
        assert_eq!(plan.keep, vec![("5:r1".to_string(), 4)]);
    }

    #[test]
    fn test_single_edges_are_noop() {
        let plan = plan(vec![edge("5:r1", "n1", "n2", "evidence_for")]);
        assert!(plan.is_empty());
        assert!(plan.statements(10).is_empty());
    }
}

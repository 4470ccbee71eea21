//! `COMMUNICATION` edges summarized per ordered entity pair.

use std::collections::BTreeMap;

use serde::Deserialize;
use serde_json::json;

use super::{Pass, INTERACTS_WITH_EDGE};
use crate::graph::Statement;
use crate::models::PassReport;

/// One `COMMUNICATION` edge.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct MessageEdge {
    pub source: String,
    pub target: String,
    pub timestamp: Option<String>,
}

/// An `INTERACTS_WITH` edge, stored or planned.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct Interaction {
    pub source: String,
    pub target: String,
    pub count: u64,
    pub first_timestamp: Option<String>,
    pub last_timestamp: Option<String>,
}

#[derive(Debug, Default)]
pub struct AggregatePlan {
    replace: bool,
    removed: usize,
    interactions: Vec<Interaction>,
}

/// Counts messages per (sender, receiver) with the first and last
/// timestamp, ordered by pair.
pub fn summarize(edges: &[MessageEdge]) -> Vec<Interaction> {
    let mut pairs: BTreeMap<(&str, &str), Interaction> = BTreeMap::new();
    for edge in edges {
        let entry = pairs
            .entry((edge.source.as_str(), edge.target.as_str()))
            .or_insert_with(|| Interaction {
                source: edge.source.clone(),
                target: edge.target.clone(),
                count: 0,
                first_timestamp: None,
                last_timestamp: None,
            });
        entry.count += 1;
        if let Some(ts) = &edge.timestamp {
            if entry.first_timestamp.as_ref().map_or(true, |first| ts < first) {
                entry.first_timestamp = Some(ts.clone());
            }
            if entry.last_timestamp.as_ref().map_or(true, |last| ts > last) {
                entry.last_timestamp = Some(ts.clone());
            }
        }
    }
    pairs.into_values().collect()
}

/// Replaces the stored `INTERACTS_WITH` edges unless they already match.
pub fn plan(edges: &[MessageEdge], mut existing: Vec<Interaction>) -> AggregatePlan {
    let interactions = summarize(edges);
    existing.sort_by(|a, b| (&a.source, &a.target).cmp(&(&b.source, &b.target)));
    if existing == interactions {
        return AggregatePlan::default();
    }
    AggregatePlan {
        replace: true,
        removed: existing.len(),
        interactions,
    }
}

impl AggregatePlan {
    pub fn is_empty(&self) -> bool {
        !self.replace
    }

    pub fn interactions(&self) -> &[Interaction] {
        &self.interactions
    }

    pub fn report(&self) -> PassReport {
        PassReport {
            created: self.interactions.len(),
            deleted: self.removed,
            ..PassReport::new(Pass::AggregateInteractions.name())
        }
    }

    pub fn statements(&self, batch_size: usize) -> Vec<Statement> {
        if !self.replace {
            return Vec::new();
        }
        let mut statements = vec![Statement::new(format!(
            "MATCH ()-[i:{INTERACTS_WITH_EDGE}]->() DELETE i"
        ))];

        let create = format!(
            "UNWIND $rows AS row \
             MATCH (a:Entity {{id: row.source}}) \
             MATCH (b:Entity {{id: row.target}}) \
             CREATE (a)-[:{INTERACTS_WITH_EDGE} {{count: row.count, \
             first_timestamp: row.first_timestamp, last_timestamp: row.last_timestamp}}]->(b)"
        );
        statements.extend(self.interactions.chunks(batch_size.max(1)).map(|chunk| {
            let rows: Vec<_> = chunk
                .iter()
                .map(|i| {
                    json!({
                        "source": i.source,
                        "target": i.target,
                        "count": i.count,
                        "first_timestamp": i.first_timestamp,
                        "last_timestamp": i.last_timestamp,
                    })
                })
                .collect();
            Statement::new(create.clone()).param("rows", rows)
        }));
        statements
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn message(source: &str, target: &str, ts: &str) -> MessageEdge {
        MessageEdge {
            source: source.to_string(),
            target: target.to_string(),
            timestamp: Some(ts.to_string()),
        }
    }

    fn sample() -> Vec<MessageEdge> {
        vec![
            message("Mako", "Remora", "2040-10-03 09:00:00"),
            message("Mako", "Remora", "2040-10-01 08:00:00"),
            message("Remora", "Mako", "2040-10-02 12:30:00"),
            message("Mako", "Remora", "2040-10-02 07:15:00"),
        ]
    }

    #[test]
    fn test_summarize_counts_and_bounds() {
        let interactions = summarize(&sample());
        assert_eq!(interactions.len(), 2);
        assert_eq!(interactions[0].source, "Mako");
        assert_eq!(interactions[0].count, 3);
        assert_eq!(
            interactions[0].first_timestamp.as_deref(),
            Some("2040-10-01 08:00:00")
        );
        assert_eq!(
            interactions[0].last_timestamp.as_deref(),
            Some("2040-10-03 09:00:00")
        );
        assert_eq!(interactions[1].count, 1);
    }

    #[test]
    fn test_matching_state_is_noop() {
        let existing = summarize(&sample()).into_iter().rev().collect();
        let plan = plan(&sample(), existing);
        assert!(plan.is_empty());
        assert!(plan.statements(10).is_empty());
    }

    #[test]
    fn test_stale_state_is_replaced() {
        let mut existing = summarize(&sample());
        existing[0].count = 1;
        let plan = plan(&sample(), existing);
        assert!(!plan.is_empty());
        assert_eq!(plan.report().deleted, 2);
        assert_eq!(plan.report().created, 2);
        let statements = plan.statements(1);
        assert_eq!(statements.len(), 3);
        assert!(statements[0].cypher.starts_with("MATCH ()-[i:INTERACTS_WITH]"));
    }
}

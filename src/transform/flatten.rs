//! Communication events to direct `COMMUNICATION` edges.

use std::collections::HashSet;

use serde::Deserialize;
use serde_json::{json, Value as JsonValue};

use super::{Pass, COMMUNICATION_EDGE};
use crate::graph::Statement;
use crate::models::PassReport;

/// One sender/receiver pair of a communication event.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct CommunicationRow {
    pub event_id: String,
    pub source: String,
    pub target: String,
    pub timestamp: Option<String>,
    pub content: Option<String>,
}

/// A `COMMUNICATION` edge already in the graph.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Deserialize)]
pub struct FlattenedKey {
    pub event_id: String,
    pub source: String,
    pub target: String,
}

#[derive(Debug, Default)]
pub struct FlattenPlan {
    rows: Vec<CommunicationRow>,
}

/// One edge per (event, sender, receiver) that is not already flattened.
pub fn plan(events: Vec<CommunicationRow>, existing: &HashSet<FlattenedKey>) -> FlattenPlan {
    let mut seen = HashSet::new();
    let rows = events
        .into_iter()
        .filter(|row| {
            let key = FlattenedKey {
                event_id: row.event_id.clone(),
                source: row.source.clone(),
                target: row.target.clone(),
            };
            !existing.contains(&key) && seen.insert(key)
        })
        .collect();
    FlattenPlan { rows }
}

impl FlattenPlan {
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn report(&self) -> PassReport {
        PassReport {
            created: self.rows.len(),
            ..PassReport::new(Pass::FlattenCommunications.name())
        }
    }

    pub fn statements(&self, batch_size: usize) -> Vec<Statement> {
        let cypher = format!(
            "UNWIND $rows AS row \
             MATCH (a:Entity {{id: row.source}}) \
             MATCH (b:Entity {{id: row.target}}) \
             MERGE (a)-[c:{COMMUNICATION_EDGE} {{event_id: row.event_id}}]->(b) \
             SET c.timestamp = row.timestamp, c.content = row.content"
        );
        self.rows
            .chunks(batch_size.max(1))
            .map(|chunk| {
                let rows: Vec<JsonValue> = chunk
                    .iter()
                    .map(|row| {
                        json!({
                            "event_id": row.event_id,
                            "source": row.source,
                            "target": row.target,
                            "timestamp": row.timestamp,
                            "content": row.content,
                        })
                    })
                    .collect();
                Statement::new(cypher.clone()).param("rows", rows)
            })
            .collect()
    }
}

//! Self-loops and provenance edges made redundant by flattening.

use std::collections::{BTreeSet, HashSet};

use serde::Deserialize;

use super::{Pass, DERIVED_EDGES};
use crate::graph::Statement;
use crate::models::PassReport;

/// A `sent` or `received` edge and the communication event it touches.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct ProvenanceEdge {
    pub rel_id: String,
    pub event_id: String,
}

/// An edge whose source and target are the same node.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct SelfLoop {
    pub rel_id: String,
    #[serde(rename = "type")]
    pub rel_type: String,
}

#[derive(Debug, Default)]
pub struct RedundantPlan {
    delete: BTreeSet<String>,
}

/// Deletes every dataset self-loop, and every provenance edge of an event
/// that already has a `COMMUNICATION` edge.
///
/// Derived self-loops stay: a `COMMUNICATION` loop is a message someone
/// sent to themselves, and it is the only copy once provenance goes.
pub fn plan(
    self_loops: Vec<SelfLoop>,
    provenance: Vec<ProvenanceEdge>,
    flattened_events: &HashSet<String>,
) -> RedundantPlan {
    let mut delete: BTreeSet<String> = self_loops
        .into_iter()
        .filter(|edge| !DERIVED_EDGES.contains(&edge.rel_type.as_str()))
        .map(|edge| edge.rel_id)
        .collect();
    delete.extend(
        provenance
            .into_iter()
            .filter(|edge| flattened_events.contains(&edge.event_id))
            .map(|edge| edge.rel_id),
    );
    RedundantPlan { delete }
}

impl RedundantPlan {
    pub fn is_empty(&self) -> bool {
        self.delete.is_empty()
    }

    pub fn report(&self) -> PassReport {
        PassReport {
            deleted: self.delete.len(),
            ..PassReport::new(Pass::RemoveRedundantEdges.name())
        }
    }

    pub fn statements(&self, batch_size: usize) -> Vec<Statement> {
        let ids: Vec<&String> = self.delete.iter().collect();
        ids.chunks(batch_size.max(1))
            .map(|chunk| {
                let chunk: Vec<String> = chunk.iter().map(|id| id.to_string()).collect();
                Statement::new(
                    "UNWIND $ids AS id \
                     MATCH ()-[r]->() WHERE elementId(r) = id \
                     DELETE r",
                )
                .param("ids", chunk)
            })
            .collect()
    }
}

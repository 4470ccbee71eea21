//! Graph rewrite planning.
//!
//! Each pass takes rows already read from the database, decides in memory
//! what to write, and produces a batch of UNWIND statements that the
//! caller applies atomically. A pass run against an already transformed
//! graph plans nothing.
//!
//! Passes, in pipeline order:
//!
//! 1. [`flatten`] - Communication events become `COMMUNICATION` edges
//! 2. [`combine`] - Parallel edges of one type merge into one with a `count`
//! 3. [`redundant`] - Dataset self-loops and already flattened provenance edges go
//! 4. [`collapse`] - Relationship nodes become `RELATIONSHIP` edges
//! 5. [`aggregate`] - `COMMUNICATION` edges summarized as `INTERACTS_WITH`

pub mod aggregate;
pub mod collapse;
pub mod combine;
pub mod flatten;
pub mod redundant;

use serde::Serialize;

pub const COMMUNICATION_EDGE: &str = "COMMUNICATION";
pub const RELATIONSHIP_EDGE: &str = "RELATIONSHIP";
pub const INTERACTS_WITH_EDGE: &str = "INTERACTS_WITH";
pub const MEMBER_OF_EDGE: &str = "MEMBER_OF";

/// Edge types written by the pipeline or by grouping.
pub const DERIVED_EDGES: [&str; 4] = [
    COMMUNICATION_EDGE,
    RELATIONSHIP_EDGE,
    INTERACTS_WITH_EDGE,
    MEMBER_OF_EDGE,
];

/// The five passes, in the order the pipeline runs them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Pass {
    FlattenCommunications,
    CombineLinks,
    RemoveRedundantEdges,
    CollapseRelationships,
    AggregateInteractions,
}

impl Pass {
    pub const ALL: [Pass; 5] = [
        Pass::FlattenCommunications,
        Pass::CombineLinks,
        Pass::RemoveRedundantEdges,
        Pass::CollapseRelationships,
        Pass::AggregateInteractions,
    ];

    pub fn name(self) -> &'static str {
        match self {
            Pass::FlattenCommunications => "flatten_communications",
            Pass::CombineLinks => "combine_links",
            Pass::RemoveRedundantEdges => "remove_redundant_edges",
            Pass::CollapseRelationships => "collapse_relationships",
            Pass::AggregateInteractions => "aggregate_interactions",
        }
    }
}

impl std::fmt::Display for Pass {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

//! Database overview counts.

use serde::Serialize;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NodeLabelCount {
    pub label: String,
    pub sub_type: Option<String>,
    pub count: u64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EdgeTypeCount {
    #[serde(rename = "type")]
    pub edge_type: String,
    pub count: u64,
}

/// Node counts by label and sub-type, edge counts by type.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct GraphSummary {
    pub total_nodes: u64,
    pub total_edges: u64,
    pub nodes: Vec<NodeLabelCount>,
    pub edges: Vec<EdgeTypeCount>,
}

impl GraphSummary {
    pub fn new(nodes: Vec<NodeLabelCount>, edges: Vec<EdgeTypeCount>) -> Self {
        Self {
            total_nodes: nodes.iter().map(|n| n.count).sum(),
            total_edges: edges.iter().map(|e| e.count).sum(),
            nodes,
            edges,
        }
    }
}

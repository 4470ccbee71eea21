//! Outcome reports for loading and transformation runs.

use serde::{Deserialize, Serialize};

/// Counts from writing a dataset into the database.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImportSummary {
    pub nodes: usize,
    pub edges: usize,
    /// Edges dropped because an endpoint id is not a known node.
    pub skipped_edges: usize,
}

/// What one transformation pass wrote.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PassReport {
    pub pass: String,
    pub created: usize,
    pub deleted: usize,
}

impl PassReport {
    pub fn new(pass: &str) -> Self {
        Self {
            pass: pass.to_string(),
            ..Default::default()
        }
    }

    /// Whether the pass found nothing to do.
    pub fn is_noop(&self) -> bool {
        self.created == 0 && self.deleted == 0
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PipelineReport {
    pub passes: Vec<PassReport>,
}

/// Result of a full clear, load and transform run.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LoadReport {
    pub import: ImportSummary,
    pub pipeline: Option<PipelineReport>,
}

//! Whole-graph views for the front end.

use crate::context::Context;
use crate::di::FromContext;
use crate::error::AppError;
use crate::models::{GraphData, GraphSummary};
use crate::repositories::GraphRepository;

/// Service for reading the graph as node-link data.
#[derive(FromContext, Clone)]
pub struct GraphService {
    graph_repo: GraphRepository,
}

impl GraphService {
    /// The full graph, or only entities and their derived links when
    /// `aggregated` is set.
    pub async fn read_graph(&self, aggregated: bool) -> Result<GraphData, AppError> {
        let graph = if aggregated {
            self.graph_repo.aggregated_graph().await?
        } else {
            self.graph_repo.full_graph().await?
        };
        if graph.is_empty() {
            return Err(AppError::EmptyDatabase);
        }
        tracing::debug!(
            nodes = graph.nodes.len(),
            links = graph.links.len(),
            aggregated,
            "Graph read"
        );
        Ok(graph)
    }

    pub async fn summary(&self) -> Result<GraphSummary, AppError> {
        self.graph_repo.summary().await
    }

    pub async fn count_nodes(&self) -> Result<u64, AppError> {
        self.graph_repo.count_nodes().await
    }
}

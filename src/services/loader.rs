//! Dataset loading into Neo4j.

use std::fs::File;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use serde_json::Value as JsonValue;

use crate::config::Config;
use crate::context::Context;
use crate::dataset::{
    parse_airport_edges, parse_airport_nodes, read_json, AirportDataset, ImportPlan,
    NodeLinkGraph,
};
use crate::di::FromContext;
use crate::error::AppError;
use crate::graph::Statement;
use crate::models::ImportSummary;
use crate::repositories::{GraphRepository, CLEAR_ALL};

/// Service for writing dataset files into the database.
#[derive(FromContext, Clone)]
pub struct LoaderService {
    graph_repo: GraphRepository,
    config: Arc<Config>,
}

impl LoaderService {
    pub async fn clear_database(&self) -> Result<(), AppError> {
        tracing::info!("Clearing database");
        self.graph_repo.clear().await
    }

    /// Loads `MC3_graph.json`, optionally replacing the current content.
    pub async fn load_graph_json(&self, clear: bool) -> Result<ImportSummary, AppError> {
        let path = self.config.data.graph_json_path();
        tracing::info!(path = %path.display(), clear, "Loading graph dataset");
        let graph = NodeLinkGraph::load(&path).await?;
        self.import(&graph, clear).await
    }

    /// Loads the airport CSV files as `Airport` nodes and `CONNECTED_TO` edges.
    pub async fn load_airports(&self, clear: bool) -> Result<ImportSummary, AppError> {
        let nodes_path = self.config.data.nodes_csv_path();
        let edges_path = self.config.data.edges_csv_path();
        tracing::info!(
            nodes = %nodes_path.display(),
            edges = %edges_path.display(),
            clear,
            "Loading airport dataset"
        );

        let dataset = tokio::task::spawn_blocking(move || read_airports(nodes_path, edges_path))
            .await
            .map_err(|e| AppError::Internal(format!("CSV reader task failed: {}", e)))??;
        self.import(&dataset.into_graph(), clear).await
    }

    /// The dataset schema document, returned as-is.
    pub async fn graph_schema(&self) -> Result<JsonValue, AppError> {
        read_json(&self.config.data.schema_json_path()).await
    }

    /// Writes the dataset in one transaction, clearing first when asked.
    async fn import(&self, graph: &NodeLinkGraph, clear: bool) -> Result<ImportSummary, AppError> {
        let plan = ImportPlan::from_graph(graph);
        let summary = plan.summary();

        let mut statements = Vec::new();
        if clear {
            statements.push(Statement::new(CLEAR_ALL));
        }
        statements.extend(plan.statements(self.config.data.effective_batch_size()));
        self.graph_repo.apply(statements).await?;

        if summary.skipped_edges > 0 {
            tracing::warn!(
                skipped = summary.skipped_edges,
                "Edges with unknown endpoints were skipped"
            );
        }
        tracing::info!(nodes = summary.nodes, edges = summary.edges, "Dataset imported");
        Ok(summary)
    }
}

fn read_airports(nodes_path: PathBuf, edges_path: PathBuf) -> Result<AirportDataset, AppError> {
    let airports = parse_airport_nodes(open(&nodes_path)?)
        .map_err(|e| AppError::dataset(&nodes_path, e))?;
    let connections = parse_airport_edges(open(&edges_path)?)
        .map_err(|e| AppError::dataset(&edges_path, e))?;
    Ok(AirportDataset {
        airports,
        connections,
    })
}

fn open(path: &Path) -> Result<File, AppError> {
    File::open(path).map_err(|e| AppError::dataset(path, e))
}

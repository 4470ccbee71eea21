//! Semantic similarity search over message content.

use std::sync::Arc;

use crate::config::Config;
use crate::context::{AppEmbedder, Context};
use crate::dataset::{communication_messages, NodeLinkGraph};
use crate::di::FromContext;
use crate::error::AppError;
use crate::models::ScoredMessage;
use crate::search::{IndexHandle, SearchOptions, SimilarityIndex};

#[derive(FromContext, Clone)]
pub struct SearchService {
    index: IndexHandle,
    embedder: AppEmbedder,
    config: Arc<Config>,
}

impl SearchService {
    /// Embeds every communication event of the dataset file and installs
    /// the resulting index. Returns the number of indexed messages.
    pub async fn build_index(&self) -> Result<usize, AppError> {
        let path = self.config.data.graph_json_path();
        let graph = NodeLinkGraph::load(&path).await?;
        let messages = communication_messages(&graph, &self.config.edges);
        tracing::info!(messages = messages.len(), "Building similarity index");

        let embedder = self.embedder.clone();
        let index = tokio::task::spawn_blocking(move || {
            SimilarityIndex::build(messages, embedder.as_ref())
        })
        .await
        .map_err(|e| AppError::Internal(format!("index build task failed: {}", e)))??;

        let count = index.len();
        self.index.set(index);
        Ok(count)
    }

    pub fn is_ready(&self) -> bool {
        self.index.is_ready()
    }

    /// Messages most similar to `query`.
    pub async fn similarity_search(
        &self,
        query: &str,
        options: SearchOptions,
    ) -> Result<Vec<ScoredMessage>, AppError> {
        let query = query.trim();
        if query.is_empty() {
            return Err(AppError::Validation("query must not be empty".to_string()));
        }
        if options.top_k == 0 {
            return Err(AppError::Validation("top_k must be positive".to_string()));
        }
        if let Some(min) = options.min_score {
            if !(-1.0..=1.0).contains(&min) {
                return Err(AppError::Validation(
                    "min_score must lie in [-1, 1]".to_string(),
                ));
            }
        }
        if !self.index.is_ready() {
            return Err(AppError::IndexNotReady);
        }

        let embedder = self.embedder.clone();
        let text = query.to_string();
        let vector = tokio::task::spawn_blocking(move || embedder.embed(&text))
            .await
            .map_err(|e| AppError::Internal(format!("embedding task failed: {}", e)))??;

        let results = self
            .index
            .with(|index| index.search(&vector, &options))
            .ok_or(AppError::IndexNotReady)?;
        tracing::debug!(query, results = results.len(), "Similarity search");
        Ok(results)
    }
}

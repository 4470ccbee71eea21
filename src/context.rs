//! Application context providing dependency injection root.

use std::sync::Arc;

use chrono::{DateTime, Utc};

use crate::config::Config;
use crate::di::Context as ContextDerive;
use crate::error::AppError;
use crate::graph::backends::neo4j::Neo4jClient;
use crate::jobs::JobRegistry;
use crate::search::{create_embedder, HashingEmbedder, IndexHandle};

pub use crate::graph::AppGraph;
pub use crate::search::AppEmbedder;

/// Root application context for dependency injection.
///
/// The Context holds all shared dependencies and uses `#[derive(Context)]`
/// to generate `FromRef` implementations for each field, enabling
/// compile-time dependency resolution.
#[derive(ContextDerive, Clone)]
pub struct Context {
    /// Graph database handle (pooled Neo4j client in production).
    pub graph: AppGraph,
    /// Application configuration.
    pub config: Arc<Config>,
    /// Embedding provider for similarity search.
    pub embedder: AppEmbedder,
    /// Similarity index, filled once the startup build completes.
    pub index: IndexHandle,
    /// Background loading jobs.
    pub jobs: JobRegistry,
    #[context(skip)]
    pub started_at: DateTime<Utc>,
}

impl Context {
    /// Creates a new context with the given dependencies.
    pub fn new(graph: AppGraph, config: Config, embedder: AppEmbedder) -> Self {
        Self {
            graph,
            config: Arc::new(config),
            embedder,
            index: IndexHandle::default(),
            jobs: JobRegistry::new(),
            started_at: Utc::now(),
        }
    }

    /// Connects to Neo4j and loads the configured embedder.
    ///
    /// Loading a fastembed model can download weights, so it runs on a
    /// blocking thread.
    pub async fn from_config(config: Config) -> Result<Self, AppError> {
        let client = Neo4jClient::connect(&config.neo4j).await?;
        let embedding = config.embedding.clone();
        let embedder = tokio::task::spawn_blocking(move || create_embedder(&embedding, false))
            .await
            .map_err(|e| AppError::Internal(format!("embedder task failed: {}", e)))??;
        Ok(Self::new(Arc::new(client), config, embedder))
    }

    /// Connects to Neo4j for commands that never embed text.
    ///
    /// Uses the hashing embedder so no model is loaded.
    pub async fn for_batch(config: Config) -> Result<Self, AppError> {
        let client = Neo4jClient::connect(&config.neo4j).await?;
        let embedder = Arc::new(HashingEmbedder::new(config.embedding.dimensions));
        Ok(Self::new(Arc::new(client), config, embedder))
    }

    /// Resolve a dependency from the context.
    ///
    /// ```ignore
    /// let service = ctx.resolve::<TransformService>();
    /// ```
    pub fn resolve<T: crate::di::FromRef<Self>>(&self) -> T {
        T::from_ref(self)
    }
}

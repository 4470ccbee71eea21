//! Embedding providers.

use std::collections::hash_map::DefaultHasher;
use std::hash::{Hash, Hasher};
use std::sync::Arc;

use dashmap::DashMap;
use fastembed::{EmbeddingModel, InitOptions, TextEmbedding};

use crate::config::EmbeddingConfig;
use crate::error::AppError;

/// Turns text into fixed-size vectors.
///
/// Implementations are blocking; async callers go through
/// `tokio::task::spawn_blocking`.
pub trait Embedder: Send + Sync {
    fn dimensions(&self) -> usize;

    fn embed_batch(&self, texts: &[String]) -> Result<Vec<Vec<f32>>, AppError>;

    fn embed(&self, text: &str) -> Result<Vec<f32>, AppError> {
        self.embed_batch(&[text.to_string()])?
            .pop()
            .ok_or_else(|| AppError::Embedding("model returned no vector".to_string()))
    }
}

/// Shared handle to the configured embedder.
pub type AppEmbedder = Arc<dyn Embedder>;

/// Builds the embedder named by `config.provider`.
///
/// `show_progress` prints model download progress (used by the warmup
/// command).
pub fn create_embedder(
    config: &EmbeddingConfig,
    show_progress: bool,
) -> Result<AppEmbedder, AppError> {
    match config.provider.as_str() {
        "fastembed" => Ok(Arc::new(FastEmbedder::new(config, show_progress)?)),
        "hashing" => Ok(Arc::new(HashingEmbedder::new(config.dimensions))),
        other => Err(AppError::Validation(format!(
            "unknown embedding provider '{}', expected 'fastembed' or 'hashing'",
            other
        ))),
    }
}

/// ONNX sentence-embedding model run through fastembed.
///
/// Query embeddings are cached; the index itself is embedded once.
pub struct FastEmbedder {
    model: TextEmbedding,
    dimensions: usize,
    cache: DashMap<String, Vec<f32>>,
}

impl FastEmbedder {
    pub fn new(config: &EmbeddingConfig, show_progress: bool) -> Result<Self, AppError> {
        let (model, dimensions) = resolve_model(&config.model)?;
        let mut options = InitOptions::new(model).with_show_download_progress(show_progress);
        if let Some(dir) = &config.cache_dir {
            options = options.with_cache_dir(dir.clone());
        }

        tracing::info!(model = %config.model, dimensions, "Loading embedding model");
        let model = TextEmbedding::try_new(options)
            .map_err(|e| AppError::Embedding(format!("failed to load model: {}", e)))?;

        Ok(Self {
            model,
            dimensions,
            cache: DashMap::new(),
        })
    }
}

fn resolve_model(name: &str) -> Result<(EmbeddingModel, usize), AppError> {
    match name {
        "sentence-transformers/all-MiniLM-L6-v2" | "all-MiniLM-L6-v2" => {
            Ok((EmbeddingModel::AllMiniLML6V2, 384))
        }
        "sentence-transformers/all-MiniLM-L12-v2" | "all-MiniLM-L12-v2" => {
            Ok((EmbeddingModel::AllMiniLML12V2, 384))
        }
        "BAAI/bge-small-en-v1.5" => Ok((EmbeddingModel::BGESmallENV15, 384)),
        "BAAI/bge-base-en-v1.5" => Ok((EmbeddingModel::BGEBaseENV15, 768)),
        other => Err(AppError::Validation(format!(
            "unsupported embedding model '{}'",
            other
        ))),
    }
}

impl Embedder for FastEmbedder {
    fn dimensions(&self) -> usize {
        self.dimensions
    }

    fn embed_batch(&self, texts: &[String]) -> Result<Vec<Vec<f32>>, AppError> {
        self.model
            .embed(texts.to_vec(), None)
            .map_err(|e| AppError::Embedding(e.to_string()))
    }

    fn embed(&self, text: &str) -> Result<Vec<f32>, AppError> {
        if let Some(cached) = self.cache.get(text) {
            return Ok(cached.clone());
        }
        let vector = self
            .embed_batch(&[text.to_string()])?
            .pop()
            .ok_or_else(|| AppError::Embedding("model returned no vector".to_string()))?;
        self.cache.insert(text.to_string(), vector.clone());
        Ok(vector)
    }
}

/// Bag-of-words feature hashing.
///
/// Needs no model files, so it serves offline deployments and tests. Texts
/// sharing words get similar vectors; it carries no semantics beyond that.
#[derive(Debug, Clone)]
pub struct HashingEmbedder {
    dimensions: usize,
}

impl HashingEmbedder {
    pub fn new(dimensions: usize) -> Self {
        Self {
            dimensions: dimensions.max(1),
        }
    }

    fn embed_one(&self, text: &str) -> Vec<f32> {
        let mut vector = vec![0.0f32; self.dimensions];
        let lowered = text.to_lowercase();
        for token in lowered
            .split(|c: char| !c.is_alphanumeric())
            .filter(|t| !t.is_empty())
        {
            let mut hasher = DefaultHasher::new();
            token.hash(&mut hasher);
            let hash = hasher.finish();
            let slot = (hash % self.dimensions as u64) as usize;
            let sign = if hash >> 63 == 0 { 1.0 } else { -1.0 };
            vector[slot] += sign;
        }
        vector
    }
}

impl Embedder for HashingEmbedder {
    fn dimensions(&self) -> usize {
        self.dimensions
    }

    fn embed_batch(&self, texts: &[String]) -> Result<Vec<Vec<f32>>, AppError> {
        Ok(texts.iter().map(|t| self.embed_one(t)).collect())
    }
}

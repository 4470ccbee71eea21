//! In-memory cosine similarity index.

use std::cmp::Ordering;
use std::sync::Arc;

use parking_lot::RwLock;

use super::embedder::Embedder;
use crate::error::AppError;
use crate::models::{MessageItem, ScoredMessage};

/// Default number of results for a similarity query.
pub const DEFAULT_TOP_K: usize = 50;

#[derive(Debug, Clone, PartialEq)]
pub struct SearchOptions {
    pub top_k: usize,
    /// Re-sort the selected results by timestamp instead of score.
    pub order_by_time: bool,
    pub min_score: Option<f32>,
}

impl Default for SearchOptions {
    fn default() -> Self {
        Self {
            top_k: DEFAULT_TOP_K,
            order_by_time: false,
            min_score: None,
        }
    }
}

/// Messages and their L2-normalized embeddings, one row per message.
pub struct SimilarityIndex {
    messages: Vec<MessageItem>,
    matrix: Vec<f32>,
    dimensions: usize,
}

impl SimilarityIndex {
    /// Embeds the content of every message that has any.
    ///
    /// Blocking: run it on a blocking thread.
    pub fn build(messages: Vec<MessageItem>, embedder: &dyn Embedder) -> Result<Self, AppError> {
        let messages: Vec<MessageItem> = messages
            .into_iter()
            .filter(|m| m.content.as_deref().is_some_and(|c| !c.trim().is_empty()))
            .collect();
        let texts: Vec<String> = messages
            .iter()
            .map(|m| m.content.clone().unwrap_or_default())
            .collect();

        let dimensions = embedder.dimensions();
        let vectors = if texts.is_empty() {
            Vec::new()
        } else {
            embedder.embed_batch(&texts)?
        };
        if vectors.len() != messages.len() {
            return Err(AppError::Embedding(format!(
                "expected {} vectors, got {}",
                messages.len(),
                vectors.len()
            )));
        }

        let mut matrix = Vec::with_capacity(messages.len() * dimensions);
        for mut vector in vectors {
            if vector.len() != dimensions {
                return Err(AppError::Embedding(format!(
                    "expected {} dimensions, got {}",
                    dimensions,
                    vector.len()
                )));
            }
            normalize(&mut vector);
            matrix.extend(vector);
        }

        tracing::info!(messages = messages.len(), dimensions, "Similarity index built");
        Ok(Self {
            messages,
            matrix,
            dimensions,
        })
    }

    pub fn len(&self) -> usize {
        self.messages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }

    pub fn dimensions(&self) -> usize {
        self.dimensions
    }

    /// Ranks messages by cosine similarity to `query`.
    pub fn search(&self, query: &[f32], options: &SearchOptions) -> Vec<ScoredMessage> {
        if query.len() != self.dimensions || options.top_k == 0 {
            return Vec::new();
        }
        let mut query = query.to_vec();
        normalize(&mut query);

        let mut scored: Vec<(usize, f32)> = self
            .matrix
            .chunks_exact(self.dimensions)
            .map(|row| row.iter().zip(&query).map(|(a, b)| a * b).sum::<f32>())
            .map(|score| score.clamp(-1.0, 1.0))
            .enumerate()
            .filter(|(_, score)| options.min_score.map_or(true, |min| *score >= min))
            .collect();

        scored.sort_by(|a, b| b.1.partial_cmp(&a.1).unwrap_or(Ordering::Equal));
        scored.truncate(options.top_k);

        let mut results: Vec<ScoredMessage> = scored
            .into_iter()
            .map(|(i, score)| ScoredMessage {
                message: self.messages[i].clone(),
                score,
            })
            .collect();

        if options.order_by_time {
            results.sort_by(|a, b| a.message.timestamp.cmp(&b.message.timestamp));
        }
        results
    }
}

/// Shared slot for the index, empty until the startup build finishes.
#[derive(Clone, Default)]
pub struct IndexHandle {
    inner: Arc<RwLock<Option<SimilarityIndex>>>,
}

impl IndexHandle {
    pub fn set(&self, index: SimilarityIndex) {
        *self.inner.write() = Some(index);
    }

    pub fn is_ready(&self) -> bool {
        self.inner.read().is_some()
    }

    /// Number of indexed messages, if built.
    pub fn message_count(&self) -> Option<usize> {
        self.inner.read().as_ref().map(SimilarityIndex::len)
    }

    /// Runs `f` against the built index.
    pub fn with<R>(&self, f: impl FnOnce(&SimilarityIndex) -> R) -> Option<R> {
        self.inner.read().as_ref().map(f)
    }
}

fn normalize(vector: &mut [f32]) {
    let norm = vector.iter().map(|x| x * x).sum::<f32>().sqrt();
    if norm > 0.0 {
        vector.iter_mut().for_each(|x| *x /= norm);
    }
}

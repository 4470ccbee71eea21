//! Semantic similarity search over message content.
//!
//! - [`Embedder`] - text to vector (fastembed model or feature hashing)
//! - [`SimilarityIndex`] - messages plus a normalized embedding matrix

mod embedder;
mod index;

pub use embedder::{create_embedder, AppEmbedder, Embedder, FastEmbedder, HashingEmbedder};
pub use index::{IndexHandle, SearchOptions, SimilarityIndex, DEFAULT_TOP_K};

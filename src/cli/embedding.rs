//! Embedding model management commands.

use clap::Subcommand;
use color_eyre::Result;

use crate::config::Config;
use crate::search::create_embedder;

/// Embedding model management subcommands.
#[derive(Subcommand)]
pub enum EmbeddingCommand {
    /// Pre-download the embedding model into the local cache
    Warmup,
}

impl EmbeddingCommand {
    /// Run the embedding subcommand.
    pub async fn run(&self) -> Result<()> {
        match self {
            EmbeddingCommand::Warmup => run_warmup().await,
        }
    }
}

/// Warm up the embedding model by downloading it to the cache.
async fn run_warmup() -> Result<()> {
    let config = Config::load()?;
    let embedding = config.embedding.clone();

    println!(
        "Warming up embedding model: {} ({})",
        embedding.model, embedding.provider
    );

    let embedder = tokio::task::spawn_blocking(move || create_embedder(&embedding, true)).await??;
    embedder.embed("warmup")?;

    let cache_dir = config
        .embedding
        .cache_dir
        .map(|p| p.display().to_string())
        .or_else(|| std::env::var("FASTEMBED_CACHE_DIR").ok())
        .unwrap_or_else(|| ".fastembed_cache".to_string());

    println!("Embedding model ready: {}", config.embedding.model);
    println!("Cache location: {}", cache_dir);

    Ok(())
}

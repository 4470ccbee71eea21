//! Configuration with layered resolution using figment.
//!
//! Resolution order (highest priority last):
//! 1. User config: `~/.config/commgraph/config.toml` (XDG) or platform config dir
//! 2. Project config: `.commgraph.toml`
//! 3. Environment variables: `COMMGRAPH_*` (`__` separates sections, so
//!    `COMMGRAPH_DATA__BATCH_SIZE` sets `data.batch_size`)
//! 4. Deployment variables `DB_HOST` / `DB_PASSWORD`
//!
//! Every section is optional; the defaults target a local Neo4j and the
//! dataset files in the working directory.
//!
//! ```toml
//! [neo4j]
//! host = "neo4j"
//! password = "secret"
//!
//! [data]
//! dir = "/srv/mc3"
//!
//! [embedding]
//! provider = "hashing"
//! ```

use std::ops::Deref;
use std::path::PathBuf;

use figment::{
    providers::{Env, Format, Toml},
    Figment,
};
use serde::Deserialize;

/// Boxed wrapper for figment::Error to reduce Result size on the stack.
#[derive(Debug)]
pub struct ConfigError(Box<figment::Error>);

impl Deref for ConfigError {
    type Target = figment::Error;

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl std::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        self.0.fmt(f)
    }
}

impl std::error::Error for ConfigError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        self.0.source()
    }
}

impl From<figment::Error> for ConfigError {
    fn from(err: figment::Error) -> Self {
        Self(Box::new(err))
    }
}

/// Root configuration structure.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Config {
    pub neo4j: Neo4jConfig,
    pub server: ServerConfig,
    pub data: DataConfig,
    pub edges: EdgeTypesConfig,
    pub embedding: EmbeddingConfig,
}

/// Neo4j connection settings.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct Neo4jConfig {
    /// Bolt URI, e.g. `bolt://localhost:7687`.
    pub uri: String,
    /// Host name only; when set it replaces `uri` with `bolt://<host>:7687`.
    pub host: Option<String>,
    pub user: String,
    pub password: String,
    pub max_connections: usize,
}

impl Default for Neo4jConfig {
    fn default() -> Self {
        Self {
            uri: "bolt://localhost:7687".to_string(),
            host: None,
            user: "neo4j".to_string(),
            password: String::new(),
            max_connections: 16,
        }
    }
}

impl Neo4jConfig {
    /// The bolt URI to connect to, honouring `host` when present.
    pub fn effective_uri(&self) -> String {
        match self.host.as_deref().filter(|h| !h.is_empty()) {
            Some(host) => format!("bolt://{}:7687", host),
            None => self.uri.clone(),
        }
    }
}

/// HTTP server bind address.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 8000,
        }
    }
}

/// Locations of the dataset files read at load time.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct DataConfig {
    /// Directory the file names below are resolved against.
    pub dir: PathBuf,
    pub graph_json: String,
    pub schema_json: String,
    pub nodes_csv: String,
    pub edges_csv: String,
    /// Rows per UNWIND statement when writing to Neo4j.
    pub batch_size: usize,
}

impl Default for DataConfig {
    fn default() -> Self {
        Self {
            dir: PathBuf::from("."),
            graph_json: "MC3_graph.json".to_string(),
            schema_json: "MC3_schema.json".to_string(),
            nodes_csv: "nodes.csv".to_string(),
            edges_csv: "edges.csv".to_string(),
            batch_size: 500,
        }
    }
}

impl DataConfig {
    pub fn graph_json_path(&self) -> PathBuf {
        self.dir.join(&self.graph_json)
    }

    pub fn schema_json_path(&self) -> PathBuf {
        self.dir.join(&self.schema_json)
    }

    pub fn nodes_csv_path(&self) -> PathBuf {
        self.dir.join(&self.nodes_csv)
    }

    pub fn edges_csv_path(&self) -> PathBuf {
        self.dir.join(&self.edges_csv)
    }

    /// Batch size clamped to at least one row.
    pub fn effective_batch_size(&self) -> usize {
        self.batch_size.max(1)
    }
}

/// Relationship type names used by the dataset for message provenance.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct EdgeTypesConfig {
    /// Sender -> communication event.
    pub sent: String,
    /// Communication event -> receiver.
    pub received: String,
    /// Communication event -> the event or relationship it supports.
    pub evidence: String,
}

impl Default for EdgeTypesConfig {
    fn default() -> Self {
        Self {
            sent: "sent".to_string(),
            received: "received".to_string(),
            evidence: "evidence_for".to_string(),
        }
    }
}

/// Embedding provider configuration.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct EmbeddingConfig {
    /// Embedding provider name: "fastembed" or "hashing".
    pub provider: String,
    /// Model identifier (e.g., "sentence-transformers/all-MiniLM-L6-v2").
    pub model: String,
    /// Embedding vector dimensions.
    pub dimensions: usize,
    /// Build the similarity index when the server starts.
    pub load_on_start: bool,
    /// Model cache directory (fastembed only).
    pub cache_dir: Option<PathBuf>,
}

impl Default for EmbeddingConfig {
    fn default() -> Self {
        Self {
            provider: "fastembed".to_string(),
            model: "sentence-transformers/all-MiniLM-L6-v2".to_string(),
            dimensions: 384,
            load_on_start: true,
            cache_dir: None,
        }
    }
}

impl Config {
    /// Load config with layered resolution (user → project → env).
    pub fn load() -> Result<Self, ConfigError> {
        Self::figment().extract().map_err(ConfigError::from)
    }

    /// The provider stack, exposed so tests can inspect resolution.
    pub fn figment() -> Figment {
        Figment::new()
            // Layer 1: User config (lowest priority)
            .merge(Toml::file(Self::user_config_path()))
            // Layer 2: Project config
            .merge(Toml::file(".commgraph.toml"))
            // Layer 3: Environment variables; keys contain single underscores
            .merge(Env::prefixed("COMMGRAPH_").split("__"))
            // Layer 4: Deployment variables shared with the database container
            .merge(Env::raw().only(&["DB_HOST", "DB_PASSWORD"]).map(|key| {
                if key == "DB_HOST" {
                    "neo4j.host".into()
                } else {
                    "neo4j.password".into()
                }
            }))
    }

    /// User config path: ~/.config/commgraph/config.toml (XDG) or platform config dir.
    fn user_config_path() -> PathBuf {
        if let Some(home) = dirs::home_dir() {
            let xdg_path = home.join(".config").join("commgraph").join("config.toml");
            if xdg_path.exists() {
                return xdg_path;
            }
        }
        dirs::config_dir()
            .map(|p| p.join("commgraph").join("config.toml"))
            .unwrap_or_default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use figment::providers::Serialized;

    #[test]
    fn test_defaults_without_any_source() {
        let config: Config = Figment::new().extract().unwrap();
        assert_eq!(config.neo4j.effective_uri(), "bolt://localhost:7687");
        assert_eq!(config.server.port, 8000);
        assert_eq!(config.edges.sent, "sent");
        assert_eq!(config.data.graph_json_path(), PathBuf::from("./MC3_graph.json"));
    }

    #[test]
    fn test_host_overrides_uri() {
        let config: Config = Figment::new()
            .merge(Serialized::default("neo4j.host", "db"))
            .merge(Serialized::default("neo4j.uri", "bolt://ignored:1234"))
            .extract()
            .unwrap();
        assert_eq!(config.neo4j.effective_uri(), "bolt://db:7687");
    }

    #[test]
    fn test_empty_host_is_ignored() {
        let neo4j = Neo4jConfig {
            host: Some(String::new()),
            ..Default::default()
        };
        assert_eq!(neo4j.effective_uri(), "bolt://localhost:7687");
    }

    #[test]
    fn test_env_sets_multi_word_keys() {
        figment::Jail::expect_with(|jail| {
            jail.set_env("COMMGRAPH_EMBEDDING__LOAD_ON_START", "false");
            jail.set_env("COMMGRAPH_DATA__BATCH_SIZE", "7");
            jail.set_env("COMMGRAPH_NEO4J__MAX_CONNECTIONS", "3");
            let config: Config = Config::figment().extract()?;
            assert!(!config.embedding.load_on_start);
            assert_eq!(config.data.batch_size, 7);
            assert_eq!(config.neo4j.max_connections, 3);
            Ok(())
        });
    }

    #[test]
    fn test_deployment_host_variable() {
        figment::Jail::expect_with(|jail| {
            jail.set_env("DB_HOST", "neo4j");
            let config: Config = Config::figment().extract()?;
            assert_eq!(config.neo4j.effective_uri(), "bolt://neo4j:7687");
            Ok(())
        });
    }

    #[test]
    fn test_toml_partial_sections() {
        let config: Config = Figment::new()
            .merge(Toml::string(
                r#"
                [data]
                dir = "/srv/mc3"
                batch_size = 0

                [embedding]
                provider = "hashing"
                "#,
            ))
            .extract()
            .unwrap();
        assert_eq!(config.data.nodes_csv_path(), PathBuf::from("/srv/mc3/nodes.csv"));
        assert_eq!(config.data.effective_batch_size(), 1);
        assert_eq!(config.embedding.provider, "hashing");
        assert_eq!(config.embedding.dimensions, 384);
    }
}

//! Node-link JSON graphs (`{"nodes": [...], "links": [...]}`).

use std::path::Path;

use serde::{Deserialize, Deserializer};
use serde_json::{Map, Value as JsonValue};

use crate::error::AppError;

#[derive(Debug, Clone, Default, Deserialize)]
pub struct NodeLinkGraph {
    #[serde(default)]
    pub directed: bool,
    #[serde(default)]
    pub multigraph: bool,
    #[serde(default)]
    pub nodes: Vec<DatasetNode>,
    #[serde(default, alias = "edges")]
    pub links: Vec<DatasetEdge>,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct DatasetNode {
    #[serde(deserialize_with = "id_text")]
    pub id: String,
    #[serde(flatten)]
    pub properties: Map<String, JsonValue>,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct DatasetEdge {
    #[serde(deserialize_with = "id_text")]
    pub source: String,
    #[serde(deserialize_with = "id_text")]
    pub target: String,
    #[serde(flatten)]
    pub properties: Map<String, JsonValue>,
}

impl NodeLinkGraph {
    pub fn from_slice(bytes: &[u8]) -> Result<Self, serde_json::Error> {
        serde_json::from_slice(bytes)
    }

    pub async fn load(path: &Path) -> Result<Self, AppError> {
        let bytes = tokio::fs::read(path)
            .await
            .map_err(|e| AppError::dataset(path, e))?;
        let graph = Self::from_slice(&bytes).map_err(|e| AppError::dataset(path, e))?;
        tracing::debug!(
            path = %path.display(),
            nodes = graph.nodes.len(),
            links = graph.links.len(),
            "Parsed node-link graph"
        );
        Ok(graph)
    }
}

impl DatasetNode {
    pub fn new(id: impl Into<String>, properties: Map<String, JsonValue>) -> Self {
        Self {
            id: id.into(),
            properties,
        }
    }

    /// The `type` property (`Entity`, `Event`, `Relationship`, ...).
    pub fn node_type(&self) -> Option<&str> {
        self.str_property("type")
    }

    pub fn sub_type(&self) -> Option<&str> {
        self.str_property("sub_type")
    }

    pub fn str_property(&self, key: &str) -> Option<&str> {
        self.properties.get(key).and_then(JsonValue::as_str)
    }
}

impl DatasetEdge {
    pub fn new(
        source: impl Into<String>,
        target: impl Into<String>,
        properties: Map<String, JsonValue>,
    ) -> Self {
        Self {
            source: source.into(),
            target: target.into(),
            properties,
        }
    }

    pub fn edge_type(&self) -> Option<&str> {
        self.properties.get("type").and_then(JsonValue::as_str)
    }
}

/// Accepts ids written either as strings or as numbers.
fn id_text<'de, D: Deserializer<'de>>(deserializer: D) -> Result<String, D::Error> {
    match JsonValue::deserialize(deserializer)? {
        JsonValue::String(s) => Ok(s),
        JsonValue::Number(n) => Ok(n.to_string()),
        other => Err(serde::de::Error::custom(format!(
            "expected string or number id, got {}",
            other
        ))),
    }
}

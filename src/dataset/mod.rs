//! Dataset files: parsing and import planning.
//!
//! Everything here is pure; the loader service does the file I/O and hands
//! the resulting statements to the graph layer.

mod airports;
mod import;
mod messages;
mod node_link;
mod properties;

use std::path::Path;

use serde_json::Value as JsonValue;

use crate::error::AppError;

pub use airports::{
    parse_airport_edges, parse_airport_nodes, AirportDataset, AIRPORT_LABEL, CONNECTED_TO,
};
pub use import::{ImportPlan, DEFAULT_EDGE_TYPE, DEFAULT_NODE_LABEL};
pub use messages::{communication_messages, COMMUNICATION};
pub use node_link::{DatasetEdge, DatasetNode, NodeLinkGraph};
pub use properties::sanitize_properties;

/// Reads and parses a JSON document.
pub async fn read_json(path: &Path) -> Result<JsonValue, AppError> {
    let bytes = tokio::fs::read(path)
        .await
        .map_err(|e| AppError::dataset(path, e))?;
    serde_json::from_slice(&bytes).map_err(|e| AppError::dataset(path, e))
}

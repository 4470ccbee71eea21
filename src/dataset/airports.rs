//! Airport CSV files (`nodes.csv`, `edges.csv`).

use std::io::Read;

use serde_json::{Map, Number, Value as JsonValue};

use super::node_link::{DatasetEdge, DatasetNode, NodeLinkGraph};

pub const AIRPORT_LABEL: &str = "Airport";
pub const CONNECTED_TO: &str = "CONNECTED_TO";

/// Airports and the flights between them.
#[derive(Debug, Clone, Default)]
pub struct AirportDataset {
    pub airports: Vec<DatasetNode>,
    pub connections: Vec<DatasetEdge>,
}

impl AirportDataset {
    /// The dataset as a node-link graph of `Airport` / `CONNECTED_TO`.
    pub fn into_graph(self) -> NodeLinkGraph {
        NodeLinkGraph {
            directed: true,
            multigraph: false,
            nodes: self.airports,
            links: self.connections,
        }
    }
}

/// Reads `nodes.csv`: an `id` column plus arbitrary property columns.
pub fn parse_airport_nodes<R: Read>(reader: R) -> Result<Vec<DatasetNode>, csv::Error> {
    let mut reader = csv::Reader::from_reader(reader);
    let headers = reader.headers()?.clone();
    let mut airports = Vec::new();

    for record in reader.records() {
        let record = record?;
        let mut properties = Map::new();
        let mut id = None;
        for (header, field) in headers.iter().zip(record.iter()) {
            if header == "id" {
                id = Some(field.trim().to_string());
            } else if let Some(value) = parse_field(field) {
                properties.insert(header.to_string(), value);
            }
        }
        let Some(id) = id.filter(|id| !id.is_empty()) else {
            continue;
        };
        properties.insert("type".to_string(), JsonValue::from(AIRPORT_LABEL));
        airports.push(DatasetNode::new(id, properties));
    }

    Ok(airports)
}

/// Reads `edges.csv`: `source`, `target`, optional `distance` and extra
/// property columns.
pub fn parse_airport_edges<R: Read>(reader: R) -> Result<Vec<DatasetEdge>, csv::Error> {
    let mut reader = csv::Reader::from_reader(reader);
    let headers = reader.headers()?.clone();
    let mut connections = Vec::new();

    for record in reader.records() {
        let record = record?;
        let mut properties = Map::new();
        let (mut source, mut target) = (None, None);
        for (header, field) in headers.iter().zip(record.iter()) {
            match header {
                "source" => source = Some(field.trim().to_string()),
                "target" => target = Some(field.trim().to_string()),
                _ => {
                    if let Some(value) = parse_field(field) {
                        properties.insert(header.to_string(), value);
                    }
                }
            }
        }
        let (Some(source), Some(target)) = (source, target) else {
            continue;
        };
        properties.insert("type".to_string(), JsonValue::from(CONNECTED_TO));
        connections.push(DatasetEdge::new(source, target, properties));
    }

    Ok(connections)
}

/// Integers, then floats, then plain text. Empty fields are skipped.
fn parse_field(field: &str) -> Option<JsonValue> {
    let field = field.trim();
    if field.is_empty() {
        return None;
    }
    if let Ok(i) = field.parse::<i64>() {
        return Some(JsonValue::from(i));
    }
    if let Some(n) = field.parse::<f64>().ok().and_then(Number::from_f64) {
        return Some(JsonValue::Number(n));
    }
    Some(JsonValue::String(field.to_string()))
}

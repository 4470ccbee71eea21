//! Node-link graph payloads consumed by the front end.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value as JsonValue};

/// Keys a node or link owns itself; dataset properties with these names
/// are not repeated in the flattened property map.
const NODE_KEYS: &[&str] = &["id", "label", "type", "sub_type", "degree"];
const LINK_KEYS: &[&str] = &["source", "target", "type", "value", "timestamp"];

/// A node as drawn by the front end.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GraphNode {
    pub id: String,
    /// Display label; the dataset `label` or `name` when present, else the id.
    pub label: String,
    /// Node category (`Entity`, `Event`, `Relationship`, `Airport`).
    #[serde(rename = "type")]
    pub node_type: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sub_type: Option<String>,
    /// Number of links touching this node in the enclosing payload.
    #[serde(default)]
    pub degree: u64,
    #[serde(flatten)]
    pub properties: Map<String, JsonValue>,
}

impl GraphNode {
    /// Builds a node from its database properties.
    pub fn from_properties(node_type: &str, mut properties: Map<String, JsonValue>) -> Self {
        let id = properties.get("id").map(json_text).unwrap_or_default();
        let label = ["label", "name"]
            .iter()
            .find_map(|key| properties.get(*key).and_then(JsonValue::as_str))
            .map(str::to_string)
            .unwrap_or_else(|| id.clone());
        let sub_type = properties
            .get("sub_type")
            .and_then(JsonValue::as_str)
            .map(str::to_string);
        properties.retain(|key, _| !NODE_KEYS.contains(&key.as_str()));

        Self {
            id,
            label,
            node_type: node_type.to_string(),
            sub_type,
            degree: 0,
            properties,
        }
    }
}

/// A directed link between two node ids.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GraphLink {
    pub source: String,
    pub target: String,
    #[serde(rename = "type")]
    pub link_type: String,
    /// Link weight; the stored `count` for combined edges, else 1.
    pub value: u64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub timestamp: Option<String>,
    #[serde(flatten)]
    pub properties: Map<String, JsonValue>,
}

impl GraphLink {
    pub fn new(source: impl Into<String>, target: impl Into<String>, link_type: &str) -> Self {
        Self {
            source: source.into(),
            target: target.into(),
            link_type: link_type.to_string(),
            value: 1,
            timestamp: None,
            properties: Map::new(),
        }
    }

    /// Builds a link from its relationship properties.
    pub fn from_properties(
        source: impl Into<String>,
        target: impl Into<String>,
        link_type: &str,
        mut properties: Map<String, JsonValue>,
    ) -> Self {
        let value = properties
            .get("count")
            .or_else(|| properties.get("value"))
            .and_then(JsonValue::as_u64)
            .unwrap_or(1);
        let timestamp = properties
            .get("timestamp")
            .or_else(|| properties.get("last_timestamp"))
            .filter(|v| !v.is_null())
            .map(json_text);
        properties.retain(|key, _| !LINK_KEYS.contains(&key.as_str()));

        Self {
            source: source.into(),
            target: target.into(),
            link_type: link_type.to_string(),
            value,
            timestamp,
            properties,
        }
    }

    pub fn touches(&self, id: &str) -> bool {
        self.source == id || self.target == id
    }
}

/// A node-link graph.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct GraphData {
    pub nodes: Vec<GraphNode>,
    pub links: Vec<GraphLink>,
}

impl GraphData {
    /// Assembles a graph and fills in node degrees from `links`.
    pub fn new(nodes: Vec<GraphNode>, links: Vec<GraphLink>) -> Self {
        let mut graph = Self { nodes, links };
        graph.recompute_degrees();
        graph
    }

    pub fn recompute_degrees(&mut self) {
        let mut degrees: HashMap<&str, u64> = HashMap::new();
        for link in &self.links {
            *degrees.entry(link.source.as_str()).or_default() += 1;
            *degrees.entry(link.target.as_str()).or_default() += 1;
        }
        let degrees: HashMap<String, u64> = degrees
            .into_iter()
            .map(|(id, degree)| (id.to_string(), degree))
            .collect();
        for node in &mut self.nodes {
            node.degree = degrees.get(&node.id).copied().unwrap_or(0);
        }
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }
}

/// Aggregated graph with a set of entities folded into one group node.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GroupedGraph {
    pub nodes: Vec<GraphNode>,
    pub links: Vec<GraphLink>,
    pub group_node: GraphNode,
    /// Links with the group node at one end.
    pub group_edges: Vec<GraphLink>,
}

/// Renders ids and timestamps that may arrive as numbers.
fn json_text(value: &JsonValue) -> String {
    match value {
        JsonValue::String(s) => s.clone(),
        other => other.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn props(value: JsonValue) -> Map<String, JsonValue> {
        value.as_object().cloned().unwrap()
    }

    #[test]
    fn test_node_from_properties() {
        let node = GraphNode::from_properties(
            "Entity",
            props(json!({"id": "Mako", "sub_type": "Vessel", "name": "Mako", "flag": "Oceanus"})),
        );
        assert_eq!(node.id, "Mako");
        assert_eq!(node.sub_type.as_deref(), Some("Vessel"));
        assert_eq!(node.properties.len(), 2);

        let json = serde_json::to_value(&node).unwrap();
        assert_eq!(json["type"], "Entity");
        assert_eq!(json["flag"], "Oceanus");
        assert_eq!(json["degree"], 0);
    }

    #[test]
    fn test_numeric_id_and_label_fallback() {
        let node = GraphNode::from_properties("Airport", props(json!({"id": 17})));
        assert_eq!(node.id, "17");
        assert_eq!(node.label, "17");
    }

    #[test]
    fn test_link_value_from_count() {
        let link = GraphLink::from_properties(
            "a",
            "b",
            "INTERACTS_WITH",
            props(json!({"count": 4, "last_timestamp": "2040-10-03 09:00:00"})),
        );
        assert_eq!(link.value, 4);
        assert_eq!(link.timestamp.as_deref(), Some("2040-10-03 09:00:00"));
    }

    #[test]
    fn test_degrees() {
        let nodes = vec![
            GraphNode::from_properties("Entity", props(json!({"id": "a"}))),
            GraphNode::from_properties("Entity", props(json!({"id": "b"}))),
            GraphNode::from_properties("Entity", props(json!({"id": "c"}))),
        ];
        let links = vec![GraphLink::new("a", "b", "X"), GraphLink::new("a", "a", "Y")];
        let graph = GraphData::new(nodes, links);
        let degrees: Vec<u64> = graph.nodes.iter().map(|n| n.degree).collect();
        assert_eq!(degrees, vec![3, 1, 0]);
    }
}

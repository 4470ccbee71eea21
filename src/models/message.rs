//! Message-level views of communication events.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value as JsonValue};

/// One message: a communication event with its sender and receiver.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MessageItem {
    pub event_id: String,
    pub timestamp: Option<String>,
    /// Sender entity id.
    pub source: Option<String>,
    /// Receiver entity id.
    pub target: Option<String>,
    pub content: Option<String>,
    pub sub_type: Option<String>,
}

/// A message ranked by similarity to a query.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ScoredMessage {
    #[serde(flatten)]
    pub message: MessageItem,
    /// Cosine similarity in `[-1, 1]`.
    pub score: f32,
}

/// The event an evidence query targets and the entities around it.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EventInfo {
    pub event: Map<String, JsonValue>,
    /// Nodes with an edge into the event.
    pub sources: Vec<Map<String, JsonValue>>,
    /// Nodes the event points to.
    pub targets: Vec<Map<String, JsonValue>>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EvidenceForEvent {
    pub data: Vec<MessageItem>,
    pub info: EventInfo,
}

/// A weighted flow in a Sankey diagram.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SankeyLink {
    pub source: String,
    pub target: String,
    pub value: u64,
}

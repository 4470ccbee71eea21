//! Message extraction straight from the node-link dataset.

use std::collections::HashMap;

use super::node_link::NodeLinkGraph;
use crate::config::EdgeTypesConfig;
use crate::models::MessageItem;

/// Sub-type marking an Event node as a message.
pub const COMMUNICATION: &str = "Communication";

/// Communication events with their sender and receiver, ordered by
/// timestamp.
///
/// The sender is the source of the event's `sent` edge and the receiver the
/// target of its `received` edge; the first edge of each kind wins.
pub fn communication_messages(graph: &NodeLinkGraph, edges: &EdgeTypesConfig) -> Vec<MessageItem> {
    let mut senders: HashMap<&str, &str> = HashMap::new();
    let mut receivers: HashMap<&str, &str> = HashMap::new();
    for link in &graph.links {
        match link.edge_type() {
            Some(t) if t == edges.sent => {
                senders.entry(link.target.as_str()).or_insert(&link.source);
            }
            Some(t) if t == edges.received => {
                receivers.entry(link.source.as_str()).or_insert(&link.target);
            }
            _ => {}
        }
    }

    let mut messages: Vec<MessageItem> = graph
        .nodes
        .iter()
        .filter(|node| node.sub_type() == Some(COMMUNICATION))
        .map(|node| MessageItem {
            event_id: node.id.clone(),
            timestamp: node.str_property("timestamp").map(str::to_string),
            source: senders.get(node.id.as_str()).map(|s| s.to_string()),
            target: receivers.get(node.id.as_str()).map(|s| s.to_string()),
            content: node.str_property("content").map(str::to_string),
            sub_type: node.sub_type().map(str::to_string),
        })
        .collect();

    messages.sort_by(|a, b| a.timestamp.cmp(&b.timestamp));
    messages
}

//! Flight network views.

use serde::Serialize;

use super::{GraphLink, GraphNode};

/// Airports reachable within `hops` of a center airport.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AirportNeighborhood {
    pub airport_id: String,
    pub hops: u32,
    pub nodes: Vec<GraphNode>,
    pub links: Vec<GraphLink>,
}

/// A fewest-hops path between two airports.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Route {
    pub from: String,
    pub to: String,
    pub hops: usize,
    pub total_distance: f64,
    pub airports: Vec<GraphNode>,
    pub links: Vec<GraphLink>,
}

//! Flight network views.

use crate::context::Context;
use crate::di::FromContext;
use crate::error::AppError;
use crate::models::{AirportNeighborhood, GraphData, GraphLink, Route};
use crate::repositories::{AirportRepository, MAX_ROUTE_HOPS};

pub const DEFAULT_HOPS: u32 = 1;
pub const MAX_HOPS: u32 = 5;

#[derive(FromContext, Clone)]
pub struct AirportService {
    repo: AirportRepository,
}

impl AirportService {
    pub async fn airport_graph(&self) -> Result<GraphData, AppError> {
        self.repo.all().await
    }

    /// Airports within `hops` of `airport_id` and the links among them.
    pub async fn neighborhood(
        &self,
        airport_id: &str,
        hops: Option<u32>,
    ) -> Result<AirportNeighborhood, AppError> {
        let hops = clamp_hops(hops);
        let nodes = self.repo.within_hops(airport_id, hops).await?;
        if nodes.is_empty() {
            return Err(AppError::not_found("Airport", airport_id));
        }

        let ids: Vec<String> = nodes.iter().map(|n| n.id.clone()).collect();
        let links = self.repo.links_among(&ids).await?;
        let graph = GraphData::new(nodes, links);
        Ok(AirportNeighborhood {
            airport_id: airport_id.to_string(),
            hops,
            nodes: graph.nodes,
            links: graph.links,
        })
    }

    /// Fewest-hops route between two airports.
    pub async fn route(&self, from: &str, to: &str) -> Result<Route, AppError> {
        let origin = self
            .repo
            .find(from)
            .await?
            .ok_or_else(|| AppError::not_found("Airport", from))?;
        if from == to {
            return Ok(Route {
                from: from.to_string(),
                to: to.to_string(),
                hops: 0,
                total_distance: 0.0,
                airports: vec![origin],
                links: Vec::new(),
            });
        }
        if self.repo.find(to).await?.is_none() {
            return Err(AppError::not_found("Airport", to));
        }

        let (airports, links) = self
            .repo
            .shortest_path(from, to)
            .await?
            .ok_or_else(|| {
                AppError::not_found(
                    "Route",
                    format!("{} -> {} within {} hops", from, to, MAX_ROUTE_HOPS),
                )
            })?;
        Ok(Route {
            from: from.to_string(),
            to: to.to_string(),
            hops: links.len(),
            total_distance: total_distance(&links),
            airports,
            links,
        })
    }
}

/// Hop count limited to `1..=MAX_HOPS`, [`DEFAULT_HOPS`] when absent.
pub fn clamp_hops(hops: Option<u32>) -> u32 {
    hops.unwrap_or(DEFAULT_HOPS).clamp(1, MAX_HOPS)
}

/// Sum of the `distance` property; links without one count as zero.
pub fn total_distance(links: &[GraphLink]) -> f64 {
    links
        .iter()
        .filter_map(|l| l.properties.get("distance").and_then(|d| d.as_f64()))
        .sum()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_clamp_hops() {
        assert_eq!(clamp_hops(None), 1);
        assert_eq!(clamp_hops(Some(0)), 1);
        assert_eq!(clamp_hops(Some(3)), 3);
        assert_eq!(clamp_hops(Some(40)), MAX_HOPS);
    }

    #[test]
    fn test_total_distance() {
        let mut a = GraphLink::new("JFK", "LHR", "CONNECTED_TO");
        a.properties.insert("distance".to_string(), json!(5540.5));
        let mut b = GraphLink::new("LHR", "CDG", "CONNECTED_TO");
        b.properties.insert("distance".to_string(), json!(344));
        let c = GraphLink::new("CDG", "NCE", "CONNECTED_TO");
        assert_eq!(total_distance(&[a, b, c]), 5884.5);
    }
}

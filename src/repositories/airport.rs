//! Flight network queries.

use serde_json::{Map, Value as JsonValue};

use super::graph::link_from_row;
use crate::context::{AppGraph, Context};
use crate::cypher;
use crate::dataset::{AIRPORT_LABEL, CONNECTED_TO};
use crate::di::FromContext;
use crate::error::AppError;
use crate::graph::QueryExt;
use crate::models::{GraphData, GraphLink, GraphNode};

/// Longest route `shortestPath` searches for; longer routes are reported
/// as not found.
pub const MAX_ROUTE_HOPS: u32 = 15;

/// Repository for `Airport` nodes and `CONNECTED_TO` edges.
#[derive(FromContext, Clone)]
pub struct AirportRepository {
    graph: AppGraph,
}

impl AirportRepository {
    pub async fn all(&self) -> Result<GraphData, AppError> {
        let nodes = self
            .airports("MATCH (a:Airport) RETURN properties(a) AS props ORDER BY a.id", None)
            .await?;
        let links = self
            .graph
            .query(
                "MATCH (a:Airport)-[r:CONNECTED_TO]->(b:Airport)
                 RETURN a.id AS source, b.id AS target, type(r) AS type, properties(r) AS props",
            )
            .fetch_all()
            .await?
            .iter()
            .map(link_from_row)
            .collect::<Result<Vec<_>, _>>()?;
        Ok(GraphData::new(nodes, links))
    }

    pub async fn find(&self, airport_id: &str) -> Result<Option<GraphNode>, AppError> {
        Ok(self
            .airports(
                "MATCH (a:Airport {id: $id}) RETURN properties(a) AS props",
                Some(airport_id),
            )
            .await?
            .pop())
    }

    /// Airports within `hops` undirected hops of `airport_id`, center
    /// included. Empty when the center does not exist.
    pub async fn within_hops(
        &self,
        airport_id: &str,
        hops: u32,
    ) -> Result<Vec<GraphNode>, AppError> {
        // Variable-length bounds cannot be parameters; `hops` is a clamped integer.
        let cypher = format!(
            "MATCH (center:Airport {{id: $id}})
             OPTIONAL MATCH (center)-[:CONNECTED_TO*1..{hops}]-(other:Airport)
             WITH center, collect(DISTINCT other) AS others
             UNWIND [center] + others AS a
             WITH DISTINCT a
             RETURN properties(a) AS props
             ORDER BY a.id"
        );
        self.airports(&cypher, Some(airport_id)).await
    }

    /// `CONNECTED_TO` edges with both ends in `ids`.
    pub async fn links_among(&self, ids: &[String]) -> Result<Vec<GraphLink>, AppError> {
        cypher!(
            self.graph,
            "MATCH (a:Airport)-[r:CONNECTED_TO]->(b:Airport)
             WHERE a.id IN $ids AND b.id IN $ids
             RETURN a.id AS source, b.id AS target, type(r) AS type, properties(r) AS props",
            ids = ids,
        )
        .fetch_all()
        .await?
        .iter()
        .map(link_from_row)
        .collect()
    }

    /// Fewest-hops path, ignoring edge direction.
    pub async fn shortest_path(
        &self,
        from: &str,
        to: &str,
    ) -> Result<Option<(Vec<GraphNode>, Vec<GraphLink>)>, AppError> {
        let cypher = format!(
            "MATCH (a:Airport {{id: $from}}), (b:Airport {{id: $to}})
             MATCH p = shortestPath((a)-[:{CONNECTED_TO}*..{MAX_ROUTE_HOPS}]-(b))
             RETURN [n IN nodes(p) | properties(n)] AS airports,
                    [r IN relationships(p) | {{source: startNode(r).id, target: endNode(r).id,
                                               type: type(r), props: properties(r)}}] AS links"
        );
        let Some(row) = cypher!(self.graph, &cypher, from = from, to = to)
            .fetch_one()
            .await?
        else {
            return Ok(None);
        };

        let airports: Vec<Map<String, JsonValue>> = row.get("airports")?;
        let links: Vec<JsonValue> = row.get("links")?;
        let links = links
            .into_iter()
            .map(|link| link_from_row(&link.into()))
            .collect::<Result<Vec<_>, _>>()?;
        let airports = airports
            .into_iter()
            .map(|props| GraphNode::from_properties(AIRPORT_LABEL, props))
            .collect();
        Ok(Some((airports, links)))
    }

    async fn airports(&self, cypher: &str, id: Option<&str>) -> Result<Vec<GraphNode>, AppError> {
        let mut query = self.graph.query(cypher);
        if let Some(id) = id {
            query = query.param("id", id);
        }
        query
            .fetch_all()
            .await?
            .iter()
            .map(|row| {
                let props: Map<String, JsonValue> = row.get("props")?;
                Ok(GraphNode::from_properties(AIRPORT_LABEL, props))
            })
            .collect()
    }
}

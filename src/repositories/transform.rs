//! Reads feeding the transformation passes.

use std::collections::HashSet;
use std::sync::Arc;

use serde::de::DeserializeOwned;

use super::ProvenanceLabels;
use crate::config::Config;
use crate::context::{AppGraph, Context};
use crate::di::FromContext;
use crate::error::AppError;
use crate::graph::{QueryExt, Statement};
use crate::transform::aggregate::{Interaction, MessageEdge};
use crate::transform::collapse::RelationshipRow;
use crate::transform::combine::{self, EdgeRow};
use crate::transform::flatten::{CommunicationRow, FlattenedKey};
use crate::transform::redundant::{ProvenanceEdge, SelfLoop};
use crate::transform::{COMMUNICATION_EDGE, DERIVED_EDGES, INTERACTS_WITH_EDGE};

/// Repository for the transformation pipeline.
#[derive(FromContext, Clone)]
pub struct TransformRepository {
    graph: AppGraph,
    config: Arc<Config>,
}

impl TransformRepository {
    fn labels(&self) -> Result<ProvenanceLabels, AppError> {
        ProvenanceLabels::from_config(&self.config.edges)
    }

    async fn rows<T: DeserializeOwned>(&self, cypher: &str) -> Result<Vec<T>, AppError> {
        self.graph
            .query(cypher)
            .fetch_all()
            .await?
            .iter()
            .map(|row| row.parse())
            .collect()
    }

    /// Applies one pass atomically.
    pub async fn apply(&self, statements: Vec<Statement>) -> Result<(), AppError> {
        self.graph.run_batch(statements).await
    }

    /// Sender/receiver pairs of every communication event.
    pub async fn communication_rows(&self) -> Result<Vec<CommunicationRow>, AppError> {
        let labels = self.labels()?;
        let cypher = format!(
            "MATCH (s:Entity)-[:{sent}]->(e:Event {{sub_type: 'Communication'}})-[:{received}]->(r:Entity)
             RETURN e.id AS event_id, s.id AS source, r.id AS target,
                    toString(e.timestamp) AS timestamp, toString(e.content) AS content",
            sent = labels.sent,
            received = labels.received,
        );
        self.rows(&cypher).await
    }

    pub async fn flattened_keys(&self) -> Result<HashSet<FlattenedKey>, AppError> {
        let cypher = format!(
            "MATCH (a:Entity)-[c:{COMMUNICATION_EDGE}]->(b:Entity)
             RETURN c.event_id AS event_id, a.id AS source, b.id AS target"
        );
        Ok(self.rows(&cypher).await?.into_iter().collect())
    }

    /// Dataset edges keyed by element ids.
    pub async fn combinable_edges(&self) -> Result<Vec<EdgeRow>, AppError> {
        self.graph
            .query(
                "MATCH (a)-[r]->(b) WHERE NOT type(r) IN $excluded
                 RETURN elementId(r) AS rel_id, elementId(a) AS source, elementId(b) AS target,
                        type(r) AS type, r.count AS count",
            )
            .param("excluded", combine::excluded_types())
            .fetch_all()
            .await?
            .iter()
            .map(|row| row.parse())
            .collect()
    }

    /// Dataset self-loops; a derived edge that loops is a real fact.
    pub async fn self_loops(&self) -> Result<Vec<SelfLoop>, AppError> {
        self.graph
            .query(
                "MATCH (n)-[r]->(n) WHERE NOT type(r) IN $derived
                 RETURN elementId(r) AS rel_id, type(r) AS type",
            )
            .param("derived", DERIVED_EDGES)
            .fetch_all()
            .await?
            .iter()
            .map(|row| row.parse())
            .collect()
    }

    /// `sent` and `received` edges of communication events.
    pub async fn provenance_edges(&self) -> Result<Vec<ProvenanceEdge>, AppError> {
        let labels = self.labels()?;
        let cypher = format!(
            "MATCH (:Entity)-[r:{sent}]->(e:Event {{sub_type: 'Communication'}})
             RETURN elementId(r) AS rel_id, e.id AS event_id
             UNION ALL
             MATCH (e:Event {{sub_type: 'Communication'}})-[r:{received}]->(:Entity)
             RETURN elementId(r) AS rel_id, e.id AS event_id",
            sent = labels.sent,
            received = labels.received,
        );
        self.rows(&cypher).await
    }

    /// Events already represented by a `COMMUNICATION` edge.
    pub async fn flattened_event_ids(&self) -> Result<HashSet<String>, AppError> {
        let cypher = format!(
            "MATCH ()-[c:{COMMUNICATION_EDGE}]->() RETURN DISTINCT c.event_id AS event_id"
        );
        self.graph
            .query(&cypher)
            .fetch_all()
            .await?
            .iter()
            .map(|row| row.get("event_id"))
            .collect()
    }

    pub async fn relationship_rows(&self) -> Result<Vec<RelationshipRow>, AppError> {
        self.rows(
            "MATCH (rel:Relationship)
             OPTIONAL MATCH (a:Entity)-->(rel)
             WITH rel, collect(DISTINCT a.id) AS sources
             OPTIONAL MATCH (rel)-->(b:Entity)
             RETURN rel.id AS id, rel.sub_type AS sub_type, properties(rel) AS props,
                    sources, collect(DISTINCT b.id) AS targets",
        )
        .await
    }

    pub async fn message_edges(&self) -> Result<Vec<MessageEdge>, AppError> {
        let cypher = format!(
            "MATCH (a:Entity)-[c:{COMMUNICATION_EDGE}]->(b:Entity)
             RETURN a.id AS source, b.id AS target, toString(c.timestamp) AS timestamp"
        );
        self.rows(&cypher).await
    }

    pub async fn interactions(&self) -> Result<Vec<Interaction>, AppError> {
        let cypher = format!(
            "MATCH (a:Entity)-[i:{INTERACTS_WITH_EDGE}]->(b:Entity)
             RETURN a.id AS source, b.id AS target, i.count AS count,
                    i.first_timestamp AS first_timestamp, i.last_timestamp AS last_timestamp"
        );
        self.rows(&cypher).await
    }
}

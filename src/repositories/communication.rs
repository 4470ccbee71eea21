//! Message and event queries.
//!
//! Messages are read from both graph shapes: the raw
//! `(sender)-[:sent]->(event)-[:received]->(receiver)` provenance and the
//! flattened `COMMUNICATION` edges. `UNION` drops the duplicates when both
//! are present.

use std::sync::Arc;

use serde_json::{Map, Value as JsonValue};

use super::ProvenanceLabels;
use crate::config::Config;
use crate::context::{AppGraph, Context};
use crate::di::FromContext;
use crate::error::AppError;
use crate::graph::QueryExt;
use crate::models::{EventInfo, MessageItem};
use crate::transform::COMMUNICATION_EDGE;

/// Repository for communication and event queries.
#[derive(FromContext, Clone)]
pub struct CommunicationRepository {
    graph: AppGraph,
    config: Arc<Config>,
}

/// Optional restrictions on a message listing; `None` means unrestricted.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MessageFilter {
    pub event_ids: Option<Vec<String>>,
    /// Inclusive `YYYY-MM-DD` bounds on the message day.
    pub start_date: Option<String>,
    pub end_date: Option<String>,
    /// Messages sent or received by any of these entities.
    pub entity_ids: Option<Vec<String>>,
    /// Case-insensitive substring of the content.
    pub keyword: Option<String>,
    pub limit: Option<usize>,
}

impl CommunicationRepository {
    fn labels(&self) -> Result<ProvenanceLabels, AppError> {
        ProvenanceLabels::from_config(&self.config.edges)
    }

    /// Messages matching `filter`, ordered by timestamp.
    pub async fn messages(&self, filter: &MessageFilter) -> Result<Vec<MessageItem>, AppError> {
        let labels = self.labels()?;
        let cypher = format!(
            "CALL {{
                 MATCH (s:Entity)-[:{sent}]->(e:Event {{sub_type: 'Communication'}})
                 OPTIONAL MATCH (e)-[:{received}]->(r:Entity)
                 RETURN e.id AS event_id, toString(e.timestamp) AS timestamp,
                        s.id AS source, r.id AS target,
                        toString(e.content) AS content, e.sub_type AS sub_type
                 UNION
                 MATCH (s:Entity)-[c:{COMMUNICATION_EDGE}]->(r:Entity)
                 OPTIONAL MATCH (e:Event {{id: c.event_id}})
                 RETURN c.event_id AS event_id, toString(c.timestamp) AS timestamp,
                        s.id AS source, r.id AS target,
                        toString(c.content) AS content,
                        coalesce(e.sub_type, 'Communication') AS sub_type
             }}
             WITH event_id, timestamp, source, target, content, sub_type
             WHERE ($event_ids IS NULL OR event_id IN $event_ids)
               AND ($start_date IS NULL OR substring(timestamp, 0, 10) >= $start_date)
               AND ($end_date IS NULL OR substring(timestamp, 0, 10) <= $end_date)
               AND ($entity_ids IS NULL OR source IN $entity_ids OR target IN $entity_ids)
               AND ($keyword IS NULL OR toLower(content) CONTAINS toLower($keyword))
             RETURN event_id, timestamp, source, target, content, sub_type
             ORDER BY timestamp, event_id
             LIMIT $limit",
            sent = labels.sent,
            received = labels.received,
        );

        let limit = filter.limit.map_or(i64::MAX, |l| l as i64);
        self.graph
            .query(&cypher)
            .param("event_ids", &filter.event_ids)
            .param("start_date", &filter.start_date)
            .param("end_date", &filter.end_date)
            .param("entity_ids", &filter.entity_ids)
            .param("keyword", &filter.keyword)
            .param("limit", limit)
            .fetch_all()
            .await?
            .iter()
            .map(|row| row.parse::<MessageItem>())
            .collect()
    }

    /// Properties of every event on `date` (`YYYY-MM-DD`).
    pub async fn events_on(&self, date: &str) -> Result<Vec<Map<String, JsonValue>>, AppError> {
        self.graph
            .query(
                "MATCH (e:Event)
                 WHERE substring(toString(e.timestamp), 0, 10) = $date
                 RETURN properties(e) AS props
                 ORDER BY e.timestamp, e.id",
            )
            .param("date", date)
            .fetch_all()
            .await?
            .iter()
            .map(|row| row.get("props"))
            .collect()
    }

    /// The event or relationship node with the entities around it.
    pub async fn event_info(&self, event_id: &str) -> Result<EventInfo, AppError> {
        let event = self
            .graph
            .query(
                "MATCH (e {id: $id}) WHERE e:Event OR e:Relationship
                 RETURN properties(e) AS props LIMIT 1",
            )
            .param("id", event_id)
            .fetch_one()
            .await?
            .ok_or_else(|| AppError::not_found("Event", event_id))?
            .get("props")?;

        let sources = self
            .neighbours(
                "MATCH (n:Entity)-[r]->(e {id: $id}) WHERE e:Event OR e:Relationship
                 RETURN n {.*, relation: type(r)} AS props
                 ORDER BY n.id",
                event_id,
            )
            .await?;
        let targets = self
            .neighbours(
                "MATCH (e {id: $id})-[r]->(n:Entity) WHERE e:Event OR e:Relationship
                 RETURN n {.*, relation: type(r)} AS props
                 ORDER BY n.id",
                event_id,
            )
            .await?;

        Ok(EventInfo {
            event,
            sources,
            targets,
        })
    }

    /// Ids of communication events that are evidence for `event_id`.
    pub async fn evidence_event_ids(&self, event_id: &str) -> Result<Vec<String>, AppError> {
        let labels = self.labels()?;
        let cypher = format!(
            "MATCH (c:Event {{sub_type: 'Communication'}})-[:{evidence}]->(e {{id: $id}})
             RETURN DISTINCT c.id AS id",
            evidence = labels.evidence,
        );
        self.graph
            .query(&cypher)
            .param("id", event_id)
            .fetch_all()
            .await?
            .iter()
            .map(|row| row.get("id"))
            .collect()
    }

    async fn neighbours(
        &self,
        cypher: &str,
        event_id: &str,
    ) -> Result<Vec<Map<String, JsonValue>>, AppError> {
        self.graph
            .query(cypher)
            .param("id", event_id)
            .fetch_all()
            .await?
            .iter()
            .map(|row| row.get("props"))
            .collect()
    }
}

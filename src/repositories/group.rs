//! Entity group persistence.

use crate::context::{AppGraph, Context};
use crate::di::FromContext;
use crate::error::AppError;
use crate::graph::{QueryExt, Statement};
use crate::transform::MEMBER_OF_EDGE;

pub const GROUP_SUB_TYPE: &str = "Group";

/// Repository for group nodes and `MEMBER_OF` edges.
#[derive(FromContext, Clone)]
pub struct GroupRepository {
    graph: AppGraph,
}

impl GroupRepository {
    /// Which of `ids` exist as entities.
    pub async fn existing_entities(&self, ids: &[String]) -> Result<Vec<String>, AppError> {
        self.graph
            .query("MATCH (n:Entity) WHERE n.id IN $ids RETURN n.id AS id")
            .param("ids", ids)
            .fetch_all()
            .await?
            .iter()
            .map(|row| row.get("id"))
            .collect()
    }

    /// True when `group_id` names an entity that is not a group.
    pub async fn id_taken(&self, group_id: &str) -> Result<bool, AppError> {
        let row = self
            .graph
            .query(
                "MATCH (n:Entity {id: $id})
                 WHERE coalesce(n.sub_type, '') <> $group
                 RETURN n.id AS id LIMIT 1",
            )
            .param("id", group_id)
            .param("group", GROUP_SUB_TYPE)
            .fetch_one()
            .await?;
        Ok(row.is_some())
    }

    /// Creates or updates the group node and points every member at it.
    ///
    /// Membership is replaced, not merged.
    pub async fn save(&self, group_id: &str, member_ids: &[String]) -> Result<(), AppError> {
        let statements = vec![
            Statement::new(
                "MERGE (g:Entity {id: $id})
                 SET g.sub_type = $group, g.label = $id, g.type = 'Entity', g.members = $members",
            )
            .param("id", group_id)
            .param("group", GROUP_SUB_TYPE)
            .param("members", member_ids.to_vec()),
            Statement::new(format!(
                "MATCH (:Entity)-[m:{MEMBER_OF_EDGE}]->(g:Entity {{id: $id}}) DELETE m"
            ))
            .param("id", group_id),
            Statement::new(format!(
                "MATCH (g:Entity {{id: $id}})
                 MATCH (m:Entity) WHERE m.id IN $members
                 MERGE (m)-[:{MEMBER_OF_EDGE}]->(g)"
            ))
            .param("id", group_id)
            .param("members", member_ids.to_vec()),
        ];
        self.graph.run_batch(statements).await
    }
}

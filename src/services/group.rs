//! Entity grouping.

use std::collections::{HashMap, HashSet};

use serde_json::{json, Map, Value as JsonValue};

use crate::context::Context;
use crate::di::FromContext;
use crate::error::AppError;
use crate::models::{GraphData, GraphLink, GraphNode, GroupedGraph};
use crate::repositories::{GraphRepository, GroupRepository, GROUP_SUB_TYPE};

#[derive(FromContext, Clone)]
pub struct GroupService {
    groups: GroupRepository,
    graph_repo: GraphRepository,
}

impl GroupService {
    /// Persists `group_id` with `entity_ids` as members and returns the
    /// aggregated graph with the members folded into the group.
    pub async fn group_by(
        &self,
        group_id: &str,
        entity_ids: &[String],
    ) -> Result<GroupedGraph, AppError> {
        let group_id = group_id.trim();
        if group_id.is_empty() {
            return Err(AppError::Validation("group_id must not be empty".to_string()));
        }

        let mut seen = HashSet::new();
        let members: Vec<String> = entity_ids
            .iter()
            .map(|id| id.trim())
            .filter(|id| !id.is_empty() && seen.insert(*id))
            .map(str::to_string)
            .collect();
        if members.is_empty() {
            return Err(AppError::Validation(
                "at least one entity id is required".to_string(),
            ));
        }
        if members.iter().any(|m| m == group_id) {
            return Err(AppError::Validation(format!(
                "group '{}' cannot be a member of itself",
                group_id
            )));
        }

        let existing: HashSet<String> = self
            .groups
            .existing_entities(&members)
            .await?
            .into_iter()
            .collect();
        let unknown: Vec<&str> = members
            .iter()
            .filter(|m| !existing.contains(*m))
            .map(String::as_str)
            .collect();
        if !unknown.is_empty() {
            return Err(AppError::Validation(format!(
                "unknown entities: {}",
                unknown.join(", ")
            )));
        }
        if self.groups.id_taken(group_id).await? {
            return Err(AppError::Validation(format!(
                "'{}' already names an entity that is not a group",
                group_id
            )));
        }

        self.groups.save(group_id, &members).await?;
        tracing::info!(group = %group_id, members = members.len(), "Group saved");

        let graph = self.graph_repo.aggregated_graph().await?;
        Ok(fold_group(graph, group_id, &members))
    }
}

/// Folds `members` into the group node.
///
/// Member endpoints are remapped to the group, links that end up inside
/// the group are dropped and parallel links of one type are merged with
/// their values summed.
pub fn fold_group(graph: GraphData, group_id: &str, members: &[String]) -> GroupedGraph {
    let members: HashSet<&str> = members.iter().map(String::as_str).collect();
    let remap = |id: String| {
        if members.contains(id.as_str()) {
            group_id.to_string()
        } else {
            id
        }
    };

    let mut group_node = None;
    let mut nodes = Vec::with_capacity(graph.nodes.len());
    for node in graph.nodes {
        if node.id == group_id {
            group_node = Some(node);
        } else if !members.contains(node.id.as_str()) {
            nodes.push(node);
        }
    }
    let mut group_node = group_node.unwrap_or_else(|| synthetic_group_node(group_id, &members));

    let mut merged: Vec<GraphLink> = Vec::new();
    let mut positions: HashMap<(String, String, String), usize> = HashMap::new();
    for mut link in graph.links {
        link.source = remap(link.source);
        link.target = remap(link.target);
        if link.source == link.target {
            continue;
        }
        let key = (link.source.clone(), link.target.clone(), link.link_type.clone());
        match positions.get(&key) {
            Some(&i) => {
                let existing = &mut merged[i];
                existing.value += link.value;
                if link.timestamp > existing.timestamp {
                    existing.timestamp = link.timestamp;
                }
            }
            None => {
                positions.insert(key, merged.len());
                merged.push(link);
            }
        }
    }

    nodes.push(group_node.clone());
    let folded = GraphData::new(nodes, merged);
    if let Some(node) = folded.nodes.iter().find(|n| n.id == group_id) {
        group_node.degree = node.degree;
    }
    let group_edges = folded
        .links
        .iter()
        .filter(|l| l.touches(group_id))
        .cloned()
        .collect();

    GroupedGraph {
        nodes: folded.nodes,
        links: folded.links,
        group_node,
        group_edges,
    }
}

fn synthetic_group_node(group_id: &str, members: &HashSet<&str>) -> GraphNode {
    let mut sorted: Vec<&str> = members.iter().copied().collect();
    sorted.sort_unstable();
    let props: Map<String, JsonValue> = [
        ("id".to_string(), json!(group_id)),
        ("label".to_string(), json!(group_id)),
        ("sub_type".to_string(), json!(GROUP_SUB_TYPE)),
        ("members".to_string(), json!(sorted)),
    ]
    .into_iter()
    .collect();
    GraphNode::from_properties("Entity", props)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn node(id: &str) -> GraphNode {
        GraphNode::from_properties("Entity", json!({"id": id}).as_object().cloned().unwrap())
    }

    fn link(source: &str, target: &str, value: u64) -> GraphLink {
        GraphLink {
            value,
            ..GraphLink::new(source, target, "INTERACTS_WITH")
        }
    }

    fn graph() -> GraphData {
        GraphData::new(
            vec![node("Mako"), node("Remora"), node("Nadia"), node("Council")],
            vec![
                link("Mako", "Remora", 4),
                link("Mako", "Nadia", 2),
                link("Remora", "Nadia", 3),
                link("Nadia", "Council", 1),
                link("Council", "Mako", 5),
            ],
        )
    }

    fn members() -> Vec<String> {
        vec!["Mako".to_string(), "Remora".to_string()]
    }

    #[test]
    fn test_fold_merges_and_drops_internal_links() {
        let grouped = fold_group(graph(), "Fleet", &members());

        let ids: Vec<&str> = grouped.nodes.iter().map(|n| n.id.as_str()).collect();
        assert_eq!(ids, vec!["Nadia", "Council", "Fleet"]);

        assert!(grouped.links.iter().all(|l| l.source != l.target));
        let to_nadia = grouped
            .links
            .iter()
            .find(|l| l.source == "Fleet" && l.target == "Nadia")
            .unwrap();
        assert_eq!(to_nadia.value, 5);

        assert_eq!(grouped.group_node.sub_type.as_deref(), Some(GROUP_SUB_TYPE));
        assert_eq!(grouped.group_node.degree, 2);
        assert_eq!(grouped.group_edges.len(), 2);
    }

    #[test]
    fn test_fold_conserves_external_values() {
        let before: u64 = graph()
            .links
            .iter()
            .filter(|l| !(members().contains(&l.source) && members().contains(&l.target)))
            .map(|l| l.value)
            .sum();
        let after: u64 = fold_group(graph(), "Fleet", &members())
            .links
            .iter()
            .map(|l| l.value)
            .sum();
        assert_eq!(before, after);
    }

    #[test]
    fn test_fold_uses_stored_group_node() {
        let mut data = graph();
        let mut stored = node("Fleet");
        stored.label = "The Fleet".to_string();
        data.nodes.push(stored);
        data.links.push(GraphLink::new("Mako", "Fleet", "MEMBER_OF"));

        let grouped = fold_group(data, "Fleet", &members());
        assert_eq!(grouped.group_node.label, "The Fleet");
        assert!(grouped.links.iter().all(|l| l.link_type != "MEMBER_OF"));
    }
}

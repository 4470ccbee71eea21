//! Message queries and aggregations for the communication views.

use std::collections::BTreeMap;

use chrono::NaiveDate;
use serde_json::{Map, Value as JsonValue};

use crate::context::Context;
use crate::di::FromContext;
use crate::error::AppError;
use crate::models::{EvidenceForEvent, MessageItem, SankeyLink};
use crate::repositories::{CommunicationRepository, MessageFilter};

/// Appended to receivers that also appear as senders, keeping the Sankey
/// diagram acyclic.
pub const OUT_SUFFIX: &str = " (out)";

#[derive(FromContext, Clone)]
pub struct CommunicationService {
    repo: CommunicationRepository,
}

impl CommunicationService {
    /// Time-ordered messages for the massive sequence view.
    pub async fn massive_sequence_view(
        &self,
        filter: MessageFilter,
    ) -> Result<Vec<MessageItem>, AppError> {
        let start = filter.start_date.as_deref().map(parse_date).transpose()?;
        let end = filter.end_date.as_deref().map(parse_date).transpose()?;
        if let (Some(start), Some(end)) = (start, end) {
            if start > end {
                return Err(AppError::Validation(format!(
                    "start_date {} is after end_date {}",
                    start, end
                )));
            }
        }

        let messages = self.repo.messages(&filter).await?;
        tracing::debug!(count = messages.len(), "Sequence view messages");
        Ok(messages)
    }

    /// Every event whose timestamp falls on `date`.
    pub async fn events_by_date(
        &self,
        date: &str,
    ) -> Result<Vec<Map<String, JsonValue>>, AppError> {
        let date = parse_date(date)?;
        self.repo.events_on(&date.to_string()).await
    }

    /// Messages whose content contains `keyword`, ignoring case.
    pub async fn search_content(
        &self,
        keyword: &str,
        limit: Option<usize>,
    ) -> Result<Vec<MessageItem>, AppError> {
        let keyword = keyword.trim();
        if keyword.is_empty() {
            return Err(AppError::Validation("keyword must not be empty".to_string()));
        }
        let filter = MessageFilter {
            keyword: Some(keyword.to_string()),
            limit,
            ..Default::default()
        };
        self.repo.messages(&filter).await
    }

    /// Messages that are evidence for an event or relationship, with the
    /// entities around it.
    pub async fn evidence_for_event(&self, event_id: &str) -> Result<EvidenceForEvent, AppError> {
        let info = self.repo.event_info(event_id).await?;
        let evidence_ids = self.repo.evidence_event_ids(event_id).await?;

        let data = if evidence_ids.is_empty() {
            Vec::new()
        } else {
            let filter = MessageFilter {
                event_ids: Some(evidence_ids),
                ..Default::default()
            };
            self.repo.messages(&filter).await?
        };
        Ok(EvidenceForEvent { data, info })
    }

    /// Message flows into and out of `entity_id`, optionally for one day.
    pub async fn sankey_flows(
        &self,
        entity_id: &str,
        date: Option<&str>,
    ) -> Result<Vec<SankeyLink>, AppError> {
        let day = date.map(parse_date).transpose()?.map(|d| d.to_string());
        let filter = MessageFilter {
            entity_ids: Some(vec![entity_id.to_string()]),
            start_date: day.clone(),
            end_date: day,
            ..Default::default()
        };
        let messages = self.repo.messages(&filter).await?;
        Ok(sankey_links(entity_id, &messages))
    }
}

/// Parses a `YYYY-MM-DD` date.
pub fn parse_date(value: &str) -> Result<NaiveDate, AppError> {
    NaiveDate::parse_from_str(value.trim(), "%Y-%m-%d").map_err(|_| {
        AppError::Validation(format!("invalid date '{}', expected YYYY-MM-DD", value))
    })
}

/// Counts messages from each sender into `entity` and from `entity` to
/// each receiver.
///
/// Messages to oneself are ignored. Receivers that are also senders get
/// [`OUT_SUFFIX`]. Links are sorted by value, largest first.
pub fn sankey_links(entity: &str, messages: &[MessageItem]) -> Vec<SankeyLink> {
    let mut incoming: BTreeMap<&str, u64> = BTreeMap::new();
    let mut outgoing: BTreeMap<&str, u64> = BTreeMap::new();

    for message in messages {
        let (Some(source), Some(target)) = (message.source.as_deref(), message.target.as_deref())
        else {
            continue;
        };
        if source == target {
            continue;
        }
        if target == entity {
            *incoming.entry(source).or_default() += 1;
        } else if source == entity {
            *outgoing.entry(target).or_default() += 1;
        }
    }

    let mut links: Vec<SankeyLink> = incoming
        .iter()
        .map(|(source, value)| SankeyLink {
            source: source.to_string(),
            target: entity.to_string(),
            value: *value,
        })
        .collect();
    links.extend(outgoing.iter().map(|(target, value)| {
        let target = if incoming.contains_key(target) {
            format!("{}{}", target, OUT_SUFFIX)
        } else {
            target.to_string()
        };
        SankeyLink {
            source: entity.to_string(),
            target,
            value: *value,
        }
    }));

    links.sort_by(|a, b| {
        b.value
            .cmp(&a.value)
            .then_with(|| a.source.cmp(&b.source))
            .then_with(|| a.target.cmp(&b.target))
    });
    links
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::{HashMap, HashSet};

    fn message(source: &str, target: &str) -> MessageItem {
        MessageItem {
            event_id: format!("{}->{}", source, target),
            timestamp: Some("2040-10-01 08:00:00".to_string()),
            source: Some(source.to_string()),
            target: Some(target.to_string()),
            content: None,
            sub_type: Some("Communication".to_string()),
        }
    }

    #[test]
    fn test_parse_date() {
        assert_eq!(
            parse_date("2040-10-03").unwrap(),
            NaiveDate::from_ymd_opt(2040, 10, 3).unwrap()
        );
        assert!(matches!(parse_date("03/10/2040"), Err(AppError::Validation(_))));
        assert!(parse_date("2040-02-30").is_err());
    }

    #[test]
    fn test_sankey_counts_and_order() {
        let messages = vec![
            message("Mako", "Nadia"),
            message("Mako", "Nadia"),
            message("Remora", "Nadia"),
            message("Nadia", "Council"),
            message("Nadia", "Nadia"),
            message("Remora", "Council"),
        ];
        let links = sankey_links("Nadia", &messages);
        assert_eq!(
            links,
            vec![
                SankeyLink {
                    source: "Mako".to_string(),
                    target: "Nadia".to_string(),
                    value: 2
                },
                SankeyLink {
                    source: "Nadia".to_string(),
                    target: "Council".to_string(),
                    value: 1
                },
                SankeyLink {
                    source: "Remora".to_string(),
                    target: "Nadia".to_string(),
                    value: 1
                },
            ]
        );
    }

    #[test]
    fn test_sankey_is_acyclic() {
        let messages = vec![
            message("Mako", "Nadia"),
            message("Nadia", "Mako"),
            message("Nadia", "Mako"),
            message("Remora", "Nadia"),
            message("Nadia", "Remora"),
        ];
        let links = sankey_links("Nadia", &messages);
        assert!(links
            .iter()
            .any(|l| l.source == "Nadia" && l.target == "Mako (out)" && l.value == 2));

        // Depth-first search over the link graph finds no back edge.
        let mut adjacency: HashMap<&str, Vec<&str>> = HashMap::new();
        for link in &links {
            adjacency
                .entry(link.source.as_str())
                .or_default()
                .push(link.target.as_str());
        }
        fn visit<'a>(
            node: &'a str,
            adjacency: &HashMap<&'a str, Vec<&'a str>>,
            path: &mut HashSet<&'a str>,
        ) -> bool {
            if !path.insert(node) {
                return false;
            }
            let ok = adjacency
                .get(node)
                .map_or(true, |next| next.iter().all(|n| visit(n, adjacency, path)));
            path.remove(node);
            ok
        }
        for link in &links {
            assert!(visit(link.source.as_str(), &adjacency, &mut HashSet::new()));
        }
    }

    #[test]
    fn test_sankey_skips_incomplete_messages() {
        let mut orphan = message("Mako", "Nadia");
        orphan.target = None;
        assert!(sankey_links("Nadia", &[orphan]).is_empty());
    }
}

//! Data access layer for graph operations.
//!
//! Repositories own every Cypher string in the crate, using the
//! `FromContext` derive macro for dependency injection.

mod airport;
mod communication;
mod example;
mod graph;
mod group;
mod schema;
mod transform;

pub use airport::{AirportRepository, MAX_ROUTE_HOPS};
pub use communication::{CommunicationRepository, MessageFilter};
pub use example::ExampleRepository;
pub use graph::{GraphRepository, CLEAR_ALL};
pub use group::{GroupRepository, GROUP_SUB_TYPE};
pub use schema::SchemaRepository;
pub use transform::TransformRepository;

use crate::config::EdgeTypesConfig;
use crate::error::AppError;
use crate::graph::Label;

/// Relationship types linking messages to their sender, receiver and the
/// events they support, validated for use in Cypher.
#[derive(Debug, Clone, PartialEq)]
pub struct ProvenanceLabels {
    pub sent: Label,
    pub received: Label,
    pub evidence: Label,
}

impl ProvenanceLabels {
    pub fn from_config(edges: &EdgeTypesConfig) -> Result<Self, AppError> {
        Ok(Self {
            sent: Label::new(edges.sent.as_str())?,
            received: Label::new(edges.received.as_str())?,
            evidence: Label::new(edges.evidence.as_str())?,
        })
    }
}

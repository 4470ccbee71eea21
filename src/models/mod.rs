//! Domain models returned by services and serialized by the HTTP layer.

mod airport;
mod graph;
mod job;
mod message;
mod report;
mod summary;

pub use airport::{AirportNeighborhood, Route};
pub use graph::{GraphData, GraphLink, GraphNode, GroupedGraph};
pub use job::{JobState, LoadJob};
pub use message::{EventInfo, EvidenceForEvent, MessageItem, SankeyLink, ScoredMessage};
pub use report::{ImportSummary, LoadReport, PassReport, PipelineReport};
pub use summary::{EdgeTypeCount, GraphSummary, NodeLabelCount};

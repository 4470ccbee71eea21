//! Business logic services for the communication graph.
//!
//! Services orchestrate repositories and handle business rules,
//! using the `FromContext` derive macro for dependency injection.

mod airport;
mod communication;
mod example;
mod graph;
mod group;
mod jobs;
mod loader;
mod search;
mod transform;

pub use airport::{clamp_hops, total_distance, AirportService, DEFAULT_HOPS, MAX_HOPS};
pub use communication::{parse_date, sankey_links, CommunicationService, OUT_SUFFIX};
pub use example::{display_lines, ExampleService};
pub use graph::GraphService;
pub use group::{fold_group, GroupService};
pub use jobs::JobService;
pub use loader::LoaderService;
pub use search::SearchService;
pub use transform::TransformService;

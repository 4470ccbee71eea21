//! commgraph - communication graph service
//!
//! Loads an investigative property graph into Neo4j, rewrites it into
//! direct entity-to-entity links and serves message, graph and similarity
//! queries over HTTP.

pub mod cli;
pub mod config;
pub mod context;
pub mod dataset;
pub mod di;
pub mod error;
pub mod graph;
pub mod http;
pub mod jobs;
pub mod migrations;
pub mod models;
pub mod repositories;
pub mod search;
pub mod services;
pub mod transform;

// Re-export FromRef at crate root for di-macros generated code
pub use di::FromRef;

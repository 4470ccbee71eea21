//! Graph abstraction layer over the Neo4j database.
//!
//! # Architecture
//!
//! - [`CypherExecutor`] - Execute Cypher queries and atomic statement batches
//! - [`Transaction`] - Transaction lifecycle (commit/rollback)
//! - [`GraphClient`] - Connection management and transaction creation
//!
//! Services and repositories only see [`AppGraph`], a shared
//! `dyn CypherExecutor`, so request handling can run against an in-memory
//! executor in tests.
//!
//! # Usage
//!
//! ```ignore
//! use commgraph::graph::QueryExt;
//!
//! let rows = graph
//!     .query("MATCH (n:Entity) WHERE n.id = $id RETURN properties(n) AS props")
//!     .param("id", entity_id)
//!     .fetch_all()
//!     .await?;
//!
//! graph
//!     .query("MATCH (n) DETACH DELETE n")
//!     .run()
//!     .await?;
//! ```

mod ident;
mod macros;
mod query;
mod row;
mod statement;
mod traits;

pub mod backends;

use std::sync::Arc;

pub use ident::Label;
pub use query::{Query, QueryExt};
pub use row::{Params, Row, RowStream};
pub use statement::Statement;
pub use traits::{CypherExecutor, GraphClient, Transaction};

// Re-export macro (defined at crate root via #[macro_export])
#[doc(inline)]
pub use crate::cypher;

/// Shared handle to the graph database.
pub type AppGraph = Arc<dyn CypherExecutor>;

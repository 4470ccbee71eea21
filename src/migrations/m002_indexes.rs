//! Lookup indexes for the message queries.

use futures::future::BoxFuture;

use crate::error::AppError;
use crate::graph::{CypherExecutor, Statement};

use super::Migration;

pub struct M002Indexes;

const INDEXES: [&str; 3] = [
    "CREATE INDEX event_timestamp IF NOT EXISTS FOR (n:Event) ON (n.timestamp)",
    "CREATE INDEX event_sub_type IF NOT EXISTS FOR (n:Event) ON (n.sub_type)",
    "CREATE INDEX communication_event_id IF NOT EXISTS FOR ()-[r:COMMUNICATION]-() ON (r.event_id)",
];

impl Migration for M002Indexes {
    fn id(&self) -> &'static str {
        "m002_indexes"
    }

    fn version(&self) -> u32 {
        2
    }

    fn description(&self) -> &'static str {
        "Indexes on event timestamps, event sub-types and COMMUNICATION event ids"
    }

    fn up<'a>(&'a self, graph: &'a dyn CypherExecutor) -> BoxFuture<'a, Result<(), AppError>> {
        Box::pin(async move {
            let statements = INDEXES.iter().map(|c| Statement::new(*c)).collect();
            graph.run_batch(statements).await
        })
    }
}

//! Uniqueness constraints on node ids.

use futures::future::BoxFuture;

use crate::error::AppError;
use crate::graph::{CypherExecutor, Statement};

use super::Migration;

pub struct M001Constraints;

const CONSTRAINTS: [&str; 4] = [
    "CREATE CONSTRAINT entity_id IF NOT EXISTS FOR (n:Entity) REQUIRE n.id IS UNIQUE",
    "CREATE CONSTRAINT event_id IF NOT EXISTS FOR (n:Event) REQUIRE n.id IS UNIQUE",
    "CREATE CONSTRAINT relationship_id IF NOT EXISTS FOR (n:Relationship) REQUIRE n.id IS UNIQUE",
    "CREATE CONSTRAINT airport_id IF NOT EXISTS FOR (n:Airport) REQUIRE n.id IS UNIQUE",
];

impl Migration for M001Constraints {
    fn id(&self) -> &'static str {
        "m001_constraints"
    }

    fn version(&self) -> u32 {
        1
    }

    fn description(&self) -> &'static str {
        "Unique ids for Entity, Event, Relationship and Airport nodes"
    }

    fn up<'a>(&'a self, graph: &'a dyn CypherExecutor) -> BoxFuture<'a, Result<(), AppError>> {
        Box::pin(async move {
            let statements = CONSTRAINTS.iter().map(|c| Statement::new(*c)).collect();
            graph.run_batch(statements).await
        })
    }
}

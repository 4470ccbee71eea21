//! Owned Cypher statements for batched writes.

use serde_json::Value as JsonValue;

use crate::graph::row::Params;

/// A Cypher statement with its parameters, detached from any executor.
///
/// Statements are collected by the transformation passes and handed to
/// [`CypherExecutor::run_batch`](crate::graph::CypherExecutor::run_batch)
/// so a pass is applied as a whole.
#[derive(Debug, Clone, PartialEq)]
pub struct Statement {
    pub cypher: String,
    pub params: Params,
}

impl Statement {
    pub fn new(cypher: impl Into<String>) -> Self {
        Self {
            cypher: cypher.into(),
            params: Params::new(),
        }
    }

    pub fn param(mut self, name: &str, value: impl Into<JsonValue>) -> Self {
        self.params.insert(name.to_string(), value.into());
        self
    }
}

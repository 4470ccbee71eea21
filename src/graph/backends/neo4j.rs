//! Neo4j backend over the Bolt protocol.
//!
//! Parameters travel as typed Bolt values; they are never interpolated into
//! the query text. Result rows are converted to JSON column maps, so queries
//! should return scalars, lists, maps or `properties(n)` rather than raw
//! nodes and relationships.
//!
//! ```ignore
//! use commgraph::graph::backends::neo4j::Neo4jClient;
//! use commgraph::graph::QueryExt;
//!
//! let client = Neo4jClient::connect(&config.neo4j).await?;
//! let rows = client
//!     .query("MATCH (n:Entity) RETURN n.id AS id")
//!     .fetch_all()
//!     .await?;
//! ```

use std::collections::HashMap;

use async_trait::async_trait;
use neo4rs::{
    BoltBoolean, BoltFloat, BoltInteger, BoltList, BoltMap, BoltNull, BoltString, BoltType,
    ConfigBuilder, Graph, Txn,
};
use serde_json::Value as JsonValue;
use tokio::sync::Mutex;

use crate::config::Neo4jConfig;
use crate::error::AppError;
use crate::graph::row::{Params, Row, RowStream};
use crate::graph::statement::Statement;
use crate::graph::traits::{CypherExecutor, GraphClient, Transaction};

/// Pooled Neo4j client.
///
/// Cheap to clone; `neo4rs::Graph` shares its connection pool.
#[derive(Clone)]
pub struct Neo4jClient {
    graph: Graph,
}

impl Neo4jClient {
    /// Connects to the database described by `config`.
    pub async fn connect(config: &Neo4jConfig) -> Result<Self, AppError> {
        let uri = config.effective_uri();
        tracing::info!(%uri, user = %config.user, "Connecting to Neo4j");

        let neo4j_config = ConfigBuilder::default()
            .uri(uri.as_str())
            .user(config.user.as_str())
            .password(config.password.as_str())
            .max_connections(config.max_connections.max(1))
            .build()?;
        let graph = Graph::connect(neo4j_config).await?;

        Ok(Self { graph })
    }
}

#[async_trait]
impl CypherExecutor for Neo4jClient {
    async fn execute_cypher(
        &self,
        cypher: &str,
        params: Params,
    ) -> Result<RowStream<'_>, AppError> {
        use async_stream::try_stream;

        let query = build_query(cypher, params);
        let mut stream = self
            .graph
            .execute(query)
            .await
            .map_err(|e| query_error(e, cypher))?;

        let rows: RowStream<'static> = Box::pin(try_stream! {
            // The detached stream owns its pooled connection.
            while let Some(row) = stream.next().await? {
                yield convert_row(row)?;
            }
        });
        Ok(rows)
    }

    async fn run_cypher(&self, cypher: &str, params: Params) -> Result<(), AppError> {
        self.graph
            .run(build_query(cypher, params))
            .await
            .map_err(|e| query_error(e, cypher))
    }

    /// Applies every statement in one transaction.
    async fn run_batch(&self, statements: Vec<Statement>) -> Result<(), AppError> {
        if statements.is_empty() {
            return Ok(());
        }

        let txn = self.begin().await?;
        for statement in statements {
            if let Err(e) = txn.run_cypher(&statement.cypher, statement.params).await {
                tracing::warn!(error = %e, "Batch statement failed, rolling back");
                txn.rollback().await?;
                return Err(e);
            }
        }
        txn.commit().await
    }
}

#[async_trait]
impl GraphClient for Neo4jClient {
    type Tx<'a> = Neo4jTransaction;

    async fn begin(&self) -> Result<Self::Tx<'_>, AppError> {
        let txn = self.graph.start_txn().await?;
        Ok(Neo4jTransaction {
            txn: Mutex::new(Some(txn)),
        })
    }
}

/// An explicit Neo4j transaction.
///
/// The driver transaction needs `&mut` access for every statement, so it
/// sits behind an async mutex. Rows are buffered per statement. Dropping
/// the transaction without committing lets the server roll it back.
pub struct Neo4jTransaction {
    txn: Mutex<Option<Txn>>,
}

impl Neo4jTransaction {
    async fn take(&self) -> Result<Txn, AppError> {
        self.txn
            .lock()
            .await
            .take()
            .ok_or_else(|| AppError::Internal("transaction already finished".to_string()))
    }
}

#[async_trait]
impl CypherExecutor for Neo4jTransaction {
    async fn execute_cypher(
        &self,
        cypher: &str,
        params: Params,
    ) -> Result<RowStream<'_>, AppError> {
        let mut guard = self.txn.lock().await;
        let txn = guard
            .as_mut()
            .ok_or_else(|| AppError::Internal("transaction already finished".to_string()))?;

        let mut stream = txn
            .execute(build_query(cypher, params))
            .await
            .map_err(|e| query_error(e, cypher))?;

        let mut rows = Vec::new();
        while let Some(row) = stream.next(txn.handle()).await? {
            rows.push(Ok(convert_row(row)?));
        }
        Ok(Box::pin(futures::stream::iter(rows)))
    }

    async fn run_cypher(&self, cypher: &str, params: Params) -> Result<(), AppError> {
        let mut guard = self.txn.lock().await;
        let txn = guard
            .as_mut()
            .ok_or_else(|| AppError::Internal("transaction already finished".to_string()))?;
        txn.run(build_query(cypher, params))
            .await
            .map_err(|e| query_error(e, cypher))
    }
}

#[async_trait]
impl Transaction for Neo4jTransaction {
    async fn commit(self) -> Result<(), AppError> {
        self.take().await?.commit().await?;
        Ok(())
    }

    async fn rollback(self) -> Result<(), AppError> {
        self.take().await?.rollback().await?;
        Ok(())
    }
}

impl Drop for Neo4jTransaction {
    fn drop(&mut self) {
        if self.txn.get_mut().is_some() {
            tracing::warn!("Neo4jTransaction dropped without commit or rollback");
        }
    }
}

fn build_query(cypher: &str, params: Params) -> neo4rs::Query {
    params
        .into_iter()
        .fold(neo4rs::query(cypher), |query, (name, value)| {
            query.param(&name, json_to_bolt(value))
        })
}

fn query_error(err: neo4rs::Error, cypher: &str) -> AppError {
    AppError::Query {
        message: err.to_string(),
        query: cypher.to_string(),
    }
}

fn convert_row(row: neo4rs::Row) -> Result<Row, AppError> {
    row.to::<HashMap<String, JsonValue>>()
        .map(Row::new)
        .map_err(|e| AppError::Internal(format!("failed to decode row: {}", e)))
}

/// Converts a JSON parameter into its Bolt counterpart.
///
/// Integers that fit `i64` stay integers; every other number becomes a
/// float.
pub fn json_to_bolt(value: JsonValue) -> BoltType {
    match value {
        JsonValue::Null => BoltType::Null(BoltNull),
        JsonValue::Bool(b) => BoltType::Boolean(BoltBoolean::new(b)),
        JsonValue::Number(n) => match n.as_i64() {
            Some(i) => BoltType::Integer(BoltInteger::new(i)),
            None => BoltType::Float(BoltFloat::new(n.as_f64().unwrap_or(f64::NAN))),
        },
        JsonValue::String(s) => BoltType::String(BoltString::new(&s)),
        JsonValue::Array(items) => {
            let mut list = BoltList::new();
            for item in items {
                list.push(json_to_bolt(item));
            }
            BoltType::List(list)
        }
        JsonValue::Object(map) => {
            let mut bolt_map = BoltMap::new();
            for (key, item) in map {
                bolt_map.put(BoltString::new(&key), json_to_bolt(item));
            }
            BoltType::Map(bolt_map)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_scalars_to_bolt() {
        assert_eq!(json_to_bolt(json!(null)), BoltType::Null(BoltNull));
        assert_eq!(
            json_to_bolt(json!(42)),
            BoltType::Integer(BoltInteger::new(42))
        );
        assert_eq!(
            json_to_bolt(json!(2.5)),
            BoltType::Float(BoltFloat::new(2.5))
        );
        assert_eq!(
            json_to_bolt(json!("Mako")),
            BoltType::String(BoltString::new("Mako"))
        );
    }

    #[test]
    fn test_nested_rows_to_bolt() {
        let bolt = json_to_bolt(json!([{"id": "a", "props": {"count": 2}}]));
        let BoltType::List(list) = bolt else {
            panic!("expected list");
        };
        assert_eq!(list.len(), 1);
        let BoltType::Map(row) = &list.value[0] else {
            panic!("expected map");
        };
        assert_eq!(
            row.value.get(&BoltString::new("id")),
            Some(&BoltType::String(BoltString::new("a")))
        );
    }
}

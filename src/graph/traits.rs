//! Core traits for graph database abstraction.
//!
//! - [`CypherExecutor`] - Required for all graph backends
//! - [`Transaction`] - Transaction lifecycle management
//! - [`GraphClient`] - Connection pool and transaction creation

use async_trait::async_trait;

use crate::error::AppError;
use crate::graph::row::{Params, RowStream};
use crate::graph::statement::Statement;

/// Executes Cypher queries against a graph database.
///
/// This is the core trait that all graph backends must implement.
/// Repositories hold it as `Arc<dyn CypherExecutor>` so request handlers
/// can be exercised against an in-memory double.
#[async_trait]
pub trait CypherExecutor: Send + Sync {
    /// Executes a Cypher query and returns a stream of result rows.
    ///
    /// Use this for queries that return data (MATCH, RETURN).
    async fn execute_cypher(&self, cypher: &str, params: Params)
        -> Result<RowStream<'_>, AppError>;

    /// Executes a Cypher query without returning results.
    ///
    /// Use this for mutations (CREATE, MERGE, DELETE, SET).
    async fn run_cypher(&self, cypher: &str, params: Params) -> Result<(), AppError>;

    /// Runs several write statements as one unit.
    ///
    /// Backends with transactions override this so that either every
    /// statement is applied or none is. The default runs them in order.
    async fn run_batch(&self, statements: Vec<Statement>) -> Result<(), AppError> {
        for statement in statements {
            self.run_cypher(&statement.cypher, statement.params).await?;
        }
        Ok(())
    }
}

/// Transaction lifecycle management.
#[async_trait]
pub trait Transaction: Send + Sync {
    /// Commits the transaction, making all changes permanent.
    async fn commit(self) -> Result<(), AppError>;

    /// Rolls back the transaction, discarding all changes.
    async fn rollback(self) -> Result<(), AppError>;
}

/// A graph database client that can begin transactions.
///
/// Implementations wrap a connection pool and provide auto-commit queries
/// via the executor methods, plus explicit transactions via
/// [`begin`](GraphClient::begin).
///
/// ```ignore
/// let txn = client.begin().await?;
/// txn.run_cypher("CREATE (n:Entity {id: $id})", params).await?;
/// txn.commit().await?;
/// ```
#[async_trait]
pub trait GraphClient: CypherExecutor {
    /// The transaction type returned by this client.
    type Tx<'a>: Transaction + CypherExecutor
    where
        Self: 'a;

    /// Begins a new transaction.
    async fn begin(&self) -> Result<Self::Tx<'_>, AppError>;
}

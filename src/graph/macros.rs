//! Macro for convenient Cypher query construction.

/// Macro for inline Cypher queries with optional parameters.
///
/// Shorthand for `executor.query(..)` followed by one `.param(..)` per
/// named argument; the argument name becomes the `$name` placeholder.
///
/// # Usage
///
/// ```ignore
/// use commgraph::graph::{cypher, QueryExt};
///
/// let rows = cypher!(
///     graph,
///     "MATCH (e:Event {id: $event_id})<-[:sent]-(s:Entity) RETURN s.id AS sender",
///     event_id = event_id,
/// )
/// .fetch_all()
/// .await?;
/// ```
#[macro_export]
macro_rules! cypher {
    // Query without parameters
    ($graph:expr, $query:expr) => {
        $graph.query($query)
    };
    // Query with parameters
    ($graph:expr, $query:expr, $($name:ident = $value:expr),+ $(,)?) => {
        $graph.query($query)$(.param(stringify!($name), $value))+
    };
}

#[cfg(test)]
mod tests {
    use crate::error::AppError;
    use crate::graph::query::QueryExt;
    use crate::graph::row::{Params, RowStream};
    use crate::graph::traits::CypherExecutor;

    /// Records the parameters it receives.
    struct EchoExecutor;

    #[async_trait::async_trait]
    impl CypherExecutor for EchoExecutor {
        async fn execute_cypher(
            &self,
            _cypher: &str,
            params: Params,
        ) -> Result<RowStream<'_>, AppError> {
            let row = crate::graph::Row::new(params);
            Ok(Box::pin(futures::stream::iter(vec![Ok(row)])))
        }

        async fn run_cypher(&self, _cypher: &str, _params: Params) -> Result<(), AppError> {
            Ok(())
        }
    }

    #[tokio::test]
    async fn test_cypher_macro_no_params() {
        let executor = EchoExecutor;
        let row = cypher!(executor, "MATCH (n) RETURN count(n) AS total")
            .fetch_one()
            .await
            .unwrap()
            .unwrap();
        assert!(row.is_empty());
    }

    #[tokio::test]
    async fn test_cypher_macro_binds_named_params() {
        let executor = EchoExecutor;
        let entity_id = "Nadia Conti";
        let row = cypher!(
            executor,
            "MATCH (n:Entity {id: $entity_id}) RETURN n.id AS id LIMIT $limit",
            entity_id = entity_id,
            limit = 5,
        )
        .fetch_one()
        .await
        .unwrap()
        .unwrap();

        assert_eq!(row.get::<String>("entity_id").unwrap(), "Nadia Conti");
        assert_eq!(row.get::<i64>("limit").unwrap(), 5);
    }
}

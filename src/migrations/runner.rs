//! Migration runner with version tracking.

use crate::context::AppGraph;
use crate::error::AppError;
use crate::repositories::SchemaRepository;

use super::{create_register, MigrationResult};

/// Run all pending migrations.
///
/// The schema version lives on a `:SchemaVersion` node; only migrations
/// above it are applied.
pub async fn run_migrations(graph: AppGraph) -> Result<MigrationResult, AppError> {
    let schema = SchemaRepository::new(graph.clone());
    let previous_version = schema.get_schema_version().await?;

    let register = create_register();
    let (current_version, applied) = register
        .run_pending(graph.as_ref(), &schema, previous_version)
        .await?;

    Ok(MigrationResult {
        previous_version,
        current_version,
        applied_migrations: applied,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::{Arc, Mutex};

    use async_trait::async_trait;
    use serde_json::json;

    use crate::graph::{CypherExecutor, Params, Row, RowStream};

    /// Records writes and answers version reads with a fixed version.
    struct Recorder {
        version: Option<i64>,
        statements: Mutex<Vec<String>>,
    }

    #[async_trait]
    impl CypherExecutor for Recorder {
        async fn execute_cypher(
            &self,
            cypher: &str,
            _params: Params,
        ) -> Result<RowStream<'_>, AppError> {
            let rows = match self.version {
                Some(v) if cypher.contains("sv.version") => {
                    vec![Ok(Row::from(json!({"version": v})))]
                }
                _ => Vec::new(),
            };
            Ok(Box::pin(futures::stream::iter(rows)))
        }

        async fn run_cypher(&self, cypher: &str, _params: Params) -> Result<(), AppError> {
            self.statements.lock().unwrap().push(cypher.to_string());
            Ok(())
        }
    }

    fn recorder(version: Option<i64>) -> Arc<Recorder> {
        Arc::new(Recorder {
            version,
            statements: Mutex::new(Vec::new()),
        })
    }

    #[tokio::test]
    async fn test_fresh_database_applies_everything() {
        let graph = recorder(None);
        let result = run_migrations(graph.clone()).await.unwrap();

        assert_eq!(result.previous_version, 0);
        assert_eq!(result.current_version, 2);
        assert_eq!(
            result.applied_migrations,
            vec!["m001_constraints", "m002_indexes"]
        );

        let statements = graph.statements.lock().unwrap();
        assert!(statements
            .iter()
            .any(|s| s.contains("FOR (n:Entity) REQUIRE n.id IS UNIQUE")));
        assert_eq!(
            statements
                .iter()
                .filter(|s| s.contains("SchemaVersion"))
                .count(),
            2
        );
    }

    #[tokio::test]
    async fn test_up_to_date_database_is_untouched() {
        let graph = recorder(Some(2));
        let result = run_migrations(graph.clone()).await.unwrap();

        assert!(result.applied_migrations.is_empty());
        assert_eq!(result.current_version, 2);
        assert!(graph.statements.lock().unwrap().is_empty());
    }
}

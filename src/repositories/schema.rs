//! Schema version tracking for migrations.

use crate::context::{AppGraph, Context};
use crate::di::FromContext;
use crate::error::AppError;
use crate::graph::QueryExt;

/// Repository for the `:SchemaVersion` bookkeeping node.
#[derive(FromContext, Clone)]
pub struct SchemaRepository {
    graph: AppGraph,
}

impl SchemaRepository {
    pub fn new(graph: AppGraph) -> Self {
        Self { graph }
    }

    /// Get the current schema version; 0 on a fresh database.
    pub async fn get_schema_version(&self) -> Result<u32, AppError> {
        let row = self
            .graph
            .query("MATCH (sv:SchemaVersion) RETURN sv.version AS version LIMIT 1")
            .fetch_one()
            .await?;

        match row {
            Some(row) => Ok(row.get_opt::<i64>("version")?.unwrap_or(0) as u32),
            None => Ok(0),
        }
    }

    /// Get all applied migration ids.
    pub async fn get_applied_migrations(&self) -> Result<Vec<String>, AppError> {
        let row = self
            .graph
            .query("MATCH (sv:SchemaVersion) RETURN sv.applied_migrations AS migrations LIMIT 1")
            .fetch_one()
            .await?;

        match row {
            Some(row) => Ok(row.get_opt("migrations")?.unwrap_or_default()),
            None => Ok(vec![]),
        }
    }

    /// Records a migration as applied.
    pub async fn record_migration(&self, version: u32, migration_id: &str) -> Result<(), AppError> {
        self.graph
            .query(
                "MERGE (sv:SchemaVersion {id: 'schema'})
                 SET sv.version = $version,
                     sv.applied_migrations = coalesce(sv.applied_migrations, []) + $migration_id,
                     sv.updated_at = datetime()",
            )
            .param("version", version)
            .param("migration_id", migration_id)
            .run()
            .await
    }
}

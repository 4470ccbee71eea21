//! Migration trait and registry.

use futures::future::BoxFuture;

use crate::error::AppError;
use crate::graph::CypherExecutor;
use crate::repositories::SchemaRepository;

/// A forward-only schema change.
///
/// Uses `BoxFuture` so the migration can borrow the executor for the
/// duration of `up`.
pub trait Migration: Send + Sync {
    fn id(&self) -> &'static str;
    fn version(&self) -> u32;
    fn description(&self) -> &'static str;
    fn up<'a>(&'a self, graph: &'a dyn CypherExecutor) -> BoxFuture<'a, Result<(), AppError>>;
}

/// Migrations in registration order, which must be version order.
#[derive(Default)]
pub struct Register {
    migrations: Vec<Box<dyn Migration>>,
}

impl Register {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(mut self, migration: impl Migration + 'static) -> Self {
        self.migrations.push(Box::new(migration));
        self
    }

    /// Iterate over migrations.
    pub fn iter(&self) -> impl Iterator<Item = &dyn Migration> {
        self.migrations.iter().map(|m| m.as_ref())
    }

    /// Run all pending migrations above `current_version`, recording each
    /// one as soon as it succeeds.
    /// Returns (new_version, applied_migration_ids).
    pub async fn run_pending(
        &self,
        graph: &dyn CypherExecutor,
        schema: &SchemaRepository,
        current_version: u32,
    ) -> Result<(u32, Vec<String>), AppError> {
        let mut applied = vec![];
        let mut new_version = current_version;

        for migration in self.iter() {
            if migration.version() <= current_version {
                continue;
            }

            tracing::info!(
                id = migration.id(),
                version = migration.version(),
                "Applying migration: {}",
                migration.description()
            );
            if let Err(e) = migration.up(graph).await {
                tracing::error!(id = migration.id(), error = %e, "Migration failed");
                return Err(e);
            }
            schema
                .record_migration(migration.version(), migration.id())
                .await?;

            new_version = migration.version();
            applied.push(migration.id().to_string());
        }

        Ok((new_version, applied))
    }
}

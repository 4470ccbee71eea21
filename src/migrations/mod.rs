//! Neo4j schema migrations with version tracking.
//!
//! Migrations are:
//! - **Idempotent**: Use `IF NOT EXISTS` - required for safe retries
//! - **Additive-only**: Never drop constraints or indexes
//! - **Forward-only**: No rollback support - create compensating migrations if needed
//! - **Version-tracked**: Schema version stored on a `:SchemaVersion` node
//! - **Explicit**: Applied by `commgraph init`

mod m001_constraints;
mod m002_indexes;
mod runner;
mod traits;

pub use m001_constraints::M001Constraints;
pub use m002_indexes::M002Indexes;
pub use runner::run_migrations;
pub use traits::{Migration, Register};

/// Result of running migrations.
#[derive(Debug, Clone)]
pub struct MigrationResult {
    /// Schema version before migrations ran.
    pub previous_version: u32,
    /// Schema version after migrations ran.
    pub current_version: u32,
    /// List of migration IDs that were applied.
    pub applied_migrations: Vec<String>,
}

/// All migrations in version order.
pub fn create_register() -> Register {
    Register::new()
        .register(M001Constraints)
        .register(M002Indexes)
}

//! Runs the graph transformation passes.
//!
//! Every pass reads its input, plans the rewrite in memory and applies the
//! resulting statements as one batch, so a failing pass leaves the graph as
//! the previous pass left it.

use std::sync::Arc;

use crate::config::Config;
use crate::context::Context;
use crate::di::FromContext;
use crate::error::AppError;
use crate::graph::Statement;
use crate::models::{PassReport, PipelineReport};
use crate::repositories::TransformRepository;
use crate::transform::{aggregate, collapse, combine, flatten, redundant, Pass};

#[derive(FromContext, Clone)]
pub struct TransformService {
    repo: TransformRepository,
    config: Arc<Config>,
}

impl TransformService {
    fn batch_size(&self) -> usize {
        self.config.data.effective_batch_size()
    }

    /// Plans and applies a single pass.
    pub async fn run_pass(&self, pass: Pass) -> Result<PassReport, AppError> {
        tracing::info!(%pass, "Running transformation pass");
        let (report, statements) = match pass {
            Pass::FlattenCommunications => self.plan_flatten().await?,
            Pass::CombineLinks => self.plan_combine().await?,
            Pass::RemoveRedundantEdges => self.plan_redundant().await?,
            Pass::CollapseRelationships => self.plan_collapse().await?,
            Pass::AggregateInteractions => self.plan_aggregate().await?,
        };

        if report.is_noop() {
            tracing::info!(%pass, "Nothing to do");
            return Ok(report);
        }
        self.repo.apply(statements).await?;
        tracing::info!(
            %pass,
            created = report.created,
            deleted = report.deleted,
            "Pass applied"
        );
        Ok(report)
    }

    /// Runs all passes in order.
    pub async fn run_pipeline(&self) -> Result<PipelineReport, AppError> {
        self.run_pipeline_with(|_| {}).await
    }

    /// Runs all passes in order, calling `on_pass` before each one.
    pub async fn run_pipeline_with(
        &self,
        mut on_pass: impl FnMut(Pass) + Send,
    ) -> Result<PipelineReport, AppError> {
        let mut report = PipelineReport::default();
        for pass in Pass::ALL {
            on_pass(pass);
            report.passes.push(self.run_pass(pass).await?);
        }
        Ok(report)
    }

    async fn plan_flatten(&self) -> Result<(PassReport, Vec<Statement>), AppError> {
        let events = self.repo.communication_rows().await?;
        let existing = self.repo.flattened_keys().await?;
        let plan = flatten::plan(events, &existing);
        Ok((plan.report(), plan.statements(self.batch_size())))
    }

    async fn plan_combine(&self) -> Result<(PassReport, Vec<Statement>), AppError> {
        let plan = combine::plan(self.repo.combinable_edges().await?);
        Ok((plan.report(), plan.statements(self.batch_size())))
    }

    async fn plan_redundant(&self) -> Result<(PassReport, Vec<Statement>), AppError> {
        let self_loops = self.repo.self_loops().await?;
        let provenance = self.repo.provenance_edges().await?;
        let flattened = self.repo.flattened_event_ids().await?;
        let plan = redundant::plan(self_loops, provenance, &flattened);
        Ok((plan.report(), plan.statements(self.batch_size())))
    }

    async fn plan_collapse(&self) -> Result<(PassReport, Vec<Statement>), AppError> {
        let plan = collapse::plan(self.repo.relationship_rows().await?);
        Ok((plan.report(), plan.statements(self.batch_size())))
    }

    async fn plan_aggregate(&self) -> Result<(PassReport, Vec<Statement>), AppError> {
        let edges = self.repo.message_edges().await?;
        let existing = self.repo.interactions().await?;
        let plan = aggregate::plan(&edges, existing);
        Ok((plan.report(), plan.statements(self.batch_size())))
    }
}

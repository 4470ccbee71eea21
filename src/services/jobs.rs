//! Background dataset loading.

use crate::context::Context;
use crate::di::FromContext;
use crate::error::AppError;
use crate::jobs::JobRegistry;
use crate::models::{JobState, LoadJob, LoadReport};

use super::{LoaderService, TransformService};

/// Starts and tracks clear, load and transform runs.
#[derive(FromContext, Clone)]
pub struct JobService {
    jobs: JobRegistry,
    loader: LoaderService,
    transform: TransformService,
}

impl JobService {
    /// Spawns a loading run and returns its job right away.
    ///
    /// Only one run may be active at a time.
    pub fn start_loading(&self) -> Result<LoadJob, AppError> {
        let job = self.jobs.try_create().map_err(|active| {
            AppError::Validation(format!("loading job {} is still running", active.id))
        })?;

        let service = self.clone();
        let id = job.id.clone();
        let task = tokio::spawn(async move { service.run(&id).await });
        self.jobs.supervise(job.id.clone(), task);
        tracing::info!(job = %job.id, "Loading job started");
        Ok(job)
    }

    pub fn status(&self, id: &str) -> Result<LoadJob, AppError> {
        self.jobs.get(id).ok_or_else(|| AppError::not_found("Job", id))
    }

    pub fn list(&self) -> Vec<LoadJob> {
        self.jobs.list()
    }

    async fn run(&self, id: &str) {
        match self.execute(id).await {
            Ok(report) => {
                tracing::info!(job = %id, nodes = report.import.nodes, "Loading job completed");
                self.jobs.update(id, JobState::Completed { report });
            }
            Err(e) => {
                tracing::error!(job = %id, error = %e, "Loading job failed");
                self.jobs.update(id, JobState::Failed { error: e.to_string() });
            }
        }
    }

    async fn execute(&self, id: &str) -> Result<LoadReport, AppError> {
        self.step(id, "clear_database");
        self.loader.clear_database().await?;

        self.step(id, "load_graph_json");
        let import = self.loader.load_graph_json(false).await?;

        let pipeline = self
            .transform
            .run_pipeline_with(|pass| self.step(id, pass.name()))
            .await?;
        Ok(LoadReport {
            import,
            pipeline: Some(pipeline),
        })
    }

    fn step(&self, id: &str, step: &str) {
        self.jobs.update(
            id,
            JobState::Running {
                step: step.to_string(),
            },
        );
    }
}

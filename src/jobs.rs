//! Registry of background loading jobs.

use std::sync::Arc;

use chrono::Utc;
use dashmap::DashMap;
use parking_lot::Mutex;
use tokio::task::JoinHandle;

use crate::models::{JobState, LoadJob};

/// Finished jobs kept for status queries.
pub const FINISHED_JOBS_KEPT: usize = 20;

/// In-memory job table shared by the HTTP handlers and the workers.
///
/// Unfinished jobs are always kept; only the newest finished ones survive
/// a new job being created.
#[derive(Clone)]
pub struct JobRegistry {
    jobs: Arc<DashMap<String, LoadJob>>,
    gate: Arc<Mutex<()>>,
    keep_finished: usize,
}

impl Default for JobRegistry {
    fn default() -> Self {
        Self::with_retention(FINISHED_JOBS_KEPT)
    }
}

impl JobRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_retention(keep_finished: usize) -> Self {
        Self {
            jobs: Arc::new(DashMap::new()),
            gate: Arc::new(Mutex::new(())),
            keep_finished,
        }
    }

    /// Registers a new pending job and returns it.
    pub fn create(&self) -> LoadJob {
        let now = Utc::now();
        let job = LoadJob {
            id: ulid::Ulid::new().to_string(),
            created_at: now,
            updated_at: now,
            state: JobState::Pending,
        };
        self.prune();
        self.jobs.insert(job.id.clone(), job.clone());
        job
    }

    /// Drops finished jobs beyond the newest `keep_finished`.
    fn prune(&self) {
        let mut finished: Vec<String> = self
            .jobs
            .iter()
            .filter(|job| job.state.is_finished())
            .map(|job| job.id.clone())
            .collect();
        if finished.len() <= self.keep_finished {
            return;
        }
        finished.sort_unstable_by(|a, b| b.cmp(a));
        for id in finished.into_iter().skip(self.keep_finished) {
            self.jobs.remove(&id);
        }
    }

    /// Watches a job's task; if it dies without recording an outcome the
    /// job is marked failed.
    pub fn supervise(&self, id: String, task: JoinHandle<()>) -> JoinHandle<()> {
        let registry = self.clone();
        tokio::spawn(async move {
            let Err(e) = task.await else {
                return;
            };
            tracing::error!(job = %id, error = %e, "Loading task aborted");
            let unfinished = registry
                .get(&id)
                .is_some_and(|job| !job.state.is_finished());
            if unfinished {
                registry.update(
                    &id,
                    JobState::Failed {
                        error: format!("loading task aborted: {e}"),
                    },
                );
            }
        })
    }

    /// Registers a new job unless one is still unfinished, in which case
    /// that job is returned as the error.
    pub fn try_create(&self) -> Result<LoadJob, LoadJob> {
        let _guard = self.gate.lock();
        match self.active() {
            Some(active) => Err(active),
            None => Ok(self.create()),
        }
    }

    pub fn update(&self, id: &str, state: JobState) {
        if let Some(mut job) = self.jobs.get_mut(id) {
            job.state = state;
            job.updated_at = Utc::now();
        }
    }

    pub fn get(&self, id: &str) -> Option<LoadJob> {
        self.jobs.get(id).map(|job| job.clone())
    }

    /// All jobs, newest first.
    pub fn list(&self) -> Vec<LoadJob> {
        let mut jobs: Vec<LoadJob> = self.jobs.iter().map(|job| job.clone()).collect();
        jobs.sort_by(|a, b| b.id.cmp(&a.id));
        jobs
    }

    /// A job that has not finished yet, if any.
    pub fn active(&self) -> Option<LoadJob> {
        self.jobs
            .iter()
            .find(|job| !job.state.is_finished())
            .map(|job| job.clone())
    }
}

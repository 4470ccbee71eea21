//! Background loading jobs.

use chrono::{DateTime, Utc};
use serde::Serialize;

use super::LoadReport;

/// Lifecycle of a background job.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum JobState {
    Pending,
    Running { step: String },
    Completed { report: LoadReport },
    Failed { error: String },
}

impl JobState {
    pub fn is_finished(&self) -> bool {
        matches!(self, JobState::Completed { .. } | JobState::Failed { .. })
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LoadJob {
    pub id: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    #[serde(flatten)]
    pub state: JobState,
}

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::core::error::{LauncherError, LauncherResult};
use crate::core::events::Stage;
use crate::core::pool::TaskFailure;

/// Outcome of one acquisition stage.
#[derive(Debug, Serialize)]
pub struct StageReport {
    pub stage: Stage,
    /// Items the stage considered (objects, applicable libraries, mods...).
    pub total: usize,
    /// Items already present on disk.
    pub skipped: usize,
    /// Items fetched successfully in this run.
    pub fetched: usize,
    pub failures: Vec<TaskFailure>,
}

impl StageReport {
    pub fn new(stage: Stage, total: usize) -> Self {
        Self {
            stage,
            total,
            skipped: 0,
            fetched: 0,
            failures: Vec::new(),
        }
    }

    /// Record the drained pool outcome for `submitted` tasks.
    pub(crate) fn settle(&mut self, submitted: usize, failures: Vec<TaskFailure>) {
        self.fetched = submitted.saturating_sub(failures.len());
        self.failures = failures;
    }

    pub fn is_clean(&self) -> bool {
        self.failures.is_empty()
    }
}

/// Everything one `acquire` run did, in stage order.
#[derive(Debug, Serialize)]
pub struct AcquisitionReport {
    pub version_id: String,
    pub started_at: DateTime<Utc>,
    pub finished_at: DateTime<Utc>,
    pub stages: Vec<StageReport>,
}

impl AcquisitionReport {
    pub fn begin(version_id: impl Into<String>) -> Self {
        let now = Utc::now();
        Self {
            version_id: version_id.into(),
            started_at: now,
            finished_at: now,
            stages: Vec::new(),
        }
    }

    pub(crate) fn push(&mut self, stage: StageReport) {
        self.stages.push(stage);
    }

    pub(crate) fn finish(&mut self) {
        self.finished_at = Utc::now();
    }

    pub fn stage(&self, stage: Stage) -> Option<&StageReport> {
        self.stages.iter().find(|s| s.stage == stage)
    }

    pub fn failure_count(&self) -> usize {
        self.stages.iter().map(|s| s.failures.len()).sum()
    }

    pub fn is_complete(&self) -> bool {
        self.failure_count() == 0
    }

    /// Refuse to continue (e.g. to launch) while any file is missing.
    pub fn ensure_complete(&self) -> LauncherResult<()> {
        match self.failure_count() {
            0 => Ok(()),
            failures => Err(LauncherError::IncompleteAcquisition { failures }),
        }
    }

    pub fn elapsed(&self) -> chrono::Duration {
        self.finished_at - self.started_at
    }
}

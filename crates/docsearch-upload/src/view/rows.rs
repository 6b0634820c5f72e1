//! Row projection of the job store.
//!
//! Rows are derived from store snapshots and carry no state of their own.
//! [`JobListView`] remembers only the last rendered rows, so a caller can
//! redraw just what changed.

use std::collections::HashMap;
use std::fmt;

use crate::job::{Job, JobStatus};

/// Neutral detail shown while a job is in flight with nothing else to say.
pub const CHECKING_INDICATOR: &str = "checking...";

/// Display form of one job.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct JobRow {
    /// Stable row identity; the job id as text.
    pub key: String,
    pub filename: String,
    pub badge: String,
    pub icon: &'static str,
    pub detail: Option<String>,
}

impl JobRow {
    pub fn from_job(job: &Job) -> Self {
        let detail = match (&job.error, &job.file_path) {
            (Some(error), _) if job.status == JobStatus::Failed => Some(error.clone()),
            (_, Some(path)) => Some(path.clone()),
            _ if !job.is_finished() => Some(CHECKING_INDICATOR.to_string()),
            _ => None,
        };

        Self {
            key: job.id.to_string(),
            filename: job.filename.clone(),
            badge: badge_label(&job.status),
            icon: status_icon(&job.status),
            detail,
        }
    }
}

impl fmt::Display for JobRow {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} [{}] {}", self.icon, self.badge, self.filename)?;
        if let Some(detail) = &self.detail {
            write!(f, " - {}", detail)?;
        }
        Ok(())
    }
}

/// Badge text for a status. Unknown server statuses show verbatim.
pub fn badge_label(status: &JobStatus) -> String {
    match status {
        JobStatus::Uploading => "Uploading".to_string(),
        JobStatus::Pending => "Pending".to_string(),
        JobStatus::Processing => "Processing".to_string(),
        JobStatus::Completed => "Completed".to_string(),
        JobStatus::Failed => "Failed".to_string(),
        JobStatus::Other(label) => label.clone(),
    }
}

pub fn status_icon(status: &JobStatus) -> &'static str {
    match status {
        JobStatus::Uploading => "↑",
        JobStatus::Pending => "…",
        JobStatus::Processing => "⟳",
        JobStatus::Completed => "✓",
        JobStatus::Failed => "✗",
        JobStatus::Other(_) => "•",
    }
}

/// Result of one render pass.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RenderDiff {
    /// Every row, newest first.
    pub rows: Vec<JobRow>,
    /// Rows that are new or differ from the previous render.
    pub changed: Vec<JobRow>,
}

impl RenderDiff {
    pub fn is_unchanged(&self) -> bool {
        self.changed.is_empty()
    }
}

/// Renders store snapshots and tracks what was last shown.
#[derive(Debug, Default)]
pub struct JobListView {
    last: HashMap<String, (usize, JobRow)>,
}

impl JobListView {
    pub fn new() -> Self {
        Self::default()
    }

    /// Projects `jobs` into rows and diffs them against the previous call.
    /// A row counts as changed when its content or its position moved.
    pub fn render(&mut self, jobs: &[Job]) -> RenderDiff {
        let rows: Vec<JobRow> = jobs.iter().map(JobRow::from_job).collect();

        let changed = rows
            .iter()
            .enumerate()
            .filter(|(pos, row)| match self.last.get(&row.key) {
                Some((last_pos, last_row)) => last_pos != pos || last_row != *row,
                None => true,
            })
            .map(|(_, row)| row.clone())
            .collect();

        self.last = rows
            .iter()
            .enumerate()
            .map(|(pos, row)| (row.key.clone(), (pos, row.clone())))
            .collect();

        RenderDiff { rows, changed }
    }
}

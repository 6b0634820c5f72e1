//! Job records tracked by the upload widget.

use std::fmt;

use chrono::Utc;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

// ─── JobId ──────────────────────────────────────────────────────────────────

/// Identity of an upload job.
///
/// A job starts with a client-generated `Temporary` id and is promoted in
/// place to the server's `Assigned` id once the create request succeeds.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(untagged)]
pub enum JobId {
    Temporary(String),
    Assigned(u64),
}

impl JobId {
    /// Returns the server-assigned id, if the job has been promoted.
    pub fn assigned(&self) -> Option<u64> {
        match self {
            JobId::Assigned(id) => Some(*id),
            JobId::Temporary(_) => None,
        }
    }

    pub fn is_temporary(&self) -> bool {
        matches!(self, JobId::Temporary(_))
    }
}

impl fmt::Display for JobId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            JobId::Temporary(id) => write!(f, "{}", id),
            JobId::Assigned(id) => write!(f, "{}", id),
        }
    }
}

impl From<u64> for JobId {
    fn from(id: u64) -> Self {
        JobId::Assigned(id)
    }
}

// ─── JobStatus ──────────────────────────────────────────────────────────────

/// Lifecycle status of a job.
///
/// Values the client does not recognize are kept verbatim in `Other` so the
/// UI can show them as-is.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum JobStatus {
    Uploading,
    Pending,
    Processing,
    Completed,
    Failed,
    Other(String),
}

impl JobStatus {
    pub fn parse(s: &str) -> Self {
        match s.trim() {
            "uploading" => JobStatus::Uploading,
            "pending" => JobStatus::Pending,
            "processing" => JobStatus::Processing,
            "completed" => JobStatus::Completed,
            "failed" => JobStatus::Failed,
            other => JobStatus::Other(other.to_string()),
        }
    }

    pub fn as_str(&self) -> &str {
        match self {
            JobStatus::Uploading => "uploading",
            JobStatus::Pending => "pending",
            JobStatus::Processing => "processing",
            JobStatus::Completed => "completed",
            JobStatus::Failed => "failed",
            JobStatus::Other(label) => label,
        }
    }

    /// `completed` and `failed` are terminal and sticky.
    pub fn is_terminal(&self) -> bool {
        matches!(self, JobStatus::Completed | JobStatus::Failed)
    }

    /// Position along uploading → pending → processing → terminal.
    /// Unrecognized labels have no known position.
    fn rank(&self) -> Option<u8> {
        match self {
            JobStatus::Uploading => Some(0),
            JobStatus::Pending => Some(1),
            JobStatus::Processing => Some(2),
            JobStatus::Completed | JobStatus::Failed => Some(3),
            JobStatus::Other(_) => None,
        }
    }

    /// Whether moving from `self` to `next` keeps the lifecycle monotonic.
    pub fn can_advance_to(&self, next: &JobStatus) -> bool {
        if self.is_terminal() {
            return false;
        }
        match (self.rank(), next.rank()) {
            (Some(current), Some(next)) => next >= current,
            _ => true,
        }
    }
}

impl fmt::Display for JobStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl From<&str> for JobStatus {
    fn from(s: &str) -> Self {
        JobStatus::parse(s)
    }
}

impl Serialize for JobStatus {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for JobStatus {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        Ok(JobStatus::parse(&s))
    }
}

// ─── JobPatch ───────────────────────────────────────────────────────────────

/// Server-reported fields for one job. `None` means "unchanged".
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct JobPatch {
    pub status: Option<JobStatus>,
    pub file_path: Option<String>,
    pub created_at: Option<String>,
}

// ─── Job ────────────────────────────────────────────────────────────────────

/// One file's ingestion lifecycle.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Job {
    pub id: JobId,
    pub filename: String,
    pub status: JobStatus,
    pub created_at: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub file_path: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl Job {
    /// Creates a freshly chosen upload in `uploading` status.
    pub fn uploading(temp_id: impl Into<String>, filename: impl Into<String>) -> Self {
        Self {
            id: JobId::Temporary(temp_id.into()),
            filename: filename.into(),
            status: JobStatus::Uploading,
            created_at: Utc::now().to_rfc3339(),
            file_path: None,
            error: None,
        }
    }

    /// Returns true if this job is finished (completed or failed).
    pub fn is_finished(&self) -> bool {
        self.status.is_terminal()
    }

    /// A job is polled only once the server knows it and it is not finished.
    pub fn is_pollable(&self) -> bool {
        self.id.assigned().is_some() && !self.is_finished()
    }

    /// Replaces the temporary identity with the server's in one step.
    pub fn promoted(&self, id: u64, status: JobStatus) -> Self {
        Self {
            id: JobId::Assigned(id),
            status,
            ..self.clone()
        }
    }

    /// Marks the job failed, keeping its current identity.
    pub fn failed(&self, message: impl Into<String>) -> Self {
        Self {
            status: JobStatus::Failed,
            error: Some(message.into()),
            ..self.clone()
        }
    }

    /// Applies a server patch, returning the new record only if a mergeable
    /// field actually changes. Finished jobs never change.
    pub fn merged(&self, patch: &JobPatch) -> Option<Self> {
        if self.is_finished() {
            return None;
        }

        let status = match &patch.status {
            Some(next) if self.status.can_advance_to(next) => next.clone(),
            Some(next) => {
                log::debug!(
                    "Ignoring status regression {} -> {} for job {}",
                    self.status,
                    next,
                    self.id
                );
                self.status.clone()
            }
            None => self.status.clone(),
        };
        let file_path = patch.file_path.clone().or_else(|| self.file_path.clone());
        let created_at = patch
            .created_at
            .clone()
            .unwrap_or_else(|| self.created_at.clone());

        if status == self.status && file_path == self.file_path && created_at == self.created_at
        {
            return None;
        }

        Some(Self {
            status,
            file_path,
            created_at,
            ..self.clone()
        })
    }
}
